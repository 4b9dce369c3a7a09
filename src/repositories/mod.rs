//! Repositories pair the local cache with the remote store.
//!
//! Nothing here is transactional across the two stores. When one side of a
//! paired write fails the other side is left as it is, so the cache and the
//! remote copy can diverge until the next full sync overwrites the cache.

pub mod categories;
pub mod products;
pub mod profiles;

pub use categories::CategoryRepository;
pub use products::ProductRepository;
pub use profiles::ProfileRepository;

use crate::error::AppResult;

/// Combine the outcomes of a paired local/remote write.
///
/// Succeeds only when both sides did. A one-sided failure is logged as a
/// divergence and returned as is; nothing is undone.
pub(crate) fn settle<L, R>(
    operation: &str,
    id: &str,
    local: AppResult<L>,
    remote: AppResult<R>,
) -> AppResult<()> {
    match (local, remote) {
        (Ok(_), Ok(_)) => Ok(()),
        (Ok(_), Err(err)) => {
            tracing::warn!(operation, id, error = %err, "remote write failed after local write; stores diverge");
            Err(err)
        }
        (Err(err), Ok(_)) => {
            tracing::warn!(operation, id, error = %err, "local write failed after remote write; stores diverge");
            Err(err)
        }
        (Err(local_err), Err(remote_err)) => {
            tracing::warn!(operation, id, local = %local_err, remote = %remote_err, "both writes failed");
            Err(remote_err)
        }
    }
}
