use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::AppResult,
    local::LocalStore,
    models::UserProfile,
    remote::{self, RemoteStore, USERS},
    validation::validate_profile,
};

use super::settle;

#[derive(Clone)]
pub struct ProfileRepository {
    local: LocalStore,
    remote: Arc<dyn RemoteStore>,
}

impl ProfileRepository {
    pub fn new(local: LocalStore, remote: Arc<dyn RemoteStore>) -> Self {
        Self { local, remote }
    }

    pub async fn save_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        validate_profile(&profile)?;
        let body = remote_body(&profile)?;
        let (local, remote) = tokio::join!(
            self.local.upsert_profile(&profile),
            self.remote.set(USERS, &profile.id, body),
        );
        settle("save_profile", &profile.id, local, remote)?;
        Ok(profile)
    }

    /// Cached profile, falling back to the remote copy (which is then cached).
    pub async fn get_profile(&self, id: &str) -> AppResult<Option<UserProfile>> {
        if let Some(profile) = self.local.get_profile(id).await? {
            return Ok(Some(profile));
        }
        self.sync_from_cloud(id).await
    }

    /// The profile picture stays on the device; only the cache learns the path.
    pub async fn set_profile_image(
        &self,
        id: &str,
        image_path: Option<String>,
    ) -> AppResult<Option<UserProfile>> {
        let Some(mut profile) = self.local.get_profile(id).await? else {
            return Ok(None);
        };
        profile.image_path = image_path;
        self.local.upsert_profile(&profile).await?;
        Ok(Some(profile))
    }

    /// Overwrite the cached profile with the remote one, if there is one.
    /// A cached picture path survives the overwrite.
    pub async fn sync_from_cloud(&self, id: &str) -> AppResult<Option<UserProfile>> {
        let Some(doc) = self.remote.get(USERS, id).await? else {
            return Ok(None);
        };
        let mut profile: UserProfile = doc.decode()?;
        profile.image_path = self
            .local
            .get_profile(id)
            .await?
            .and_then(|cached| cached.image_path);
        self.local.upsert_profile(&profile).await?;
        Ok(Some(profile))
    }
}

fn remote_body(profile: &UserProfile) -> AppResult<Value> {
    let mut body = remote::encode(profile)?;
    if let Value::Object(map) = &mut body {
        map.remove("image_path");
    }
    Ok(body)
}
