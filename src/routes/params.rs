use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{local::ProductFilter, models::StockStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

/// Product list query. Paging fields sit at the top level because
/// `serde(flatten)` loses the number types of query-string values.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<String>,
    pub available: Option<bool>,
    pub status: Option<StockStatus>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category_id: self.category_id.clone(),
            search: self.q.clone(),
            available: self.available,
            status: self.status,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Only categories flagged active.
    #[serde(default)]
    pub active_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let p = Pagination::default();
        assert_eq!(p.normalize(), (1, 20, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (3, 100, 200));

        let p = Pagination {
            page: Some(-2),
            per_page: Some(0),
        };
        assert_eq!(p.normalize(), (1, 1, 0));

        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        assert_eq!(p.normalize(), (i64::MAX, 100, i64::MAX));
    }
}
