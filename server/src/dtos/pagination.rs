//! Pagination DTO - Metadati di paginazione comuni a tutte le liste

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDTO {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl PaginationDTO {
    pub fn new(page: i64, limit: i64, total_count: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_count + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total_count,
            total_pages,
            has_more: page < total_pages,
        }
    }

    /// Offset SQL della pagina corrente (le pagine partono da 1), saturato a `i64::MAX`
    pub fn offset(page: i64, limit: i64) -> i64 {
        (page.max(1) - 1).saturating_mul(limit.max(0))
    }
}
