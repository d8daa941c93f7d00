use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

impl PaginationParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > 200 {
            return Err("page_size must be between 1 and 200".to_string());
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, page_size: u32, total_items: i64) -> Self {
        let total_pages = (total_items.max(0) as u64).div_ceil(u64::from(page_size)) as u32;
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params.page, params.page_size, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_pages() {
        let params = PaginationParams {
            page: 3,
            page_size: 20,
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.offset(), 40);
        assert_eq!(PaginationMeta::new(3, 20, 41).total_pages, 3);
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(1, 50, 1).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 50, 100).total_pages, 2);
        assert_eq!(PaginationMeta::new(1, 50, 101).total_pages, 3);
        assert_eq!(PaginationMeta::new(1, 50, -4).total_pages, 0);
    }

    #[test]
    fn test_rejects_zero_page() {
        let params = PaginationParams {
            page: 0,
            page_size: 20,
        };
        assert!(params.validate().is_err());
    }
}
