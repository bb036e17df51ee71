// Fixed-size page slicing over repository queries
use serde::Serialize;

use crate::{AppError, Result};

pub const WORDS_PER_PAGE: u32 = 5;
pub const USER_POSTS_PER_PAGE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Pages are 1-based; page 0 does not exist.
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page == 0 {
            return Err(AppError::not_found(format!("Page {}", page)));
        }
        if per_page == 0 {
            return Err(AppError::InternalError("Page size must be positive".to_string()));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            current_page: request.page,
            per_page: request.per_page,
            total_items,
        }
    }

    /// Slices an already-loaded list, for collections that are not
    /// paginated at the storage level.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self::new(items, request, total_items)
    }

    /// Always at least one, so an empty listing still renders page 1 of 1.
    pub fn page_count(&self) -> u32 {
        let pages = self.total_items.div_ceil(self.per_page as u64).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
