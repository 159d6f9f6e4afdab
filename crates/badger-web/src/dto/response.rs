//! 响应数据结构

/// 徽章和授予列表每页条数
pub const BADGE_PAGE_SIZE: i64 = 21;

/// 首页和徽章详情页展示的最近记录数
pub const MAX_RECENT: i64 = 10;

/// 分页结果
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
            total_pages: super::request::num_pages(total, page_size),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }
}
