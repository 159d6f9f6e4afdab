//! 请求参数定义
//!
//! 分页参数沿用 `page=N` / `page=last` 的查询串约定，表单字段使用 validator 校验

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::error::{Result, WebError};

/// 分页参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// 页码（从 1 开始）或 `last`
    pub page: Option<String>,
}

impl PageParams {
    /// 解析页码
    ///
    /// 总页数至少为 1，空列表也能访问第一页；页码越界或格式错误返回 404
    pub fn resolve(&self, total: i64, page_size: i64) -> Result<i64> {
        let num_pages = num_pages(total, page_size);

        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| WebError::NotFound(format!("无效的页码: {}", raw)))?,
        };

        if page < 1 || page > num_pages {
            return Err(WebError::NotFound(format!("页码超出范围: {}", page)));
        }

        Ok(page)
    }
}

/// 计算总页数，至少为 1
pub fn num_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 1;
    }
    ((total + page_size - 1) / page_size).max(1)
}

/// 计算数据库查询的 offset
pub fn offset(page: i64, page_size: i64) -> i64 {
    (page - 1).max(0) * page_size
}

/// 徽章列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BadgeListParams {
    pub page: Option<String>,
    /// 搜索关键字
    pub q: Option<String>,
    /// 排序字段
    pub sort: Option<String>,
}

impl BadgeListParams {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page.clone(),
        }
    }

    /// 去除空白后的搜索关键字
    pub fn search_query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// 徽章授予表单
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BadgeAwardForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "请输入获奖用户名"))]
    pub username: String,
}

impl BadgeAwardForm {
    pub fn trimmed(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self
    }
}

/// 表单错误，按字段分组
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = Self::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("字段无效: {}", err.code));
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}
