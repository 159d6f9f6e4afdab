//! HTML 模板
//!
//! 使用 maud 在编译期生成页面，页面之间共享 `layout` 外壳和分页导航

mod award;
mod badge;

pub use award::{award_detail, awards_by_badge, awards_by_user, awards_list};
pub use badge::{award_form, badge_detail, badges_list, home};

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::dto::Page;
use crate::models::User;

/// 每个页面都需要的上下文
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub user: Option<&'a User>,
    pub default_image: &'a str,
}

impl PageContext<'_> {
    pub fn image(&self, image: Option<&str>, title: &str) -> Markup {
        badge_image(image, self.default_image, title)
    }
}

/// 页面外壳
pub fn layout(title: &str, user: Option<&User>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Badger" }
            }
            body {
                header.site-header {
                    a.brand href="/" { "Badger" }
                    nav {
                        a href="/badges" { "Badges" }
                        " "
                        a href="/awards" { "Awards" }
                    }
                    div.account {
                        @if let Some(user) = user {
                            a href=(user.awards_path()) { (user.username) }
                        } @else {
                            span.anonymous { "Not signed in" }
                        }
                    }
                }
                main {
                    h1 { (title) }
                    (content)
                }
            }
        }
    }
}

/// 徽章图片，未设置时使用默认图片
pub fn badge_image(image: Option<&str>, default_image: &str, title: &str) -> Markup {
    html! {
        img.badge-image src=(image.unwrap_or(default_image)) alt=(title) width="64" height="64";
    }
}

/// 分页导航
///
/// `params` 为需要保留的查询参数，如搜索关键字和排序
pub fn pagination<T>(page: &Page<T>, base_path: &str, params: &[(&str, &str)]) -> Markup {
    html! {
        @if page.is_paginated() {
            nav.pagination {
                @if page.has_previous() {
                    a.prev href=(page_href(base_path, params, &(page.page - 1).to_string())) { "‹ Prev" }
                }
                span.page-current { "Page " (page.page) " of " (page.total_pages) }
                @if page.has_next() {
                    a.next href=(page_href(base_path, params, &(page.page + 1).to_string())) { "Next ›" }
                    a.last href=(page_href(base_path, params, "last")) { "Last »" }
                }
            }
        }
    }
}

fn page_href(base_path: &str, params: &[(&str, &str)], page: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        query.append_pair(key, value);
    }
    query.append_pair("page", page);
    format!("{}?{}", base_path, query.finish())
}

/// 错误页面
pub fn error_page(status: StatusCode, code: &str, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        None,
        html! {
            section.error data-code=(code) {
                p.status { (status.as_u16()) }
                p.message { (message) }
                a href="/" { "Back to home" }
            }
        },
    )
}
