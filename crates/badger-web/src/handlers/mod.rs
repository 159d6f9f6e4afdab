//! HTTP 请求处理器模块
//!
//! 每个处理器解析路径参数、检查权限、读写一两条记录，然后渲染 HTML 或输出 JSON

pub mod award;
pub mod badge;
pub mod health;
pub mod home;
pub mod user;

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::auth::CurrentUser;
use crate::state::AppState;
use crate::templates::PageContext;

/// 输出格式，由路径末尾的 `.json` 后缀决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Json,
}

/// 拆分路径参数上的格式后缀
pub fn split_format(raw: &str) -> (&str, Format) {
    match raw.strip_suffix(".json") {
        Some(stem) if !stem.is_empty() => (stem, Format::Json),
        _ => (raw, Format::Html),
    }
}

/// 模板上下文
pub(crate) fn page_context<'a>(state: &'a AppState, current: &'a CurrentUser) -> PageContext<'a> {
    PageContext {
        user: current.user(),
        default_image: &state.site.default_badge_image,
    }
}

/// 当前请求的站点根地址
///
/// 主机取自 Host 头，HTTP/2 请求取自 URI authority；协议依次取 X-Forwarded-Proto、
/// URI 中的协议，默认 http。两处都没有主机时使用配置的 base_url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrigin(pub String);

impl FromRequestParts<AppState> for SiteOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_origin(parts, &state.site.base_url)))
    }
}

fn resolve_origin(parts: &Parts, base_url: &str) -> String {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))
        .map(str::trim)
        .filter(|h| !h.is_empty());

    let Some(host) = host else {
        return base_url.trim_end_matches('/').to_string();
    };

    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .or_else(|| parts.uri.scheme_str())
        .filter(|s| *s == "http" || *s == "https")
        .unwrap_or("http");

    format!("{}://{}", scheme, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        parts_with_uri("/badges/a.json", headers)
    }

    fn parts_with_uri(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_split_format() {
        assert_eq!(split_format("first-post"), ("first-post", Format::Html));
        assert_eq!(split_format("first-post.json"), ("first-post", Format::Json));
        assert_eq!(split_format("42.json"), ("42", Format::Json));
        assert_eq!(split_format(".json"), (".json", Format::Html));
    }

    #[test]
    fn test_resolve_origin_from_host() {
        let parts = parts(&[("host", "badges.example.com")]);
        assert_eq!(
            resolve_origin(&parts, "http://localhost:8080"),
            "http://badges.example.com"
        );
    }

    #[test]
    fn test_resolve_origin_forwarded_proto() {
        let parts = parts(&[("host", "badges.example.com"), ("x-forwarded-proto", "https, http")]);
        assert_eq!(
            resolve_origin(&parts, "http://localhost:8080"),
            "https://badges.example.com"
        );
    }

    #[test]
    fn test_resolve_origin_from_uri_authority() {
        let parts = parts_with_uri("https://badges.example.com/badges/a.json", &[]);
        assert_eq!(
            resolve_origin(&parts, "http://localhost:8080"),
            "https://badges.example.com"
        );

        let parts = parts_with_uri(
            "https://badges.example.com/badges/a.json",
            &[("x-forwarded-proto", "http")],
        );
        assert_eq!(
            resolve_origin(&parts, "http://localhost:8080"),
            "http://badges.example.com"
        );
    }

    #[test]
    fn test_resolve_origin_falls_back_to_base_url() {
        let parts = parts(&[]);
        assert_eq!(
            resolve_origin(&parts, "https://badger.example.org/"),
            "https://badger.example.org"
        );
    }
}
