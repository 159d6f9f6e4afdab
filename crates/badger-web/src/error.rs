//! 页面服务错误类型定义
//!
//! 错误直接映射为 HTML 响应：资源缺失 404，无权授予 403，
//! 未登录访问授予表单时重定向到登录页。

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use crate::templates;

/// 系统错误对外展示的通用提示
const GENERIC_ERROR_MESSAGE: &str = "服务内部错误，请稍后重试";

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    // 资源不存在
    #[error("徽章不存在: {0}")]
    BadgeNotFound(String),

    #[error("授予记录不存在: {0}")]
    AwardNotFound(String),

    #[error("用户不存在: {0}")]
    UserNotFound(String),

    #[error("页面不存在: {0}")]
    NotFound(String),

    // 认证与权限
    #[error("需要登录")]
    LoginRequired { login_url: String, next: String },

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("禁止访问: {0}")]
    Forbidden(String),

    // 请求错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("资源已存在: {0}")]
    AlreadyExists(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl WebError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadgeNotFound(_)
            | Self::AwardNotFound(_)
            | Self::UserNotFound(_)
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::LoginRequired { .. } => StatusCode::SEE_OTHER,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于日志和 JSON 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadgeNotFound(_) => "BADGE_NOT_FOUND",
            Self::AwardNotFound(_) => "AWARD_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::LoginRequired { .. } => "LOGIN_REQUIRED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 登录跳转地址：`{login_url}?next={next}`
    pub fn login_redirect_location(login_url: &str, next: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("next", next)
            .finish();
        let separator = if login_url.contains('?') { '&' } else { '?' };
        format!("{login_url}{separator}{query}")
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::LoginRequired { login_url, next } => {
                let location = Self::login_redirect_location(login_url, next);
                return (status, [(header::LOCATION, location)]).into_response();
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                GENERIC_ERROR_MESSAGE.to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                GENERIC_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let page = templates::error_page(status, self.error_code(), &message);
        (status, Html(page.into_string())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    /// 错误变体及其期望的 (StatusCode, error_code)
    fn all_error_variants() -> Vec<(WebError, StatusCode, &'static str)> {
        vec![
            (WebError::BadgeNotFound("missing".into()), StatusCode::NOT_FOUND, "BADGE_NOT_FOUND"),
            (WebError::AwardNotFound("7".into()), StatusCode::NOT_FOUND, "AWARD_NOT_FOUND"),
            (WebError::UserNotFound("nobody".into()), StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            (WebError::NotFound("page 9".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                WebError::LoginRequired {
                    login_url: "/accounts/login".into(),
                    next: "/badges/x/award".into(),
                },
                StatusCode::SEE_OTHER,
                "LOGIN_REQUIRED",
            ),
            (WebError::Unauthorized("bad token".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (WebError::Forbidden("not creator".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (WebError::Validation("username".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (WebError::AlreadyExists("slug".into()), StatusCode::CONFLICT, "ALREADY_EXISTS"),
            (WebError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            (WebError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(error.status_code(), expected_status, "状态码不匹配: variant={label}");
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _, expected_code) in all_error_variants() {
            assert_eq!(error.error_code(), expected_code);
        }
    }

    #[test]
    fn test_into_response_status_matches() {
        for (error, expected_status, label) in all_error_variants() {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status, "响应状态码不匹配: variant={label}");
        }
    }

    #[test]
    fn test_login_redirect_location() {
        assert_eq!(
            WebError::login_redirect_location("/accounts/login", "/badges/first-post/award"),
            "/accounts/login?next=%2Fbadges%2Ffirst-post%2Faward"
        );
        assert_eq!(
            WebError::login_redirect_location("/login?lang=en", "/"),
            "/login?lang=en&next=%2F"
        );
    }

    #[test]
    fn test_login_required_sets_location() {
        let response = WebError::LoginRequired {
            login_url: "/accounts/login".into(),
            next: "/badges/a/award".into(),
        }
        .into_response();

        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/login?next=%2Fbadges%2Fa%2Faward"
        );
    }

    #[tokio::test]
    async fn test_system_errors_hide_details() {
        let response = WebError::Internal("secret connection string".into()).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();

        assert!(html.contains(GENERIC_ERROR_MESSAGE));
        assert!(!html.contains("secret connection string"));
    }

    #[tokio::test]
    async fn test_not_found_renders_message() {
        let response = WebError::BadgeNotFound("no-such-badge".into()).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();

        assert!(html.contains("no-such-badge"));
    }
}
