//! 当前用户提取器
//!
//! 认证中间件放入请求扩展的 Claims 按用户名解析为用户记录；
//! 没有 Claims 或用户不存在时视为匿名访问。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::jwt::Claims;
use crate::error::WebError;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// 要求已登录，匿名访问时返回跳转登录页的错误
    pub fn require(&self, login_url: &str, next: &str) -> Result<&User, WebError> {
        self.0.as_ref().ok_or_else(|| WebError::LoginRequired {
            login_url: login_url.to_string(),
            next: next.to_string(),
        })
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(claims) = parts.extensions.get::<Claims>() else {
            return Ok(Self(None));
        };

        let user = state.user_repo.get_by_username(&claims.username).await?;
        if user.is_none() {
            tracing::debug!(username = %claims.username, "Token 对应的用户不存在，按匿名处理");
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_anonymous_redirects() {
        let anonymous = CurrentUser(None);
        let err = anonymous.require("/accounts/login", "/badges/a/award").unwrap_err();

        match err {
            WebError::LoginRequired { login_url, next } => {
                assert_eq!(login_url, "/accounts/login");
                assert_eq!(next, "/badges/a/award");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
