//! JWT 认证中间件
//!
//! 依次尝试 Bearer Token 和 Cookie 中的 JWT，第一个验证通过的 Claims 注入请求扩展。
//! 所有页面都允许匿名访问，所以验证失败不会拒绝请求。

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::state::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    let cookie = jar
        .get(&state.auth.cookie_name)
        .map(|c| c.value().to_string());

    let claims = [("bearer", bearer), ("cookie", cookie)]
        .into_iter()
        .filter_map(|(source, token)| token.map(|t| (source, t)))
        .find_map(|(source, token)| match state.jwt_manager.verify_token(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!(source, error = %e, "Token 无效");
                None
            }
        });

    match claims {
        Some(claims) => {
            request.extensions_mut().insert(claims);
        }
        None => debug!("未携带有效 Token，按匿名用户处理"),
    }

    next.run(request).await
}
