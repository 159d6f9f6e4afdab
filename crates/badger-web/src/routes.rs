//! 路由配置模块
//!
//! 页面路由、探针路由和全局中间件

use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use badger_shared::observability::middleware as obs_middleware;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// 徽章相关页面
///
/// `{slug}` 与 `{id}` 可带 `.json` 后缀，由处理器自行拆分
fn badge_routes() -> Router<AppState> {
    Router::new()
        .route("/badges", get(handlers::badge::badges_list))
        .route("/badges/{slug}", get(handlers::badge::detail))
        .route(
            "/badges/{slug}/award",
            get(handlers::badge::award_badge_form).post(handlers::badge::award_badge),
        )
        .route("/badges/{slug}/awards", get(handlers::award::badge_awards_list))
        .route("/badges/{slug}/awards/{id}", get(handlers::award::award_detail))
        .route("/badges/{slug}/recipients", get(handlers::award::awards_by_badge))
}

/// 授予记录与用户页面
fn award_routes() -> Router<AppState> {
    Router::new()
        .route("/awards", get(handlers::award::awards_list))
        .route("/users/{username}/awards", get(handlers::user::awards_by_user))
}

/// 构建完整应用
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::home::home))
        .merge(badge_routes())
        .merge(award_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(security_headers))
        // 只解析身份，不拦截请求；是否需要登录由各处理器决定
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .layer(request_timeout_layer(request_timeout))
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// 超时的请求返回 408
fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    // 显式关闭旧版 XSS 过滤
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    response
}
