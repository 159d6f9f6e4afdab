//! 健康检查处理器

use axum::{Json, extract::State, http::StatusCode};

use crate::state::AppState;

/// 存活探针：服务进程正常即返回 ok
///
/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "badger-web"
    }))
}

/// 就绪探针：检查数据库连接是否可用
///
/// GET /ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let (storage, db_ok) = match &state.db {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "service": "badger-web",
            "checks": {
                "storage": storage,
                "database": if db_ok { "ok" } else { "fail" }
            }
        })),
    )
}
