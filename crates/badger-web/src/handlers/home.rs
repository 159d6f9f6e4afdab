//! 首页处理器

use axum::{extract::State, response::Html};
use tracing::instrument;

use super::page_context;
use crate::auth::CurrentUser;
use crate::dto::MAX_RECENT;
use crate::error::Result;
use crate::state::AppState;
use crate::templates;

/// 首页：最近修改的徽章和授予记录
///
/// GET /
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, current: CurrentUser) -> Result<Html<String>> {
    let badges = state.badge_repo.list_recent(MAX_RECENT).await?;
    let awards = state.award_repo.list_recent(MAX_RECENT).await?;

    let page = templates::home(page_context(&state, &current), &badges, &awards);
    Ok(Html(page.into_string()))
}
