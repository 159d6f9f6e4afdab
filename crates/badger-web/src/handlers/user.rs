//! 用户视图处理器

use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::instrument;

use super::page_context;
use crate::auth::CurrentUser;
use crate::error::{Result, WebError};
use crate::state::AppState;
use crate::templates;

/// 用户获得的徽章，每条记录附带奖品码
///
/// GET /users/{username}/awards
///
/// 奖品码按 (用户名, 来源类型, 徽章) 幂等生成，重复访问返回同一条记录
#[instrument(skip(state, current))]
pub async fn awards_by_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(username): Path<String>,
) -> Result<Html<String>> {
    let user = state
        .user_repo
        .get_by_username(&username)
        .await?
        .ok_or_else(|| WebError::UserNotFound(username.clone()))?;

    let awards = state.award_repo.list_by_user(user.id).await?;
    let awards = state
        .prize_code_service
        .attach_prize_codes(&user, awards)
        .await?;

    let html = templates::awards_by_user(page_context(&state, &current), &user, &awards);
    Ok(Html(html.into_string()))
}
