//! 授予记录处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use super::badge::find_badge;
use super::{Format, SiteOrigin, page_context, split_format};
use crate::auth::CurrentUser;
use crate::dto::request::offset;
use crate::dto::{BADGE_PAGE_SIZE, Page, PageParams};
use crate::error::{Result, WebError};
use crate::models::Badge;
use crate::service::{AwardAssertion, ObiContext};
use crate::state::AppState;
use crate::templates;

/// 全部授予记录
///
/// GET /awards?page=
#[instrument(skip(state, current))]
pub async fn awards_list(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Html<String>> {
    render_awards_list(&state, &current, None, &params).await
}

/// 某徽章的授予记录
///
/// GET /badges/{slug}/awards?page=
#[instrument(skip(state, current))]
pub async fn badge_awards_list(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>> {
    let badge = find_badge(&state, &slug).await?;
    render_awards_list(&state, &current, Some(&badge), &params).await
}

async fn render_awards_list(
    state: &AppState,
    current: &CurrentUser,
    badge: Option<&Badge>,
    params: &PageParams,
) -> Result<Html<String>> {
    let badge_id = badge.map(|b| b.id);
    let total = state.award_repo.count(badge_id).await?;
    let page_number = params.resolve(total, BADGE_PAGE_SIZE)?;
    let items = state
        .award_repo
        .list(badge_id, offset(page_number, BADGE_PAGE_SIZE), BADGE_PAGE_SIZE)
        .await?;
    let page = Page::new(items, total, page_number, BADGE_PAGE_SIZE);

    let html = templates::awards_list(page_context(state, current), badge, &page);
    Ok(Html(html.into_string()))
}

/// 授予记录详情，`.json` 后缀时输出 OBI 授予断言
///
/// GET /badges/{slug}/awards/{id}
/// GET /badges/{slug}/awards/{id}.json
#[instrument(skip(state, current, origin))]
pub async fn award_detail(
    State(state): State<AppState>,
    current: CurrentUser,
    origin: SiteOrigin,
    Path((slug, raw_id)): Path<(String, String)>,
) -> Result<Response> {
    let (id, format) = split_format(&raw_id);
    let badge = find_badge(&state, &slug).await?;

    let id: i64 = id
        .parse()
        .map_err(|_| WebError::AwardNotFound(raw_id.clone()))?;
    let award = state
        .award_repo
        .get_detail(badge.id, id)
        .await?
        .ok_or_else(|| WebError::AwardNotFound(raw_id.clone()))?;

    if format == Format::Json {
        let ctx = ObiContext::new(origin.0, &state.site);
        return Ok(Json(AwardAssertion::new(&ctx, &badge, &award)).into_response());
    }

    let html = templates::award_detail(page_context(&state, &current), &badge, &award);
    Ok(Html(html.into_string()).into_response())
}

/// 徽章的全部获得者（不分页）
///
/// GET /badges/{slug}/recipients
#[instrument(skip(state, current))]
pub async fn awards_by_badge(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let badge = find_badge(&state, &slug).await?;
    let awards = state.award_repo.list_by_badge(badge.id).await?;

    let html = templates::awards_by_badge(page_context(&state, &current), &badge, &awards);
    Ok(Html(html.into_string()))
}
