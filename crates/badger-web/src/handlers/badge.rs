//! 徽章处理器
//!
//! 徽章列表、搜索、详情（HTML / OBI JSON）和授予表单

use axum::{
    Form, Json,
    extract::{Path, Query, State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, instrument};
use validator::Validate;

use super::{Format, SiteOrigin, page_context, split_format};
use crate::auth::CurrentUser;
use crate::dto::{BADGE_PAGE_SIZE, BadgeAwardForm, BadgeListParams, FormErrors, MAX_RECENT, Page};
use crate::dto::request::offset;
use crate::error::{Result, WebError};
use crate::models::{Badge, BadgeQuery, User};
use crate::service::{BadgeSerialization, Issuer, ObiContext};
use crate::state::AppState;
use crate::templates;

/// 按 slug 获取徽章，不存在时返回 404
pub(crate) async fn find_badge(state: &AppState, slug: &str) -> Result<Badge> {
    state
        .badge_repo
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| WebError::BadgeNotFound(slug.to_string()))
}

/// 徽章列表，带 `q` 参数时为搜索
///
/// GET /badges?q=&sort=&page=
#[instrument(skip(state, current))]
pub async fn badges_list(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<BadgeListParams>,
) -> Result<Html<String>> {
    let search = params.search_query();
    let query = match search {
        Some(q) => BadgeQuery::search(q, params.sort.as_deref()),
        None => BadgeQuery::all(),
    };

    let total = state.badge_repo.count(&query).await?;
    let page_number = params.page_params().resolve(total, BADGE_PAGE_SIZE)?;
    let items = state
        .badge_repo
        .list(&query, offset(page_number, BADGE_PAGE_SIZE), BADGE_PAGE_SIZE)
        .await?;
    let page = Page::new(items, total, page_number, BADGE_PAGE_SIZE);

    let sort = search.map(|_| query.sort.as_param());
    let html = templates::badges_list(page_context(&state, &current), &page, search, sort);
    Ok(Html(html.into_string()))
}

/// 徽章详情，`.json` 后缀时输出 OBI 徽章描述
///
/// GET /badges/{slug}
/// GET /badges/{slug}.json
#[instrument(skip(state, current, origin))]
pub async fn detail(
    State(state): State<AppState>,
    current: CurrentUser,
    origin: SiteOrigin,
    Path(raw_slug): Path<String>,
) -> Result<Response> {
    let (slug, format) = split_format(&raw_slug);
    let badge = find_badge(&state, slug).await?;

    if format == Format::Json {
        let ctx = ObiContext::new(origin.0, &state.site);
        let creator = match badge.creator_id {
            Some(id) => state.user_repo.get_by_id(id).await?,
            None => None,
        };
        let issuer = match &creator {
            Some(user) => Issuer::user(&ctx, &user.username, &user.email),
            None => Issuer::site(&ctx),
        };
        return Ok(Json(BadgeSerialization::new(&ctx, &badge, issuer)).into_response());
    }

    let awards = state
        .award_repo
        .list_recent_for_badge(badge.id, MAX_RECENT)
        .await?;
    let can_award = current.user().is_some_and(|u| badge.allows_award_to(u));

    let html = templates::badge_detail(page_context(&state, &current), &badge, &awards, can_award);
    Ok(Html(html.into_string()).into_response())
}

/// 授予前的统一检查：先要求登录，再确认徽章存在，最后校验授予权限
async fn authorize_award<'a>(
    state: &AppState,
    current: &'a CurrentUser,
    slug: &str,
) -> Result<(&'a User, Badge)> {
    let next = format!("/badges/{}/award", slug);
    let user = current.require(&state.auth.login_url, &next)?;
    let badge = find_badge(state, slug).await?;

    if !badge.allows_award_to(user) {
        return Err(WebError::Forbidden(format!(
            "{} 无权授予徽章 {}",
            user.username, badge.slug
        )));
    }

    Ok((user, badge))
}

/// 徽章授予表单
///
/// GET /badges/{slug}/award
#[instrument(skip(state, current))]
pub async fn award_badge_form(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let (_, badge) = authorize_award(&state, &current, &slug).await?;

    let html = templates::award_form(
        page_context(&state, &current),
        &badge,
        &BadgeAwardForm::default(),
        &FormErrors::new(),
    );
    Ok(Html(html.into_string()))
}

/// 提交徽章授予
///
/// POST /badges/{slug}/award
///
/// 表单无效时原样重新渲染（200），成功后跳转到授予记录详情页
#[instrument(skip(state, current, form))]
pub async fn award_badge(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(slug): Path<String>,
    form: std::result::Result<Form<BadgeAwardForm>, FormRejection>,
) -> Result<Response> {
    let (awarder, badge) = authorize_award(&state, &current, &slug).await?;
    let Form(form) = form.map_err(|e| WebError::Validation(e.body_text()))?;
    let form = form.trimmed();

    let mut errors = match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => FormErrors::from(e),
    };

    let awardee = if errors.is_empty() {
        let awardee = state.user_repo.get_by_username(&form.username).await?;
        if awardee.is_none() {
            errors.add("username", "用户不存在");
        }
        awardee
    } else {
        None
    };

    let Some(awardee) = awardee else {
        info!(username = %form.username, "授予表单无效，重新渲染");
        let html = templates::award_form(page_context(&state, &current), &badge, &form, &errors);
        return Ok(Html(html.into_string()).into_response());
    };

    let outcome = state
        .award_service
        .award_to(&badge, &awardee, Some(awarder))
        .await?;

    Ok(Redirect::to(&badge.award_detail_path(outcome.award.id)).into_response())
}
