//! 徽章相关页面

use maud::{Markup, html};

use super::{PageContext, layout, pagination};
use crate::dto::{BadgeAwardForm, FormErrors, Page};
use crate::models::{AwardDetail, Badge};

/// 首页：最近修改的徽章和授予记录
pub fn home(ctx: PageContext<'_>, badges: &[Badge], awards: &[AwardDetail]) -> Markup {
    layout(
        "Home",
        ctx.user,
        html! {
            section.recent-badges {
                h2 { "Recently updated badges" }
                (badge_grid(ctx, badges))
                a href="/badges" { "All badges" }
            }
            section.recent-awards {
                h2 { "Recent awards" }
                (award_rows(ctx, awards))
                a href="/awards" { "All awards" }
            }
        },
    )
}

/// 徽章列表和搜索结果
pub fn badges_list(
    ctx: PageContext<'_>,
    page: &Page<Badge>,
    query: Option<&str>,
    sort: Option<&str>,
) -> Markup {
    let mut params = Vec::new();
    if let Some(q) = query {
        params.push(("q", q));
        if let Some(sort) = sort {
            params.push(("sort", sort));
        }
    }

    layout(
        "Badges",
        ctx.user,
        html! {
            form.search action="/badges" method="get" {
                input type="search" name="q" value=(query.unwrap_or_default()) placeholder="Search badges";
                @if query.is_some() {
                    select name="sort" {
                        @for (value, label) in SORT_OPTIONS {
                            option value=(value) selected[sort == Some(*value)] { (label) }
                        }
                    }
                }
                button type="submit" { "Search" }
            }
            @if let Some(q) = query {
                p.search-summary { (page.total) " badges matching \u{201c}" (q) "\u{201d}" }
            }
            @if page.items.is_empty() {
                p.empty { "No badges found." }
            } @else {
                (badge_grid(ctx, &page.items))
            }
            (pagination(page, "/badges", &params))
        },
    )
}

const SORT_OPTIONS: &[(&str, &str)] = &[
    ("created", "Oldest first"),
    ("-created", "Newest first"),
    ("modified", "Least recently updated"),
    ("-modified", "Recently updated"),
    ("title", "Title A-Z"),
    ("-title", "Title Z-A"),
    ("points", "Fewest points"),
    ("-points", "Most points"),
];

/// 徽章详情
pub fn badge_detail(
    ctx: PageContext<'_>,
    badge: &Badge,
    awards: &[AwardDetail],
    can_award: bool,
) -> Markup {
    layout(
        &badge.title,
        ctx.user,
        html! {
            article.badge-detail data-slug=(badge.slug) {
                (ctx.image(badge.image.as_deref(), &badge.title))
                p.description { (badge.description) }
                dl {
                    dt { "Points" }
                    dd.points { (badge.points) }
                    @if badge.is_unique {
                        dt { "Unique" }
                        dd { "Can be earned once per person" }
                    }
                    dt { "Created" }
                    dd { (badge.created_at.format("%Y-%m-%d").to_string()) }
                }
                nav.badge-actions {
                    @if can_award {
                        a.award-badge href=(badge.award_path()) { "Award this badge" }
                    }
                    a href=(badge.awards_path()) { "All awards" }
                    a href=(badge.recipients_path()) { "Recipients" }
                    a href=(badge.json_path()) { "JSON" }
                }
            }
            section.recent-awards {
                h2 { "Recent awards" }
                (award_rows(ctx, awards))
            }
        },
    )
}

/// 徽章授予表单
pub fn award_form(
    ctx: PageContext<'_>,
    badge: &Badge,
    form: &BadgeAwardForm,
    errors: &FormErrors,
) -> Markup {
    layout(
        &format!("Award {}", badge.title),
        ctx.user,
        html! {
            (ctx.image(badge.image.as_deref(), &badge.title))
            form.award-form action=(badge.award_path()) method="post" {
                label for="id_username" { "Recipient username" }
                input id="id_username" type="text" name="username" value=(form.username) required;
                @for message in errors.field("username") {
                    p.field-error { (message) }
                }
                button type="submit" { "Award" }
            }
            a href=(badge.detail_path()) { "Cancel" }
        },
    )
}

pub(super) fn badge_grid(ctx: PageContext<'_>, badges: &[Badge]) -> Markup {
    html! {
        ul.badges {
            @for badge in badges {
                li.badge {
                    a href=(badge.detail_path()) {
                        (ctx.image(badge.image.as_deref(), &badge.title))
                        span.title { (badge.title) }
                    }
                }
            }
        }
    }
}

pub(super) fn award_rows(ctx: PageContext<'_>, awards: &[AwardDetail]) -> Markup {
    html! {
        @if awards.is_empty() {
            p.empty { "No awards yet." }
        } @else {
            ul.awards {
                @for award in awards {
                    li.award data-award-id=(award.id()) {
                        (ctx.image(award.badge_image.as_deref(), &award.badge_title))
                        a.badge href=(award.badge_path()) { (award.badge_title) }
                        " awarded to "
                        a.user href=(award.user_awards_path()) { (award.username) }
                        " "
                        a.detail href=(award.detail_path()) {
                            (award.award.created_at.format("%Y-%m-%d").to_string())
                        }
                    }
                }
            }
        }
    }
}
