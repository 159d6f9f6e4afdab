//! 授予记录相关页面

use maud::{Markup, html};

use super::badge::award_rows;
use super::{PageContext, layout, pagination};
use crate::dto::Page;
use crate::models::{AwardDetail, Badge, User};
use crate::service::AwardWithPrizeCode;

/// 授予列表，badge 不为空时只列出该徽章的记录
pub fn awards_list(ctx: PageContext<'_>, badge: Option<&Badge>, page: &Page<AwardDetail>) -> Markup {
    let (title, base_path) = match badge {
        Some(badge) => (format!("Awards of {}", badge.title), badge.awards_path()),
        None => ("Awards".to_string(), "/awards".to_string()),
    };

    layout(
        &title,
        ctx.user,
        html! {
            @if let Some(badge) = badge {
                a.badge href=(badge.detail_path()) {
                    (ctx.image(badge.image.as_deref(), &badge.title))
                }
            }
            p.count { (page.total) " awards" }
            (award_rows(ctx, &page.items))
            (pagination(page, &base_path, &[]))
        },
    )
}

/// 单条授予记录
pub fn award_detail(ctx: PageContext<'_>, badge: &Badge, award: &AwardDetail) -> Markup {
    layout(
        &format!("{} awarded to {}", badge.title, award.username),
        ctx.user,
        html! {
            article.award-detail data-award-id=(award.id()) {
                a.badge href=(badge.detail_path()) {
                    (ctx.image(badge.image.as_deref(), &badge.title))
                    span.title { (badge.title) }
                }
                dl {
                    dt { "Recipient" }
                    dd.recipient { a href=(award.user_awards_path()) { (award.username) } }
                    dt { "Awarded by" }
                    dd.creator {
                        @if let Some(creator) = &award.creator_username {
                            a href=(format!("/users/{}/awards", creator)) { (creator) }
                        } @else {
                            "System"
                        }
                    }
                    dt { "Issued on" }
                    dd.issued { (award.award.created_at.format("%Y-%m-%d").to_string()) }
                }
                a.json href=(award.json_path()) { "JSON" }
            }
        },
    )
}

/// 用户获得的徽章及对应奖品码
pub fn awards_by_user(
    ctx: PageContext<'_>,
    profile: &User,
    awards: &[AwardWithPrizeCode],
) -> Markup {
    layout(
        &format!("Awards for {}", profile.username),
        ctx.user,
        html! {
            @if awards.is_empty() {
                p.empty { "No awards yet." }
            } @else {
                table.user-awards {
                    thead {
                        tr {
                            th { "Badge" }
                            th { "Awarded" }
                            th { "Points" }
                            th { "Prize code" }
                        }
                    }
                    tbody {
                        @for item in awards {
                            tr data-award-id=(item.award.id()) {
                                td {
                                    (ctx.image(item.award.badge_image.as_deref(), &item.award.badge_title))
                                    a href=(item.award.badge_path()) { (item.award.badge_title) }
                                }
                                td {
                                    a href=(item.award.detail_path()) {
                                        (item.award.award.created_at.format("%Y-%m-%d").to_string())
                                    }
                                }
                                td.amount { (item.prize_code.amount) }
                                td.prize-code data-key-hash=(item.prize_code.key_hash) {
                                    code { (item.prize_code.display_code()) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

/// 徽章的全部获得者
pub fn awards_by_badge(ctx: PageContext<'_>, badge: &Badge, awards: &[AwardDetail]) -> Markup {
    layout(
        &format!("Recipients of {}", badge.title),
        ctx.user,
        html! {
            a.badge href=(badge.detail_path()) {
                (ctx.image(badge.image.as_deref(), &badge.title))
            }
            @if awards.is_empty() {
                p.empty { "Nobody has earned this badge yet." }
            } @else {
                ul.recipients {
                    @for award in awards {
                        li data-award-id=(award.id()) {
                            a href=(award.user_awards_path()) { (award.username) }
                            " "
                            a.detail href=(award.detail_path()) {
                                (award.award.created_at.format("%Y-%m-%d").to_string())
                            }
                        }
                    }
                }
            }
        },
    )
}
