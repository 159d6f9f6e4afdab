//! Open Badges (OBI 0.5.0) 序列化
//!
//! 徽章描述和授予断言中的地址都是绝对地址，由请求的站点根地址拼接。

use serde::Serialize;
use sha2::{Digest, Sha256};

use badger_shared::config::SiteConfig;

use crate::models::{AwardDetail, Badge};

pub const OBI_VERSION: &str = "0.5.0";

/// 序列化所需的站点上下文
#[derive(Debug, Clone)]
pub struct ObiContext<'a> {
    /// 站点根地址，如 `https://badges.example.com`
    pub origin: String,
    pub site: &'a SiteConfig,
}

impl<'a> ObiContext<'a> {
    pub fn new(origin: impl Into<String>, site: &'a SiteConfig) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self { origin, site }
    }

    /// 将站内路径转为绝对地址，已是绝对地址时原样返回
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }
}

/// 颁发方
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issuer {
    pub origin: String,
    pub name: String,
    pub org: String,
    pub contact: String,
}

impl Issuer {
    /// 站点配置中的默认颁发方
    pub fn site(ctx: &ObiContext<'_>) -> Self {
        Self {
            origin: ctx.origin.clone(),
            name: ctx.site.issuer_name.clone(),
            org: ctx.site.issuer_org.clone(),
            contact: ctx.site.issuer_contact.clone(),
        }
    }

    /// 以具体用户作为颁发方
    pub fn user(ctx: &ObiContext<'_>, username: &str, email: &str) -> Self {
        Self {
            origin: ctx.origin.clone(),
            name: username.to_string(),
            org: ctx.site.issuer_org.clone(),
            contact: email.to_string(),
        }
    }
}

/// 徽章描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeSerialization {
    pub version: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub criteria: String,
    pub issuer: Issuer,
}

impl BadgeSerialization {
    pub fn new(ctx: &ObiContext<'_>, badge: &Badge, issuer: Issuer) -> Self {
        let image = badge
            .image
            .as_deref()
            .unwrap_or(&ctx.site.default_badge_image);

        Self {
            version: OBI_VERSION.to_string(),
            name: badge.title.clone(),
            description: badge.description.clone(),
            image: ctx.absolute(image),
            criteria: ctx.absolute(&badge.detail_path()),
            issuer,
        }
    }
}

/// 授予断言
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardAssertion {
    pub recipient: String,
    pub salt: String,
    pub evidence: String,
    pub issued_on: String,
    pub badge: BadgeSerialization,
}

impl AwardAssertion {
    /// 颁发人存在时作为徽章的颁发方，否则使用站点颁发方
    pub fn new(ctx: &ObiContext<'_>, badge: &Badge, award: &AwardDetail) -> Self {
        let issuer = match (&award.creator_username, &award.creator_email) {
            (Some(username), Some(email)) => Issuer::user(ctx, username, email),
            _ => Issuer::site(ctx),
        };
        let salt = ctx.site.recipient_salt.clone();

        Self {
            recipient: hashed_recipient(&award.user_email, &salt),
            salt,
            evidence: ctx.absolute(&award.detail_path()),
            issued_on: award.award.created_at.format("%Y-%m-%d").to_string(),
            badge: BadgeSerialization::new(ctx, badge, issuer),
        }
    }
}

/// `sha256$` 前缀加上 email + salt 的十六进制摘要
pub fn hashed_recipient(email: &str, salt: &str) -> String {
    let digest = Sha256::new()
        .chain_update(email.as_bytes())
        .chain_update(salt.as_bytes())
        .finalize();
    format!("sha256${:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Award;
    use chrono::{TimeZone, Utc};

    fn site() -> SiteConfig {
        SiteConfig {
            default_badge_image: "/static/default.png".to_string(),
            issuer_name: "Badger".to_string(),
            issuer_org: "Example Org".to_string(),
            issuer_contact: "admin@example.com".to_string(),
            recipient_salt: "pepper".to_string(),
            ..Default::default()
        }
    }

    fn badge() -> Badge {
        let now = Utc::now();
        Badge {
            id: 1,
            slug: "first-post".to_string(),
            title: "First Post".to_string(),
            description: "Posted once".to_string(),
            image: None,
            creator_id: None,
            is_unique: false,
            points: 5,
            created_at: now,
            modified_at: now,
        }
    }

    fn award(creator: Option<(&str, &str)>) -> AwardDetail {
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        AwardDetail {
            award: Award {
                id: 7,
                badge_id: 1,
                user_id: 2,
                creator_id: creator.map(|_| 3),
                created_at: created,
                modified_at: created,
            },
            badge_slug: "first-post".to_string(),
            badge_title: "First Post".to_string(),
            badge_image: None,
            badge_points: 5,
            username: "alice".to_string(),
            user_email: "alice@example.com".to_string(),
            creator_username: creator.map(|(u, _)| u.to_string()),
            creator_email: creator.map(|(_, e)| e.to_string()),
        }
    }

    #[test]
    fn test_absolute_urls() {
        let site = site();
        let ctx = ObiContext::new("https://badges.example.com/", &site);
        assert_eq!(ctx.absolute("/badges/a"), "https://badges.example.com/badges/a");
        assert_eq!(ctx.absolute("img/a.png"), "https://badges.example.com/img/a.png");
        assert_eq!(ctx.absolute("https://cdn.example.com/a.png"), "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_badge_serialization_uses_site_issuer() {
        let site = site();
        let ctx = ObiContext::new("http://localhost:8080", &site);
        let data = BadgeSerialization::new(&ctx, &badge(), Issuer::site(&ctx));

        assert_eq!(data.version, "0.5.0");
        assert_eq!(data.name, "First Post");
        assert_eq!(data.image, "http://localhost:8080/static/default.png");
        assert_eq!(data.criteria, "http://localhost:8080/badges/first-post");
        assert_eq!(data.issuer.name, "Badger");
        assert_eq!(data.issuer.contact, "admin@example.com");

        let json = serde_json::to_value(&data).unwrap();
        for key in ["version", "name", "description", "image", "criteria", "issuer"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        for key in ["origin", "name", "org", "contact"] {
            assert!(json["issuer"].get(key).is_some(), "missing issuer key {key}");
        }
    }

    #[test]
    fn test_award_assertion() {
        let site = site();
        let ctx = ObiContext::new("http://localhost:8080", &site);
        let assertion = AwardAssertion::new(&ctx, &badge(), &award(None));

        assert_eq!(assertion.salt, "pepper");
        assert_eq!(
            assertion.recipient,
            hashed_recipient("alice@example.com", "pepper")
        );
        assert_eq!(assertion.evidence, "http://localhost:8080/badges/first-post/awards/7");
        assert_eq!(assertion.issued_on, "2024-03-09");
        assert_eq!(assertion.badge.issuer, Issuer::site(&ctx));
    }

    #[test]
    fn test_award_assertion_issuer_is_award_creator() {
        let site = site();
        let ctx = ObiContext::new("http://localhost:8080", &site);
        let assertion = AwardAssertion::new(&ctx, &badge(), &award(Some(("bob", "bob@example.com"))));

        assert_eq!(assertion.badge.issuer.name, "bob");
        assert_eq!(assertion.badge.issuer.contact, "bob@example.com");
        assert_eq!(assertion.badge.issuer.org, "Example Org");
    }

    #[test]
    fn test_hashed_recipient_format() {
        let hashed = hashed_recipient("alice@example.com", "pepper");
        let (prefix, hex) = hashed.split_once('$').unwrap();
        assert_eq!(prefix, "sha256");
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, format!("{:x}", Sha256::digest(b"alice@example.compepper")));
    }
}
