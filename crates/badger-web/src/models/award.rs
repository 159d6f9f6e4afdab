//! 徽章授予记录实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 徽章授予记录
///
/// 创建后除 modified_at 外不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    pub id: i64,
    pub badge_id: i64,
    /// 获奖用户
    pub user_id: i64,
    /// 颁发人，系统颁发时为空
    #[sqlx(default)]
    pub creator_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 新建授予记录参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAward {
    pub badge_id: i64,
    pub user_id: i64,
    pub creator_id: Option<i64>,
}

/// 授予记录视图
///
/// 联表带出徽章和用户的展示字段，列表页无需逐条回查
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AwardDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub award: Award,
    pub badge_slug: String,
    pub badge_title: String,
    #[sqlx(default)]
    pub badge_image: Option<String>,
    pub badge_points: i32,
    pub username: String,
    pub user_email: String,
    #[sqlx(default)]
    pub creator_username: Option<String>,
    #[sqlx(default)]
    pub creator_email: Option<String>,
}

impl AwardDetail {
    pub fn id(&self) -> i64 {
        self.award.id
    }

    pub fn detail_path(&self) -> String {
        format!("/badges/{}/awards/{}", self.badge_slug, self.award.id)
    }

    pub fn json_path(&self) -> String {
        format!("/badges/{}/awards/{}.json", self.badge_slug, self.award.id)
    }

    pub fn badge_path(&self) -> String {
        format!("/badges/{}", self.badge_slug)
    }

    pub fn user_awards_path(&self) -> String {
        format!("/users/{}/awards", self.username)
    }
}
