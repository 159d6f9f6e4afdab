//! 枚举类型定义
//!
//! 支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 奖品码来源类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum AwardType {
    /// 徽章授予
    #[default]
    BadgeAward,
}

impl AwardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadgeAward => "badge_award",
        }
    }
}

impl std::fmt::Display for AwardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
