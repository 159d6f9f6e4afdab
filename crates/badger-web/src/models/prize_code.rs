//! 奖品码实体定义
//!
//! 奖品码由 (用户名, 来源类型, 徽章 slug) 构成的 key 派生，
//! key 的 SHA-256 摘要唯一，同一 key 只会生成一条记录。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::enums::AwardType;

/// 展示码长度
const DISPLAY_CODE_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrizeCode {
    pub id: i64,
    pub user_id: i64,
    pub award_type: AwardType,
    /// 生成日期
    pub date: NaiveDate,
    /// 兑换积分
    pub amount: i32,
    pub key: String,
    /// key 的十六进制 SHA-256
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
}

impl PrizeCode {
    /// 页面展示用的短码
    pub fn display_code(&self) -> String {
        self.key_hash
            .get(..DISPLAY_CODE_LEN)
            .unwrap_or(&self.key_hash)
            .to_uppercase()
    }
}

/// 待创建的奖品码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrizeCode {
    pub user_id: i64,
    pub award_type: AwardType,
    pub date: NaiveDate,
    pub amount: i32,
    pub key: String,
    pub key_hash: String,
}

impl NewPrizeCode {
    /// 为一次徽章授予构造奖品码
    pub fn for_badge_award(
        user_id: i64,
        username: &str,
        badge_slug: &str,
        points: i32,
        date: NaiveDate,
    ) -> Self {
        let award_type = AwardType::BadgeAward;
        let key = badge_award_key(username, award_type, badge_slug);
        let key_hash = hash_key(&key);
        Self {
            user_id,
            award_type,
            date,
            amount: points,
            key,
            key_hash,
        }
    }
}

/// 构造徽章奖品码 key：`{username}_{award_type}_badge_{slug}`
pub fn badge_award_key(username: &str, award_type: AwardType, badge_slug: &str) -> String {
    format!("{}_{}_badge_{}", username, award_type.as_str(), badge_slug)
}

/// 计算 key 的十六进制 SHA-256
pub fn hash_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_award_key_format() {
        assert_eq!(
            badge_award_key("alice", AwardType::BadgeAward, "first-post"),
            "alice_badge_award_badge_first-post"
        );
    }

    #[test]
    fn test_hash_key_is_deterministic_hex() {
        let a = hash_key("alice_badge_award_badge_first-post");
        let b = hash_key("alice_badge_award_badge_first-post");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, hash_key("bob_badge_award_badge_first-post"));
    }

    #[test]
    fn test_hash_key_known_vector() {
        // sha256("abc")
        assert_eq!(
            hash_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_new_prize_code_for_badge_award() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let code = NewPrizeCode::for_badge_award(3, "alice", "first-post", 25, date);
        assert_eq!(code.user_id, 3);
        assert_eq!(code.amount, 25);
        assert_eq!(code.award_type, AwardType::BadgeAward);
        assert_eq!(code.key, "alice_badge_award_badge_first-post");
        assert_eq!(code.key_hash, hash_key(&code.key));
    }

    #[test]
    fn test_display_code() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let new_code = NewPrizeCode::for_badge_award(3, "alice", "first-post", 25, date);
        let code = PrizeCode {
            id: 1,
            user_id: new_code.user_id,
            award_type: new_code.award_type,
            date,
            amount: new_code.amount,
            key: new_code.key.clone(),
            key_hash: new_code.key_hash.clone(),
            created_at: Utc::now(),
        };
        assert_eq!(code.display_code().len(), 12);
        assert_eq!(code.display_code(), new_code.key_hash[..12].to_uppercase());
    }
}
