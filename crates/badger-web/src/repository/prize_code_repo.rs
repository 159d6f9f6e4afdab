//! 奖品码仓储
//!
//! 依赖 key_hash 唯一约束实现幂等创建，并发请求同一 key 时只有一条记录落库

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::traits::PrizeCodeRepositoryTrait;
use crate::error::{Result, WebError};
use crate::models::{NewPrizeCode, PrizeCode};

const PRIZE_CODE_COLUMNS: &str =
    "id, user_id, award_type, date, amount, key, key_hash, created_at";

pub struct PrizeCodeRepository {
    pool: PgPool,
}

impl PrizeCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<PrizeCode>> {
        let code = sqlx::query_as::<_, PrizeCode>(&format!(
            "SELECT {PRIZE_CODE_COLUMNS} FROM prize_codes WHERE key_hash = $1"
        ))
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    /// 插入奖品码，key_hash 冲突时读取已存在的记录
    pub async fn insert_if_absent(&self, code: &NewPrizeCode) -> Result<(PrizeCode, bool)> {
        let inserted = sqlx::query_as::<_, PrizeCode>(&format!(
            r#"
            INSERT INTO prize_codes (user_id, award_type, date, amount, key, key_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (key_hash) DO NOTHING
            RETURNING {PRIZE_CODE_COLUMNS}
            "#
        ))
        .bind(code.user_id)
        .bind(code.award_type)
        .bind(code.date)
        .bind(code.amount)
        .bind(&code.key)
        .bind(&code.key_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(created) = inserted {
            return Ok((created, true));
        }

        debug!(key_hash = %code.key_hash, "奖品码已存在，读取已有记录");
        let existing = self.get_by_key_hash(&code.key_hash).await?.ok_or_else(|| {
            WebError::Internal(format!("奖品码冲突后未找到记录: {}", code.key_hash))
        })?;

        Ok((existing, false))
    }
}

#[async_trait]
impl PrizeCodeRepositoryTrait for PrizeCodeRepository {
    async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<PrizeCode>> {
        self.get_by_key_hash(key_hash).await
    }

    async fn insert_if_absent(&self, code: &NewPrizeCode) -> Result<(PrizeCode, bool)> {
        self.insert_if_absent(code).await
    }
}
