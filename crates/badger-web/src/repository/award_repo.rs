//! 授予记录仓储
//!
//! 列表查询统一联表带出徽章、获奖人和颁发人的展示字段

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::AwardRepositoryTrait;
use crate::error::Result;
use crate::models::{Award, AwardDetail, NewAward};

const AWARD_COLUMNS: &str = "id, badge_id, user_id, creator_id, created_at, modified_at";

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.badge_id, a.user_id, a.creator_id, a.created_at, a.modified_at,
           b.slug AS badge_slug, b.title AS badge_title, b.image AS badge_image,
           b.points AS badge_points,
           u.username AS username, u.email AS user_email,
           c.username AS creator_username, c.email AS creator_email
    FROM awards a
    JOIN badges b ON b.id = a.badge_id
    JOIN users u ON u.id = a.user_id
    LEFT JOIN users c ON c.id = a.creator_id
"#;

/// 授予记录仓储
pub struct AwardRepository {
    pool: PgPool,
}

impl AwardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建授予记录
    pub async fn create(&self, award: &NewAward) -> Result<Award> {
        let created = sqlx::query_as::<_, Award>(&format!(
            r#"
            INSERT INTO awards (badge_id, user_id, creator_id)
            VALUES ($1, $2, $3)
            RETURNING {AWARD_COLUMNS}
            "#
        ))
        .bind(award.badge_id)
        .bind(award.user_id)
        .bind(award.creator_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// 唯一徽章授予
    ///
    /// 事务内先锁定徽章行，同一徽章的并发授予在此串行；
    /// 插入以 NOT EXISTS 为条件，未插入时读取已有的最早记录
    pub async fn create_unique(&self, award: &NewAward) -> Result<(Award, bool)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM badges WHERE id = $1 FOR UPDATE")
            .bind(award.badge_id)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query_as::<_, Award>(&format!(
            r#"
            INSERT INTO awards (badge_id, user_id, creator_id)
            SELECT $1::BIGINT, $2::BIGINT, $3::BIGINT
            WHERE NOT EXISTS (
                SELECT 1 FROM awards WHERE badge_id = $1 AND user_id = $2
            )
            RETURNING {AWARD_COLUMNS}
            "#
        ))
        .bind(award.badge_id)
        .bind(award.user_id)
        .bind(award.creator_id)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(created) => (created, true),
            None => {
                let existing = sqlx::query_as::<_, Award>(&format!(
                    r#"
                    SELECT {AWARD_COLUMNS}
                    FROM awards
                    WHERE badge_id = $1 AND user_id = $2
                    ORDER BY created_at ASC, id ASC
                    LIMIT 1
                    "#
                ))
                .bind(award.badge_id)
                .bind(award.user_id)
                .fetch_one(&mut *tx)
                .await?;
                (existing, false)
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    pub async fn get_detail(&self, badge_id: i64, id: i64) -> Result<Option<AwardDetail>> {
        let detail = sqlx::query_as::<_, AwardDetail>(&format!(
            "{DETAIL_SELECT} WHERE a.badge_id = $1 AND a.id = $2"
        ))
        .bind(badge_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AwardDetail>> {
        let awards = sqlx::query_as::<_, AwardDetail>(&format!(
            "{DETAIL_SELECT} ORDER BY a.modified_at DESC, a.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(awards)
    }

    pub async fn list_recent_for_badge(
        &self,
        badge_id: i64,
        limit: i64,
    ) -> Result<Vec<AwardDetail>> {
        let awards = sqlx::query_as::<_, AwardDetail>(&format!(
            "{DETAIL_SELECT} WHERE a.badge_id = $1 ORDER BY a.created_at DESC, a.id DESC LIMIT $2"
        ))
        .bind(badge_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(awards)
    }

    /// 分页列表，badge_id 为空时不限定徽章
    pub async fn list(
        &self,
        badge_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AwardDetail>> {
        let awards = sqlx::query_as::<_, AwardDetail>(&format!(
            r#"
            {DETAIL_SELECT}
            WHERE ($1::BIGINT IS NULL OR a.badge_id = $1)
            ORDER BY a.modified_at DESC, a.id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(badge_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(awards)
    }

    pub async fn count(&self, badge_id: Option<i64>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM awards WHERE ($1::BIGINT IS NULL OR badge_id = $1)",
        )
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<AwardDetail>> {
        let awards = sqlx::query_as::<_, AwardDetail>(&format!(
            "{DETAIL_SELECT} WHERE a.user_id = $1 ORDER BY a.modified_at DESC, a.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(awards)
    }

    pub async fn list_by_badge(&self, badge_id: i64) -> Result<Vec<AwardDetail>> {
        let awards = sqlx::query_as::<_, AwardDetail>(&format!(
            "{DETAIL_SELECT} WHERE a.badge_id = $1 ORDER BY a.modified_at DESC, a.id DESC"
        ))
        .bind(badge_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(awards)
    }
}

#[async_trait]
impl AwardRepositoryTrait for AwardRepository {
    async fn create(&self, award: &NewAward) -> Result<Award> {
        self.create(award).await
    }

    async fn create_unique(&self, award: &NewAward) -> Result<(Award, bool)> {
        self.create_unique(award).await
    }

    async fn get_detail(&self, badge_id: i64, id: i64) -> Result<Option<AwardDetail>> {
        self.get_detail(badge_id, id).await
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AwardDetail>> {
        self.list_recent(limit).await
    }

    async fn list_recent_for_badge(&self, badge_id: i64, limit: i64) -> Result<Vec<AwardDetail>> {
        self.list_recent_for_badge(badge_id, limit).await
    }

    async fn list(
        &self,
        badge_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AwardDetail>> {
        self.list(badge_id, offset, limit).await
    }

    async fn count(&self, badge_id: Option<i64>) -> Result<i64> {
        self.count(badge_id).await
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<AwardDetail>> {
        self.list_by_user(user_id).await
    }

    async fn list_by_badge(&self, badge_id: i64) -> Result<Vec<AwardDetail>> {
        self.list_by_badge(badge_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBadge, NewUser};
    use crate::repository::{BadgeRepository, UserRepository};
    use badger_shared::config::DatabaseConfig;
    use badger_shared::database::Database;

    static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore] // 需要数据库连接
    async fn test_create_unique_concurrent_single_award() {
        let db = Database::connect(&DatabaseConfig::default()).await.unwrap();
        db.run_migrations(&MIGRATOR).await.unwrap();
        let pool = db.pool().clone();

        let suffix = chrono::Utc::now().timestamp_micros();
        let user = UserRepository::new(pool.clone())
            .create(&NewUser {
                username: format!("unique-{}", suffix),
                email: format!("unique-{}@example.com", suffix),
                ..Default::default()
            })
            .await
            .unwrap();
        let badge = BadgeRepository::new(pool.clone())
            .create(&NewBadge {
                slug: format!("unique-{}", suffix),
                title: "Unique".into(),
                is_unique: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = AwardRepository::new(pool.clone());
                let new_award = NewAward {
                    badge_id: badge.id,
                    user_id: user.id,
                    creator_id: None,
                };
                tokio::spawn(async move { repo.create_unique(&new_award).await.unwrap() })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().1 {
                created += 1;
            }
        }

        let repo = AwardRepository::new(pool);
        assert_eq!(created, 1);
        assert_eq!(repo.list_by_badge(badge.id).await.unwrap().len(), 1);
    }
}
