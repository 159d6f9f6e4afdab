//! 徽章授予服务
//!
//! 授予前校验颁发人权限；唯一徽章对同一用户只授予一次，重复授予返回已有记录。

use std::sync::Arc;

use tracing::{info, instrument, warn};

use badger_shared::observability::metrics;

use crate::error::{Result, WebError};
use crate::models::{Award, Badge, NewAward, User};
use crate::repository::AwardRepositoryTrait;

/// 授予结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardOutcome {
    pub award: Award,
    /// 本次是否新建了授予记录
    pub created: bool,
}

pub struct AwardService {
    award_repo: Arc<dyn AwardRepositoryTrait>,
}

impl AwardService {
    pub fn new(award_repo: Arc<dyn AwardRepositoryTrait>) -> Self {
        Self { award_repo }
    }

    /// 将徽章授予用户
    ///
    /// awarder 为 None 表示系统授予，不做权限校验
    #[instrument(skip_all, fields(badge = %badge.slug, awardee = %awardee.username))]
    pub async fn award_to(
        &self,
        badge: &Badge,
        awardee: &User,
        awarder: Option<&User>,
    ) -> Result<AwardOutcome> {
        if let Some(awarder) = awarder
            && !badge.allows_award_to(awarder)
        {
            warn!(awarder = %awarder.username, "无权授予该徽章");
            metrics::record_badge_award(&badge.slug, "forbidden");
            return Err(WebError::Forbidden(format!(
                "{} 无权授予徽章 {}",
                awarder.username, badge.slug
            )));
        }

        let new_award = NewAward {
            badge_id: badge.id,
            user_id: awardee.id,
            creator_id: awarder.map(|u| u.id),
        };

        let (award, created) = if badge.is_unique {
            self.award_repo.create_unique(&new_award).await?
        } else {
            (self.award_repo.create(&new_award).await?, true)
        };

        if !created {
            info!(award_id = award.id, "唯一徽章已授予，返回已有记录");
            metrics::record_badge_award(&badge.slug, "existing");
            return Ok(AwardOutcome {
                award,
                created: false,
            });
        }

        info!(
            award_id = award.id,
            awarder = awarder.map(|u| u.username.as_str()).unwrap_or("system"),
            "徽章授予成功"
        );
        metrics::record_badge_award(&badge.slug, "created");

        Ok(AwardOutcome {
            award,
            created: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockAwardRepositoryTrait;
    use chrono::Utc;

    fn create_test_user(id: i64, username: &str, is_staff: bool) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            is_staff,
            is_superuser: false,
            date_joined: Utc::now(),
        }
    }

    fn create_test_badge(is_unique: bool) -> Badge {
        let now = Utc::now();
        Badge {
            id: 10,
            slug: "first-post".to_string(),
            title: "First Post".to_string(),
            description: String::new(),
            image: None,
            creator_id: Some(1),
            is_unique,
            points: 5,
            created_at: now,
            modified_at: now,
        }
    }

    fn create_test_award(id: i64, user_id: i64, creator_id: Option<i64>) -> Award {
        let now = Utc::now();
        Award {
            id,
            badge_id: 10,
            user_id,
            creator_id,
            created_at: now,
            modified_at: now,
        }
    }

    #[tokio::test]
    async fn test_award_by_creator_creates_award() {
        let mut repo = MockAwardRepositoryTrait::new();
        repo.expect_create_unique().never();
        repo.expect_create()
            .withf(|new| new.badge_id == 10 && new.user_id == 2 && new.creator_id == Some(1))
            .times(1)
            .returning(|new| Ok(create_test_award(100, new.user_id, new.creator_id)));

        let service = AwardService::new(Arc::new(repo));
        let creator = create_test_user(1, "creator", false);
        let awardee = create_test_user(2, "alice", false);

        let outcome = service
            .award_to(&create_test_badge(false), &awardee, Some(&creator))
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.award.id, 100);
    }

    #[tokio::test]
    async fn test_award_forbidden_for_other_user() {
        let mut repo = MockAwardRepositoryTrait::new();
        repo.expect_create().never();

        let service = AwardService::new(Arc::new(repo));
        let stranger = create_test_user(3, "mallory", false);
        let awardee = create_test_user(2, "alice", false);

        let err = service
            .award_to(&create_test_badge(false), &awardee, Some(&stranger))
            .await
            .unwrap_err();

        assert!(matches!(err, WebError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unique_badge_returns_existing_award() {
        let mut repo = MockAwardRepositoryTrait::new();
        repo.expect_create_unique()
            .withf(|new| new.badge_id == 10 && new.user_id == 2 && new.creator_id == Some(4))
            .times(1)
            .returning(|new| Ok((create_test_award(55, new.user_id, Some(1)), false)));
        repo.expect_create().never();

        let service = AwardService::new(Arc::new(repo));
        let staff = create_test_user(4, "staff", true);
        let awardee = create_test_user(2, "alice", false);

        let outcome = service
            .award_to(&create_test_badge(true), &awardee, Some(&staff))
            .await
            .unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.award.id, 55);
    }

    #[tokio::test]
    async fn test_unique_badge_first_award_created() {
        let mut repo = MockAwardRepositoryTrait::new();
        repo.expect_create_unique()
            .times(1)
            .returning(|new| Ok((create_test_award(56, new.user_id, new.creator_id), true)));
        repo.expect_create().never();

        let service = AwardService::new(Arc::new(repo));
        let awardee = create_test_user(2, "alice", false);

        let outcome = service
            .award_to(&create_test_badge(true), &awardee, None)
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.award.creator_id, None);
    }

    #[tokio::test]
    async fn test_repository_error_propagates() {
        let mut repo = MockAwardRepositoryTrait::new();
        repo.expect_create()
            .returning(|_| Err(WebError::Database(sqlx::Error::PoolTimedOut)));

        let service = AwardService::new(Arc::new(repo));
        let awardee = create_test_user(2, "alice", false);

        let err = service
            .award_to(&create_test_badge(false), &awardee, None)
            .await
            .unwrap_err();

        assert!(matches!(err, WebError::Database(_)));
    }
}
