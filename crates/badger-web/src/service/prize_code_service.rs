//! 奖品码服务
//!
//! 每个 (用户, 来源类型, 徽章) 组合对应唯一的奖品码。查看用户的授予列表时
//! 按 key 的哈希先查后建，重复查看不会产生新记录。

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use badger_shared::observability::metrics;

use crate::error::Result;
use crate::models::{AwardDetail, NewPrizeCode, PrizeCode, User};
use crate::repository::PrizeCodeRepositoryTrait;

/// 附带奖品码的授予记录
#[derive(Debug, Clone)]
pub struct AwardWithPrizeCode {
    pub award: AwardDetail,
    pub prize_code: PrizeCode,
}

pub struct PrizeCodeService {
    prize_code_repo: Arc<dyn PrizeCodeRepositoryTrait>,
}

impl PrizeCodeService {
    pub fn new(prize_code_repo: Arc<dyn PrizeCodeRepositoryTrait>) -> Self {
        Self { prize_code_repo }
    }

    /// 获取或创建某次授予对应的奖品码
    ///
    /// 新建时 date 取 today，amount 取徽章积分
    #[instrument(skip_all, fields(user = %user.username, badge = %award.badge_slug))]
    pub async fn prize_code_for(
        &self,
        user: &User,
        award: &AwardDetail,
        today: NaiveDate,
    ) -> Result<PrizeCode> {
        let candidate = NewPrizeCode::for_badge_award(
            user.id,
            &user.username,
            &award.badge_slug,
            award.badge_points,
            today,
        );

        if let Some(existing) = self
            .prize_code_repo
            .get_by_key_hash(&candidate.key_hash)
            .await?
        {
            return Ok(existing);
        }

        let (code, created) = self.prize_code_repo.insert_if_absent(&candidate).await?;
        if created {
            info!(prize_code_id = code.id, amount = code.amount, "奖品码已生成");
            metrics::record_prize_code_created(code.award_type.as_str());
        }

        Ok(code)
    }

    /// 为用户的每条授予记录附上奖品码
    pub async fn attach_prize_codes(
        &self,
        user: &User,
        awards: Vec<AwardDetail>,
    ) -> Result<Vec<AwardWithPrizeCode>> {
        let today = Utc::now().date_naive();
        let mut result = Vec::with_capacity(awards.len());
        for award in awards {
            let prize_code = self.prize_code_for(user, &award, today).await?;
            result.push(AwardWithPrizeCode { award, prize_code });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Award, AwardType};
    use crate::repository::MockPrizeCodeRepositoryTrait;

    fn create_test_user() -> User {
        User {
            id: 2,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
        }
    }

    fn create_test_award_detail(slug: &str, points: i32) -> AwardDetail {
        let now = Utc::now();
        AwardDetail {
            award: Award {
                id: 1,
                badge_id: 10,
                user_id: 2,
                creator_id: None,
                created_at: now,
                modified_at: now,
            },
            badge_slug: slug.to_string(),
            badge_title: slug.to_string(),
            badge_image: None,
            badge_points: points,
            username: "alice".to_string(),
            user_email: "alice@example.com".to_string(),
            creator_username: None,
            creator_email: None,
        }
    }

    fn stored(code: &NewPrizeCode, id: i64) -> PrizeCode {
        PrizeCode {
            id,
            user_id: code.user_id,
            award_type: code.award_type,
            date: code.date,
            amount: code.amount,
            key: code.key.clone(),
            key_hash: code.key_hash.clone(),
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_existing_prize_code_is_reused() {
        let expected = NewPrizeCode::for_badge_award(2, "alice", "first-post", 5, today());
        let existing = stored(&expected, 9);

        let mut repo = MockPrizeCodeRepositoryTrait::new();
        let returned = existing.clone();
        let key_hash = expected.key_hash.clone();
        repo.expect_get_by_key_hash()
            .withf(move |hash| hash == key_hash)
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        repo.expect_insert_if_absent().never();

        let service = PrizeCodeService::new(Arc::new(repo));
        let code = service
            .prize_code_for(
                &create_test_user(),
                &create_test_award_detail("first-post", 5),
                today(),
            )
            .await
            .unwrap();

        assert_eq!(code, existing);
    }

    #[tokio::test]
    async fn test_missing_prize_code_is_created() {
        let mut repo = MockPrizeCodeRepositoryTrait::new();
        repo.expect_get_by_key_hash().returning(|_| Ok(None));
        repo.expect_insert_if_absent()
            .withf(|code| {
                code.key == "alice_badge_award_badge_first-post"
                    && code.amount == 5
                    && code.award_type == AwardType::BadgeAward
                    && code.user_id == 2
            })
            .times(1)
            .returning(|code| Ok((stored(code, 1), true)));

        let service = PrizeCodeService::new(Arc::new(repo));
        let code = service
            .prize_code_for(
                &create_test_user(),
                &create_test_award_detail("first-post", 5),
                today(),
            )
            .await
            .unwrap();

        assert_eq!(code.id, 1);
        assert_eq!(code.date, today());
    }

    #[tokio::test]
    async fn test_lost_insert_race_returns_winner() {
        let mut repo = MockPrizeCodeRepositoryTrait::new();
        repo.expect_get_by_key_hash().returning(|_| Ok(None));
        repo.expect_insert_if_absent()
            .returning(|code| Ok((stored(code, 42), false)));

        let service = PrizeCodeService::new(Arc::new(repo));
        let code = service
            .prize_code_for(
                &create_test_user(),
                &create_test_award_detail("first-post", 5),
                today(),
            )
            .await
            .unwrap();

        assert_eq!(code.id, 42);
    }

    #[tokio::test]
    async fn test_attach_prize_codes_pairs_each_award() {
        let mut repo = MockPrizeCodeRepositoryTrait::new();
        repo.expect_get_by_key_hash().times(2).returning(|_| Ok(None));
        repo.expect_insert_if_absent()
            .times(2)
            .returning(|code| Ok((stored(code, code.amount as i64), true)));

        let service = PrizeCodeService::new(Arc::new(repo));
        let awards = vec![
            create_test_award_detail("first-post", 5),
            create_test_award_detail("tenth-post", 50),
        ];

        let result = service
            .attach_prize_codes(&create_test_user(), awards)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].award.badge_slug, "first-post");
        assert_eq!(result[0].prize_code.amount, 5);
        assert_eq!(result[1].prize_code.key, "alice_badge_award_badge_tenth-post");
    }
}
