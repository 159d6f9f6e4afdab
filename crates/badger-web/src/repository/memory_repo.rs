//! 内存仓储
//!
//! 以 MemoryStore 为底层实现全部仓储接口，行为与 PostgreSQL 实现保持一致：
//! slug 和用户名唯一，奖品码按 key_hash 幂等创建。

use std::cmp::Reverse;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::memory_store::MemoryStore;
use super::traits::{
    AwardRepositoryTrait, BadgeRepositoryTrait, PrizeCodeRepositoryTrait, UserRepositoryTrait,
};
use crate::error::{Result, WebError};
use crate::models::{
    Award, AwardDetail, Badge, BadgeQuery, NewAward, NewBadge, NewPrizeCode, NewUser, PrizeCode,
    User,
};

/// 内存仓储
///
/// 克隆后共享同一份数据，可同时作为四种仓储注入 AppState
#[derive(Clone, Default)]
pub struct MemoryRepository {
    users: MemoryStore<User>,
    badges: MemoryStore<Badge>,
    awards: MemoryStore<Award>,
    /// 用户名 -> 用户 id
    usernames: Arc<DashMap<String, i64>>,
    /// slug -> 徽章 id
    slugs: Arc<DashMap<String, i64>>,
    /// (徽章 id, 用户 id) -> 唯一徽章的授予记录 id
    unique_awards: Arc<DashMap<(i64, i64), i64>>,
    /// key_hash -> 奖品码
    prize_codes: Arc<DashMap<String, PrizeCode>>,
    prize_code_seq: Arc<AtomicI64>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已生成的奖品码数量
    pub fn prize_code_count(&self) -> usize {
        self.prize_codes.len()
    }

    /// 已创建的授予记录数量
    pub fn award_count(&self) -> usize {
        self.awards.count()
    }

    fn insert_award(&self, award: &NewAward) -> Award {
        let now = Utc::now();
        let created = Award {
            id: self.awards.next_id(),
            badge_id: award.badge_id,
            user_id: award.user_id,
            creator_id: award.creator_id,
            created_at: now,
            modified_at: now,
        };
        self.awards.insert(created.id, created.clone());
        created
    }

    fn earliest_award(&self, badge_id: i64, user_id: i64) -> Option<Award> {
        self.awards
            .list_by(|a| a.badge_id == badge_id && a.user_id == user_id)
            .into_iter()
            .min_by_key(|a| (a.created_at, a.id))
    }

    fn to_detail(&self, award: Award) -> Option<AwardDetail> {
        let badge = self.badges.get(award.badge_id)?;
        let user = self.users.get(award.user_id)?;
        let creator = award.creator_id.and_then(|id| self.users.get(id));

        Some(AwardDetail {
            award,
            badge_slug: badge.slug,
            badge_title: badge.title,
            badge_image: badge.image,
            badge_points: badge.points,
            username: user.username,
            user_email: user.email,
            creator_username: creator.as_ref().map(|c| c.username.clone()),
            creator_email: creator.map(|c| c.email),
        })
    }

    fn details<F>(&self, predicate: F) -> Vec<AwardDetail>
    where
        F: Fn(&Award) -> bool,
    {
        self.awards
            .list_by(predicate)
            .into_iter()
            .filter_map(|award| self.to_detail(award))
            .collect()
    }
}

/// 按修改时间倒序
fn sort_by_modified_desc(awards: &mut [AwardDetail]) {
    awards.sort_by_key(|a| Reverse((a.award.modified_at, a.award.id)));
}

fn page<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl BadgeRepositoryTrait for MemoryRepository {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Badge>> {
        Ok(self
            .slugs
            .get(slug)
            .and_then(|id| self.badges.get(*id.value())))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Badge>> {
        let mut badges = self.badges.list();
        badges.sort_by_key(|b| Reverse((b.modified_at, b.id)));
        Ok(page(badges, 0, limit))
    }

    async fn list(&self, query: &BadgeQuery, offset: i64, limit: i64) -> Result<Vec<Badge>> {
        let mut badges = self.badges.list_by(|b| query.matches(b));
        badges.sort_by(|a, b| query.sort.compare(a, b));
        Ok(page(badges, offset, limit))
    }

    async fn count(&self, query: &BadgeQuery) -> Result<i64> {
        Ok(self.badges.list_by(|b| query.matches(b)).len() as i64)
    }

    async fn create(&self, badge: &NewBadge) -> Result<Badge> {
        match self.slugs.entry(badge.slug.clone()) {
            Entry::Occupied(_) => Err(WebError::AlreadyExists(format!(
                "徽章 slug 已存在: {}",
                badge.slug
            ))),
            Entry::Vacant(entry) => {
                let now = Utc::now();
                let created = Badge {
                    id: self.badges.next_id(),
                    slug: badge.slug.clone(),
                    title: badge.title.clone(),
                    description: badge.description.clone(),
                    image: badge.image.clone(),
                    creator_id: badge.creator_id,
                    is_unique: badge.is_unique,
                    points: badge.points,
                    created_at: now,
                    modified_at: now,
                };
                self.badges.insert(created.id, created.clone());
                entry.insert(created.id);
                Ok(created)
            }
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .usernames
            .get(username)
            .and_then(|id| self.users.get(*id.value())))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(id))
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(WebError::AlreadyExists(format!(
                "用户名已存在: {}",
                user.username
            ))),
            Entry::Vacant(entry) => {
                let created = User {
                    id: self.users.next_id(),
                    username: user.username.clone(),
                    email: user.email.clone(),
                    is_staff: user.is_staff,
                    is_superuser: user.is_superuser,
                    date_joined: Utc::now(),
                };
                self.users.insert(created.id, created.clone());
                entry.insert(created.id);
                Ok(created)
            }
        }
    }
}

#[async_trait]
impl AwardRepositoryTrait for MemoryRepository {
    async fn create(&self, award: &NewAward) -> Result<Award> {
        Ok(self.insert_award(award))
    }

    async fn create_unique(&self, award: &NewAward) -> Result<(Award, bool)> {
        // entry 持有分片锁，同一 (徽章, 用户) 的授予在锁内完成
        match self.unique_awards.entry((award.badge_id, award.user_id)) {
            Entry::Occupied(entry) => {
                let id = *entry.get();
                let existing = self
                    .awards
                    .get(id)
                    .ok_or_else(|| WebError::Internal(format!("授予记录索引失效: {}", id)))?;
                Ok((existing, false))
            }
            Entry::Vacant(entry) => {
                if let Some(existing) = self.earliest_award(award.badge_id, award.user_id) {
                    entry.insert(existing.id);
                    return Ok((existing, false));
                }
                let created = self.insert_award(award);
                entry.insert(created.id);
                Ok((created, true))
            }
        }
    }

    async fn get_detail(&self, badge_id: i64, id: i64) -> Result<Option<AwardDetail>> {
        Ok(self
            .awards
            .get(id)
            .filter(|a| a.badge_id == badge_id)
            .and_then(|a| self.to_detail(a)))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AwardDetail>> {
        let mut awards = self.details(|_| true);
        sort_by_modified_desc(&mut awards);
        Ok(page(awards, 0, limit))
    }

    async fn list_recent_for_badge(&self, badge_id: i64, limit: i64) -> Result<Vec<AwardDetail>> {
        let mut awards = self.details(|a| a.badge_id == badge_id);
        awards.sort_by_key(|a| Reverse((a.award.created_at, a.award.id)));
        Ok(page(awards, 0, limit))
    }

    async fn list(
        &self,
        badge_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AwardDetail>> {
        let mut awards = self.details(|a| badge_id.is_none_or(|id| a.badge_id == id));
        sort_by_modified_desc(&mut awards);
        Ok(page(awards, offset, limit))
    }

    async fn count(&self, badge_id: Option<i64>) -> Result<i64> {
        Ok(self
            .awards
            .list_by(|a| badge_id.is_none_or(|id| a.badge_id == id))
            .len() as i64)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<AwardDetail>> {
        let mut awards = self.details(|a| a.user_id == user_id);
        sort_by_modified_desc(&mut awards);
        Ok(awards)
    }

    async fn list_by_badge(&self, badge_id: i64) -> Result<Vec<AwardDetail>> {
        let mut awards = self.details(|a| a.badge_id == badge_id);
        sort_by_modified_desc(&mut awards);
        Ok(awards)
    }
}

#[async_trait]
impl PrizeCodeRepositoryTrait for MemoryRepository {
    async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<PrizeCode>> {
        Ok(self.prize_codes.get(key_hash).map(|c| c.value().clone()))
    }

    async fn insert_if_absent(&self, code: &NewPrizeCode) -> Result<(PrizeCode, bool)> {
        match self.prize_codes.entry(code.key_hash.clone()) {
            Entry::Occupied(entry) => Ok((entry.get().clone(), false)),
            Entry::Vacant(entry) => {
                let created = PrizeCode {
                    id: self.prize_code_seq.fetch_add(1, Ordering::SeqCst) + 1,
                    user_id: code.user_id,
                    award_type: code.award_type,
                    date: code.date,
                    amount: code.amount,
                    key: code.key.clone(),
                    key_hash: code.key_hash.clone(),
                    created_at: Utc::now(),
                };
                entry.insert(created.clone());
                Ok((created, true))
            }
        }
    }
}
