//! 仓储 Trait 定义
//!
//! 服务层和处理器依赖这些接口而非具体实现，便于在 PostgreSQL 与内存存储间切换，
//! 单元测试中使用 mockall 生成的 mock。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Award, AwardDetail, Badge, BadgeQuery, NewAward, NewBadge, NewPrizeCode, NewUser, PrizeCode,
    User,
};

/// 徽章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepositoryTrait: Send + Sync {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Badge>>;
    /// 最近修改的徽章
    async fn list_recent(&self, limit: i64) -> Result<Vec<Badge>>;
    async fn list(&self, query: &BadgeQuery, offset: i64, limit: i64) -> Result<Vec<Badge>>;
    async fn count(&self, query: &BadgeQuery) -> Result<i64>;
    async fn create(&self, badge: &NewBadge) -> Result<Badge>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn create(&self, user: &NewUser) -> Result<User>;
}

/// 授予记录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AwardRepositoryTrait: Send + Sync {
    async fn create(&self, award: &NewAward) -> Result<Award>;
    /// 唯一徽章的授予：同一 (徽章, 用户) 已有记录时返回最早的一条
    ///
    /// 返回最终记录以及本次是否新建，并发调用只会新建一条
    async fn create_unique(&self, award: &NewAward) -> Result<(Award, bool)>;
    /// 按徽章和 id 获取，记录不属于该徽章时返回 None
    async fn get_detail(&self, badge_id: i64, id: i64) -> Result<Option<AwardDetail>>;
    /// 最近修改的授予记录
    async fn list_recent(&self, limit: i64) -> Result<Vec<AwardDetail>>;
    /// 某徽章最近创建的授予记录
    async fn list_recent_for_badge(&self, badge_id: i64, limit: i64) -> Result<Vec<AwardDetail>>;
    /// 分页列表，按修改时间倒序，可限定徽章
    async fn list(&self, badge_id: Option<i64>, offset: i64, limit: i64)
    -> Result<Vec<AwardDetail>>;
    async fn count(&self, badge_id: Option<i64>) -> Result<i64>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<AwardDetail>>;
    async fn list_by_badge(&self, badge_id: i64) -> Result<Vec<AwardDetail>>;
}

/// 奖品码仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrizeCodeRepositoryTrait: Send + Sync {
    async fn get_by_key_hash(&self, key_hash: &str) -> Result<Option<PrizeCode>>;
    /// 按 key_hash 幂等插入
    ///
    /// 返回最终记录以及本次是否新建
    async fn insert_if_absent(&self, code: &NewPrizeCode) -> Result<(PrizeCode, bool)>;
}
