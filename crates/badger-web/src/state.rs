//! 应用状态定义
//!
//! 包含 Axum 路由共享的仓储、服务和配置

use std::sync::Arc;

use badger_shared::config::{AuthConfig, SiteConfig};
use badger_shared::database::Database;

use crate::auth::JwtManager;
use crate::repository::{
    AwardRepository, AwardRepositoryTrait, BadgeRepository, BadgeRepositoryTrait,
    MemoryRepository, PrizeCodeRepository, PrizeCodeRepositoryTrait, UserRepository,
    UserRepositoryTrait,
};
use crate::service::{AwardService, PrizeCodeService};

/// Axum 应用共享状态
///
/// 仓储以 trait 对象持有，同一组 handler 可运行在 PostgreSQL 或内存存储之上
#[derive(Clone)]
pub struct AppState {
    pub badge_repo: Arc<dyn BadgeRepositoryTrait>,
    pub user_repo: Arc<dyn UserRepositoryTrait>,
    pub award_repo: Arc<dyn AwardRepositoryTrait>,
    pub award_service: Arc<AwardService>,
    pub prize_code_service: Arc<PrizeCodeService>,
    pub jwt_manager: Arc<JwtManager>,
    pub site: Arc<SiteConfig>,
    pub auth: Arc<AuthConfig>,
    /// 内存存储时为空，就绪检查直接通过
    pub db: Option<Database>,
}

impl AppState {
    /// 基于 PostgreSQL 创建应用状态
    pub fn postgres(db: Database, site: SiteConfig, auth: AuthConfig) -> Self {
        let pool = db.pool().clone();
        let mut state = Self::build(
            Arc::new(BadgeRepository::new(pool.clone())),
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(AwardRepository::new(pool.clone())),
            Arc::new(PrizeCodeRepository::new(pool)),
            site,
            auth,
        );
        state.db = Some(db);
        state
    }

    /// 基于内存存储创建应用状态
    pub fn in_memory(store: MemoryRepository, site: SiteConfig, auth: AuthConfig) -> Self {
        let store = Arc::new(store);
        Self::build(store.clone(), store.clone(), store.clone(), store, site, auth)
    }

    fn build(
        badge_repo: Arc<dyn BadgeRepositoryTrait>,
        user_repo: Arc<dyn UserRepositoryTrait>,
        award_repo: Arc<dyn AwardRepositoryTrait>,
        prize_code_repo: Arc<dyn PrizeCodeRepositoryTrait>,
        site: SiteConfig,
        auth: AuthConfig,
    ) -> Self {
        Self {
            award_service: Arc::new(AwardService::new(award_repo.clone())),
            prize_code_service: Arc::new(PrizeCodeService::new(prize_code_repo)),
            jwt_manager: Arc::new(JwtManager::new(&auth)),
            badge_repo,
            user_repo,
            award_repo,
            site: Arc::new(site),
            auth: Arc::new(auth),
            db: None,
        }
    }
}
