//! 数据仓储层
//!
//! 提供徽章、用户、授予记录和奖品码的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 进行数据库操作，排序字段只从白名单拼接
//! - 定义 trait 接口以支持 mock 测试和内存存储

mod award_repo;
mod badge_repo;
mod memory_repo;
mod memory_store;
mod prize_code_repo;
mod traits;
mod user_repo;

pub use award_repo::AwardRepository;
pub use badge_repo::BadgeRepository;
pub use memory_repo::MemoryRepository;
pub use memory_store::MemoryStore;
pub use prize_code_repo::PrizeCodeRepository;
pub use traits::*;
pub use user_repo::UserRepository;
