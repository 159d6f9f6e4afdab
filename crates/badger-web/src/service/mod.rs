//! 服务层
//!
//! 实现徽章授予和奖品码业务逻辑，协调仓储层。
//!
//! ## 模块结构
//!
//! - `award_service`: 徽章授予（权限校验、唯一徽章去重）
//! - `prize_code_service`: 奖品码幂等生成
//! - `obi`: Open Badges 徽章描述和授予断言

pub mod award_service;
pub mod obi;
pub mod prize_code_service;

pub use award_service::{AwardOutcome, AwardService};
pub use obi::{AwardAssertion, BadgeSerialization, Issuer, ObiContext};
pub use prize_code_service::{AwardWithPrizeCode, PrizeCodeService};
