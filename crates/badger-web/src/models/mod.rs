//! Badger 领域模型
//!
//! 包含徽章、授予记录、用户和奖品码实体定义

pub mod award;
pub mod badge;
pub mod enums;
pub mod prize_code;
pub mod user;

// 重新导出常用类型
pub use award::{Award, AwardDetail, NewAward};
pub use badge::{Badge, BadgeQuery, BadgeSort, NewBadge};
pub use enums::AwardType;
pub use prize_code::{NewPrizeCode, PrizeCode};
pub use user::{NewUser, User};
