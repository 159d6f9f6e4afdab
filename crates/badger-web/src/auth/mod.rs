//! 认证模块
//!
//! 身份由外部系统签发的 JWT 携带，本服务只做验证和当前用户解析

mod current_user;
mod jwt;

pub use current_user::CurrentUser;
pub use jwt::{Claims, JwtManager};
