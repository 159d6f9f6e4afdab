//! 中间件模块
//!
//! 提供身份解析中间件

mod auth;

pub use auth::auth_middleware;
