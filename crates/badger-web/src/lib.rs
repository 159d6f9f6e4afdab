//! Badger 徽章站点
//!
//! 徽章浏览与搜索、授予表单、授予记录列表，以及 Open Badges (OBI) 0.5 JSON 输出。
//! 用户领取徽章页面时，为每条授予记录幂等生成奖品码。

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod templates;

pub use error::{Result, WebError};
pub use routes::app;
pub use state::AppState;
