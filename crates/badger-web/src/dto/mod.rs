//! 请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{BadgeAwardForm, BadgeListParams, FormErrors, PageParams};
pub use response::{BADGE_PAGE_SIZE, MAX_RECENT, Page};
