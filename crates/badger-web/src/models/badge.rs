//! 徽章实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// 徽章定义
///
/// 一个可被授予的荣誉凭证，slug 全局唯一，用于 URL 定位
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    /// URL 标识
    pub slug: String,
    pub title: String,
    pub description: String,
    /// 徽章图片地址，为空时展示站点默认图片
    #[sqlx(default)]
    pub image: Option<String>,
    /// 创建人，系统内置徽章为空
    #[sqlx(default)]
    pub creator_id: Option<i64>,
    /// 每位用户最多获得一次
    pub is_unique: bool,
    /// 获得徽章后兑换奖品码的积分
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Badge {
    /// 该用户能否授予此徽章
    ///
    /// 管理员、超级管理员和徽章创建人可以授予
    pub fn allows_award_to(&self, user: &User) -> bool {
        user.is_staff || user.is_superuser || self.creator_id == Some(user.id)
    }

    pub fn detail_path(&self) -> String {
        format!("/badges/{}", self.slug)
    }

    pub fn json_path(&self) -> String {
        format!("/badges/{}.json", self.slug)
    }

    pub fn award_path(&self) -> String {
        format!("/badges/{}/award", self.slug)
    }

    pub fn awards_path(&self) -> String {
        format!("/badges/{}/awards", self.slug)
    }

    pub fn recipients_path(&self) -> String {
        format!("/badges/{}/recipients", self.slug)
    }

    pub fn award_detail_path(&self, award_id: i64) -> String {
        format!("/badges/{}/awards/{}", self.slug, award_id)
    }
}

/// 新建徽章参数
#[derive(Debug, Clone, Default)]
pub struct NewBadge {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub creator_id: Option<i64>,
    pub is_unique: bool,
    pub points: i32,
}

/// 徽章列表排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadgeSort {
    CreatedAsc,
    CreatedDesc,
    ModifiedAsc,
    #[default]
    ModifiedDesc,
    TitleAsc,
    TitleDesc,
    PointsAsc,
    PointsDesc,
}

impl BadgeSort {
    /// 搜索时未指定排序使用的默认值
    pub const SEARCH_DEFAULT: BadgeSort = BadgeSort::CreatedAsc;

    /// 解析 `sort` 查询参数，前缀 `-` 表示倒序
    ///
    /// 不在白名单中的值返回 None，由调用方决定回退值
    pub fn parse(value: &str) -> Option<Self> {
        let sort = match value.trim() {
            "created" => Self::CreatedAsc,
            "-created" => Self::CreatedDesc,
            "modified" => Self::ModifiedAsc,
            "-modified" => Self::ModifiedDesc,
            "title" => Self::TitleAsc,
            "-title" => Self::TitleDesc,
            "points" => Self::PointsAsc,
            "-points" => Self::PointsDesc,
            _ => return None,
        };
        Some(sort)
    }

    /// 查询参数形式
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::CreatedAsc => "created",
            Self::CreatedDesc => "-created",
            Self::ModifiedAsc => "modified",
            Self::ModifiedDesc => "-modified",
            Self::TitleAsc => "title",
            Self::TitleDesc => "-title",
            Self::PointsAsc => "points",
            Self::PointsDesc => "-points",
        }
    }

    /// SQL ORDER BY 子句，id 作为次级排序保证分页稳定
    pub fn order_by_sql(&self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_at ASC, id ASC",
            Self::CreatedDesc => "created_at DESC, id DESC",
            Self::ModifiedAsc => "modified_at ASC, id ASC",
            Self::ModifiedDesc => "modified_at DESC, id DESC",
            Self::TitleAsc => "title ASC, id ASC",
            Self::TitleDesc => "title DESC, id DESC",
            Self::PointsAsc => "points ASC, id ASC",
            Self::PointsDesc => "points DESC, id DESC",
        }
    }

    /// 内存存储使用的比较函数，与 `order_by_sql` 保持一致
    pub fn compare(&self, a: &Badge, b: &Badge) -> std::cmp::Ordering {
        let ord = match self {
            Self::CreatedAsc | Self::CreatedDesc => a.created_at.cmp(&b.created_at),
            Self::ModifiedAsc | Self::ModifiedDesc => a.modified_at.cmp(&b.modified_at),
            Self::TitleAsc | Self::TitleDesc => a.title.cmp(&b.title),
            Self::PointsAsc | Self::PointsDesc => a.points.cmp(&b.points),
        }
        .then(a.id.cmp(&b.id));

        if self.is_descending() { ord.reverse() } else { ord }
    }

    fn is_descending(&self) -> bool {
        matches!(
            self,
            Self::CreatedDesc | Self::ModifiedDesc | Self::TitleDesc | Self::PointsDesc
        )
    }
}

/// 徽章列表查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeQuery {
    /// 搜索词，每个词都必须命中标题或描述（不区分大小写）
    pub terms: Vec<String>,
    pub sort: BadgeSort,
}

impl BadgeQuery {
    /// 全部徽章，按修改时间倒序
    pub fn all() -> Self {
        Self::default()
    }

    /// 关键字搜索
    pub fn search(query: &str, sort: Option<&str>) -> Self {
        let terms = query
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();
        let sort = sort
            .and_then(BadgeSort::parse)
            .unwrap_or(BadgeSort::SEARCH_DEFAULT);

        Self { terms, sort }
    }

    /// 内存存储使用的匹配逻辑
    pub fn matches(&self, badge: &Badge) -> bool {
        let title = badge.title.to_lowercase();
        let description = badge.description.to_lowercase();
        self.terms.iter().all(|term| {
            let term = term.to_lowercase();
            title.contains(&term) || description.contains(&term)
        })
    }
}
