//! 徽章仓储
//!
//! 提供徽章定义的查询、搜索和创建

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::BadgeRepositoryTrait;
use crate::error::{Result, WebError};
use crate::models::{Badge, BadgeQuery, NewBadge};

const BADGE_COLUMNS: &str = "id, slug, title, description, image, creator_id, is_unique, points, \
                             created_at, modified_at";

/// 徽章仓储
pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按 slug 获取徽章
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Badge>> {
        let badge = sqlx::query_as::<_, Badge>(&format!(
            "SELECT {BADGE_COLUMNS} FROM badges WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge)
    }

    /// 最近修改的徽章
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(&format!(
            "SELECT {BADGE_COLUMNS} FROM badges ORDER BY modified_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    /// 分页查询徽章
    pub async fn list(&self, query: &BadgeQuery, offset: i64, limit: i64) -> Result<Vec<Badge>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {BADGE_COLUMNS} FROM badges"));
        push_search_filter(&mut builder, query);
        builder.push(" ORDER BY ");
        builder.push(query.sort.order_by_sql());
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let badges = builder
            .build_query_as::<Badge>()
            .fetch_all(&self.pool)
            .await?;

        Ok(badges)
    }

    /// 统计满足条件的徽章数
    pub async fn count(&self, query: &BadgeQuery) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM badges");
        push_search_filter(&mut builder, query);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// 创建徽章，slug 重复时返回 AlreadyExists
    pub async fn create(&self, badge: &NewBadge) -> Result<Badge> {
        let created = sqlx::query_as::<_, Badge>(&format!(
            r#"
            INSERT INTO badges (slug, title, description, image, creator_id, is_unique, points)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BADGE_COLUMNS}
            "#
        ))
        .bind(&badge.slug)
        .bind(&badge.title)
        .bind(&badge.description)
        .bind(&badge.image)
        .bind(badge.creator_id)
        .bind(badge.is_unique)
        .bind(badge.points)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                WebError::AlreadyExists(format!("徽章 slug 已存在: {}", badge.slug))
            }
            other => WebError::Database(other),
        })?;

        Ok(created)
    }
}

/// 追加搜索条件：每个词都必须命中标题或描述
fn push_search_filter(builder: &mut QueryBuilder<'_, Postgres>, query: &BadgeQuery) {
    for (i, term) in query.terms.iter().enumerate() {
        let pattern = format!("%{}%", escape_like(term));
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push("(title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

/// 转义 LIKE 通配符，默认转义符为反斜杠
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl BadgeRepositoryTrait for BadgeRepository {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Badge>> {
        self.get_by_slug(slug).await
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Badge>> {
        self.list_recent(limit).await
    }

    async fn list(&self, query: &BadgeQuery, offset: i64, limit: i64) -> Result<Vec<Badge>> {
        self.list(query, offset, limit).await
    }

    async fn count(&self, query: &BadgeQuery) -> Result<i64> {
        self.count(query).await
    }

    async fn create(&self, badge: &NewBadge) -> Result<Badge> {
        self.create(badge).await
    }
}
