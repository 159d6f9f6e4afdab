//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserRepositoryTrait;
use crate::error::{Result, WebError};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, is_staff, is_superuser, date_joined";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// 创建用户，用户名重复时返回 AlreadyExists
    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                WebError::AlreadyExists(format!("用户名已存在: {}", user.username))
            }
            other => WebError::Database(other),
        })?;

        Ok(created)
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_by_username(username).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_by_id(id).await
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        self.create(user).await
    }
}
