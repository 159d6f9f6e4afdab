//! JWT Token 处理
//!
//! 提供 JWT Token 的生成和验证功能

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use badger_shared::config::AuthConfig;

use crate::error::WebError;

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    /// 用户名，用于解析当前用户
    pub username: String,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    pub iss: String,
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    issuer: String,
    expires_in_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            issuer: config.jwt_issuer.clone(),
            expires_in_secs: config.jwt_expires_secs,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// 生成 JWT Token，返回 (token, 过期时间戳)
    pub fn generate_token(&self, user_id: i64, username: &str) -> Result<(String, i64), WebError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| WebError::Internal(format!("JWT 生成失败: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// 验证并解析 JWT Token
    ///
    /// 返回解析后的 Claims，如果 Token 无效、过期或签发者不符则返回错误
    pub fn verify_token(&self, token: &str) -> Result<Claims, WebError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    WebError::Unauthorized("Token 已过期".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    WebError::Unauthorized("无效的 Token".to_string())
                }
                _ => WebError::Unauthorized(format!("Token 验证失败: {}", e)),
            },
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let manager = JwtManager::new(&AuthConfig::default());

        let (token, exp) = manager.generate_token(1, "alice").unwrap();
        let claims = manager.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "badger");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new(&AuthConfig::default());
        assert!(matches!(
            manager.verify_token("invalid.token.here"),
            Err(WebError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = JwtManager::new(&AuthConfig {
            jwt_issuer: "someone-else".to_string(),
            ..Default::default()
        });
        let (token, _) = other.generate_token(1, "alice").unwrap();

        let manager = JwtManager::new(&AuthConfig::default());
        assert!(manager.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = JwtManager::new(&AuthConfig {
            jwt_expires_secs: -3600,
            ..Default::default()
        });
        let (token, _) = manager.generate_token(1, "alice").unwrap();

        assert!(matches!(
            manager.verify_token(&token),
            Err(WebError::Unauthorized(msg)) if msg == "Token 已过期"
        ));
    }
}
