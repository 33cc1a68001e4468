use std::sync::Arc;
use crate::domain::{
    models::{auth::Claims, user::{normalize_email, Role, User}},
    ports::UserRepository,
    services::password::{hash_password, verify_password, UNMATCHABLE_HASH},
};
use crate::error::AppError;
use crate::config::Config;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use chrono::{Utc, Duration};
use tracing::{info, warn};

pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
}

pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, config: &Config) -> Self {
        Self {
            repo,
            issuer: config.auth_issuer.clone(),
            ttl: Duration::hours(config.jwt_ttl_hours),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub async fn register(&self, identity: NewIdentity) -> Result<(User, String), AppError> {
        let email = normalize_email(&identity.email);
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password(&identity.password)?;
        let user = User::new(identity.name.trim().to_string(), email, password_hash, identity.role, identity.phone);
        let created = self.repo.create(&user).await?;
        let token = self.issue_token(&created)?;

        info!("Identity registered: {} ({})", created.id, created.role);
        Ok((created, token))
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let Some(user) = self.repo.find_by_email(&normalize_email(email)).await? else {
            // Same Argon2 work as a wrong password.
            let _ = verify_password(password, UNMATCHABLE_HASH);
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for identity {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!("User logged in: {}", user.id);
        Ok((user, token))
    }

    /// Verifies the bearer token, then re-reads the identity so role and
    /// contact data are never taken from the token itself.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.verify_token(token)?;
        self.repo.find_by_id(&claims.sub).await?
            .ok_or_else(|| AppError::Unauthenticated("Identity no longer exists".into()))
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user.id.clone(),
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated("Not authorized, token failed".into()))
    }
}
