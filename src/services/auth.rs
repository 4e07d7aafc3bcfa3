// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::clean_name},
    db::store::{Filter, Update},
    models::auth::{AuthResponse, Claims, User, UserProfile, UserStatus},
    services::{soft_delete::SoftDeleteFilter, transaction::TransactionRunner},
};

#[derive(Clone)]
pub struct AuthService {
    runner: TransactionRunner,
    jwt_secret: String,
    jwt_ttl: Duration,
    bcrypt_cost: u32,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn by_email(email: &str) -> Filter {
    SoftDeleteFilter::visible(Filter::new().eq("email", email))
}

impl AuthService {
    pub fn new(
        runner: TransactionRunner,
        jwt_secret: String,
        jwt_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            runner,
            jwt_secret,
            jwt_ttl,
            bcrypt_cost,
        }
    }

    pub async fn register_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AuthResponse, AppError> {
        let name = clean_name(name)?;

        // 1. Hashing (fora da transação, pois não toca no banco)
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name,
            password_hash,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };

        // 2. E-mail único + gravação, na mesma transação
        let created = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    if tx.find_one::<User>(&by_email(&user.email)).await?.is_some() {
                        return Err(AppError::Conflict("E-mail já cadastrado".into()));
                    }
                    tx.insert(&user).await
                })
            })
            .await?;

        tracing::info!(user_id = %created.id, "Novo usuário registrado");

        // 3. Gera o token
        let token = self.create_token(created.id)?;
        Ok(AuthResponse {
            token,
            user: created.into(),
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let email = normalize_email(email);
        let user = self
            .runner
            .run(move |tx| Box::pin(async move { tx.find_one::<User>(&by_email(&email)).await }))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.find_active(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.find_active(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::not_found("Usuário"))
    }

    pub async fn update_profile(&self, user_id: Uuid, name: &str) -> Result<UserProfile, AppError> {
        let update = Update::new().set("name", clean_name(name)?);
        let user = self
            .runner
            .run(move |tx| {
                Box::pin(async move {
                    tx.find_one_and_update::<User>(
                        &SoftDeleteFilter::visible(Filter::by_id(user_id)),
                        &update,
                    )
                    .await
                })
            })
            .await?
            .ok_or_else(|| AppError::not_found("Usuário"))?;

        Ok(user.into())
    }

    /// Exclusão lógica da conta; o token deixa de valer na próxima requisição.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    tx.find_one_and_update::<User>(
                        &SoftDeleteFilter::deletable(Filter::by_id(user_id)),
                        &SoftDeleteFilter::mark_deleted(),
                    )
                    .await
                })
            })
            .await?
            .ok_or_else(|| AppError::not_found("Usuário"))?;

        tracing::info!(%user_id, "Conta excluída");
        Ok(())
    }

    async fn find_active(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.runner
            .run(move |tx| {
                Box::pin(async move {
                    tx.find_one::<User>(&SoftDeleteFilter::visible(Filter::by_id(user_id)))
                        .await
                })
            })
            .await
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.jwt_ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
