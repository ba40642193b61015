use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::input::{LoginInput, RegisterInput};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{issue_token, validate_jwt, Identity, IssuedToken};
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, User};
use crate::database::Store;
use crate::error::ApiError;
use crate::types::{Role, Scope};

const UNAUTHENTICATED: &str = "Unauthenticated.";

/// Registration, login, logout and bearer-token resolution
pub struct AccountService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

/// A user together with a freshly issued token
pub struct Session {
    pub user: User,
    pub token: IssuedToken,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Create an account directly, bypassing registration rules
    pub async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User, ApiError> {
        let user = self
            .store
            .insert_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password, self.security.bcrypt_cost)?,
                role,
            })
            .await?;
        info!("Created {} account {} <{}>", user.role, user.id, user.email);
        Ok(user)
    }

    /// Self-service sign-up; always yields a `user` role with the `user` scope
    pub async fn register(&self, input: RegisterInput) -> Result<Session, ApiError> {
        if !self.security.allow_registration {
            return Err(ApiError::forbidden("Registration is disabled"));
        }
        let user = self.create_user(&input.name, &input.email, &input.password, Role::User).await?;
        let token = self.issue(&user, vec![Scope::User]).await?;
        Ok(Session { user, token })
    }

    pub async fn login(&self, input: LoginInput) -> Result<Session, ApiError> {
        let user = match self.store.find_user_by_email(&input.email).await? {
            Some(user) if verify_password(&input.password, &user.password_hash)? => user,
            _ => {
                warn!("Failed login attempt for {}", input.email);
                return Err(ApiError::invalid_credentials());
            }
        };

        let token = self.issue(&user, user.role.scopes()).await?;
        info!("User {} logged in with scopes {:?}", user.id, token.record.scopes);
        Ok(Session { user, token })
    }

    /// Revoke the token the caller authenticated with
    pub async fn logout(&self, identity: &Identity) -> Result<(), ApiError> {
        if !self.store.revoke_token(identity.token_id).await? {
            return Err(ApiError::not_authenticated(UNAUTHENTICATED));
        }
        info!("User {} logged out", identity.user_id);
        Ok(())
    }

    pub async fn current_user(&self, identity: &Identity) -> Result<User, ApiError> {
        self.store
            .find_user(identity.user_id)
            .await?
            .ok_or_else(|| ApiError::not_authenticated(UNAUTHENTICATED))
    }

    /// Resolve a bearer token to the caller's identity. The token must verify,
    /// be on record, unrevoked and unexpired, and its user must still exist.
    /// Admin rights need both the stored role and the `admin` scope.
    pub async fn resolve(&self, bearer: &str) -> Result<Identity, ApiError> {
        let claims = validate_jwt(&self.security.jwt_secret, bearer)?;

        let record = match self.store.find_token(claims.jti).await? {
            Some(record) if record.user_id == claims.sub && record.is_active(Utc::now()) => record,
            _ => {
                warn!("Rejected revoked or unknown token {}", claims.jti);
                return Err(ApiError::not_authenticated(UNAUTHENTICATED));
            }
        };

        let user = self
            .store
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| ApiError::not_authenticated(UNAUTHENTICATED))?;

        let role = if user.role == Role::Admin && record.scopes.contains(&Scope::Admin) {
            Role::Admin
        } else {
            Role::User
        };

        Ok(Identity {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role,
            scopes: record.scopes,
            token_id: record.id,
        })
    }

    /// Delete every revoked or expired token on record
    pub async fn prune_tokens(&self) -> Result<u64, ApiError> {
        let removed = self.store.purge_inactive_tokens(None, Utc::now()).await?;
        info!("Pruned {} inactive access tokens", removed);
        Ok(removed)
    }

    /// Each new token also clears the user's dead ones
    async fn issue(&self, user: &User, scopes: Vec<Scope>) -> Result<IssuedToken, ApiError> {
        let issued = issue_token(&self.security, user, scopes)?;
        self.store.purge_inactive_tokens(Some(user.id), Utc::now()).await?;
        self.store.insert_token(&issued.record).await?;
        Ok(issued)
    }
}
