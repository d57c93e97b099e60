//! HTTP Basic authentication and role-based gating.
//!
//! [`authenticate`] resolves the caller into a [`Principal`] stored in the
//! request extensions; [`require_role`] then admits or rejects the request
//! with a [`RoleGate`] predicate before any handler runs.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::entities::{role, user};
use crate::error::{ErrorMessage, ERRORS_HEADER};

pub const OWNER_ADMIN: &str = "OWNER_ADMIN";
pub const VET_ADMIN: &str = "VET_ADMIN";
pub const ADMIN: &str = "ADMIN";

const ROLE_PREFIX: &str = "ROLE_";
const REALM: &str = "Basic realm=\"petclinic\"";

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    /// Matches `role` whether it was stored bare or with the `ROLE_` prefix.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .iter()
            .any(|r| r.strip_prefix(ROLE_PREFIX).unwrap_or(r) == role)
    }
}

/// Admission predicate evaluated against the request's [`Principal`].
#[derive(Clone)]
pub struct RoleGate {
    predicate: Arc<dyn Fn(&Principal) -> bool + Send + Sync>,
}

impl RoleGate {
    pub fn new(predicate: impl Fn(&Principal) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn has_role(role: &'static str) -> Self {
        Self::new(move |principal| principal.has_role(role))
    }

    pub fn permits(&self, principal: &Principal) -> bool {
        (self.predicate)(principal)
    }
}

#[derive(Clone)]
pub struct Authenticator {
    db: DatabaseConnection,
}

impl Authenticator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the principal when the user exists, is enabled and the
    /// password matches its stored hash.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, DbErr> {
        let Some(account) = user::Entity::find_by_id(username.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        if !account.enabled || !verify_password(password, &account.password) {
            return Ok(None);
        }

        let roles = role::Entity::find()
            .filter(role::Column::Username.eq(username))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.role)
            .collect();

        Ok(Some(Principal {
            username: account.username,
            roles,
        }))
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn rejection(status: StatusCode, message: &str) -> Response {
    let mut response = status.into_response();
    if let Ok(json) = ErrorMessage::new(message).to_json() {
        if let Ok(value) = HeaderValue::from_str(&json) {
            response.headers_mut().insert(ERRORS_HEADER, value);
        }
    }
    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    }
    response
}

/// Attaches a [`Principal`] to requests carrying valid Basic credentials.
///
/// Requests without an `Authorization` header pass through anonymously;
/// requests with bad credentials are rejected here.
pub async fn authenticate(
    State(authenticator): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(header::AUTHORIZATION) {
        return next.run(request).await;
    }

    let Some((username, password)) = basic_credentials(request.headers()) else {
        return rejection(StatusCode::UNAUTHORIZED, "Malformed credentials");
    };

    match authenticator.authenticate(&username, &password).await {
        Ok(Some(principal)) => {
            tracing::Span::current().record("user", principal.username.as_str());
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!(user = %username, "rejected credentials");
            rejection(StatusCode::UNAUTHORIZED, "Bad credentials")
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load user");
            rejection(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub async fn require_role(State(gate): State<RoleGate>, request: Request, next: Next) -> Response {
    match request.extensions().get::<Principal>() {
        None => rejection(StatusCode::UNAUTHORIZED, "Full authentication is required"),
        Some(principal) if !gate.permits(principal) => {
            tracing::Span::current().record("error", "forbidden");
            rejection(StatusCode::FORBIDDEN, "Access is denied")
        }
        Some(_) => next.run(request).await,
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Creates or refreshes an enabled account and grants it `roles`.
pub async fn ensure_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    roles: &[&str],
) -> Result<(), DbErr> {
    let password_hash =
        hash_password(password).map_err(|e| DbErr::Custom(format!("password hashing: {}", e)))?;

    let account = user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password_hash),
        enabled: Set(true),
    };
    if user::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_some()
    {
        account.update(db).await?;
    } else {
        account.insert(db).await?;
    }

    let granted: Vec<String> = role::Entity::find()
        .filter(role::Column::Username.eq(username))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.role)
        .collect();

    for role_name in roles {
        let stored = format!("{}{}", ROLE_PREFIX, role_name);
        if granted.contains(&stored) {
            continue;
        }
        role::ActiveModel {
            username: Set(username.to_string()),
            role: Set(stored),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    tracing::info!(user = %username, "ensured account");
    Ok(())
}
