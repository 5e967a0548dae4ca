use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::headers::Cookie;
use axum_extra::TypedHeader;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "loars_session";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Lecturer,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Option<Principal>;
}

/// Single lecturer account whose credentials come from deployment config.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        if username == self.username && password == self.password {
            Some(Principal {
                username: username.to_string(),
                role: Role::Lecturer,
            })
        } else {
            None
        }
    }
}

/// Lifetime applied by `SessionStore::default`.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

struct Session {
    principal: Principal,
    created: Instant,
}

/// In-process session table keyed by random tokens. Sessions older than
/// `ttl` are treated as absent and pruned on the next login.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn create(&self, principal: Principal) -> Uuid {
        let token = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.created) < self.ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(target: "auth", pruned, "expired sessions removed");
        }
        sessions.insert(
            token,
            Session {
                principal,
                created: now,
            },
        );
        token
    }

    pub fn get(&self, token: &Uuid) -> Option<Principal> {
        let sessions = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let session = sessions.get(token)?;
        if session.created.elapsed() >= self.ttl {
            drop(sessions);
            self.remove(token);
            return None;
        }
        Some(session.principal.clone())
    }

    pub fn remove(&self, token: &Uuid) -> Option<Principal> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
            .map(|s| s.principal)
    }
}

pub fn session_cookie(token: &Uuid) -> String {
    format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, token)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Session token from the request cookie, if it parses.
pub fn session_token(cookie: &Cookie) -> Option<Uuid> {
    cookie.get(SESSION_COOKIE).and_then(|v| Uuid::parse_str(v).ok())
}

/// An authenticated principal holding the lecturer role.
#[derive(Debug, Clone)]
pub struct Lecturer {
    pub principal: Principal,
    pub token: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for Lecturer
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(cookie) = TypedHeader::<Cookie>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;
        let token = session_token(&cookie).ok_or(AppError::Unauthorized)?;
        let sessions = SessionStore::from_ref(state);
        let principal = sessions.get(&token).ok_or(AppError::Unauthorized)?;
        if principal.role != Role::Lecturer {
            return Err(AppError::Forbidden);
        }
        Ok(Lecturer { principal, token })
    }
}
