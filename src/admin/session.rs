//! Admin session marker
//!
//! Login stores `{isAdmin, email}` under `{session}:adminAuth`. The check runs
//! against configured credentials and only gates the back-office routes; it
//! is not a security boundary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::store::{scoped_key, KeyValueStore};
use crate::{Result, StorefrontError};

pub const ADMIN_KEY: &str = "adminAuth";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub is_admin: bool,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AdminSessions {
    kv: Arc<dyn KeyValueStore>,
    credentials: AdminCredentials,
}

impl AdminSessions {
    pub fn new(kv: Arc<dyn KeyValueStore>, credentials: AdminCredentials) -> Self { Self { kv, credentials } }

    pub async fn login(&self, session: &str, email: &str, password: &str) -> Result<AdminSession> {
        let configured = !self.credentials.email.is_empty();
        if !configured || email.trim() != self.credentials.email || password != self.credentials.password {
            warn!(session, "Rejected admin login");
            return Err(StorefrontError::Unauthorized(
                "Credenciales incorrectas. Por favor, intente nuevamente.".to_string(),
            ));
        }
        let marker = AdminSession { is_admin: true, email: self.credentials.email.clone() };
        self.kv.set(&scoped_key(session, ADMIN_KEY), serde_json::to_string(&marker)?).await?;
        info!(session, "Admin logged in");
        Ok(marker)
    }

    pub async fn logout(&self, session: &str) -> Result<()> {
        self.kv.remove(&scoped_key(session, ADMIN_KEY)).await
    }

    /// An unreadable marker counts as logged out.
    pub async fn current(&self, session: &str) -> Result<Option<AdminSession>> {
        let raw = match self.kv.get(&scoped_key(session, ADMIN_KEY)).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match serde_json::from_str(&raw) {
            Ok(marker) => Ok(Some(marker)),
            Err(e) => {
                warn!(session, "Ignoring unreadable admin marker: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn is_admin(&self, session: &str) -> Result<bool> {
        Ok(self.current(session).await?.map(|m| m.is_admin).unwrap_or(false))
    }
}
