// Admin flag over the injected key/value store.
// A local convenience gate only: credentials come from config and nothing is verified remotely.

use std::sync::Arc;

use crate::cache::KeyValueStore;
use crate::config::AdminConfig;
use crate::error::{AppError, Result};

/// Store key holding the admin flag.
pub const ADMIN_KEY: &str = "isAdmin";

/// Grants and revokes the local admin flag.
pub struct AdminGate {
    store: Arc<dyn KeyValueStore>,
    credentials: Option<(String, String)>,
}

impl AdminGate {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &AdminConfig) -> Self {
        let credentials = match (&config.email, &config.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email.clone(), password.clone()))
            }
            _ => None,
        };
        Self { store, credentials }
    }

    /// Check the pair against configured credentials and set the flag on success.
    pub fn login(&self, email: &str, password: &str) -> Result<()> {
        let Some((expected_email, expected_password)) = &self.credentials else {
            return Err(AppError::AdminDisabled);
        };

        // Both comparisons always run.
        let email_ok = constant_time_eq(email.as_bytes(), expected_email.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), expected_password.as_bytes());
        if !(email_ok & password_ok) {
            tracing::warn!("Rejected admin login");
            return Err(AppError::InvalidCredentials);
        }

        self.store.set(ADMIN_KEY, "true")?;
        tracing::info!("Admin flag set");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear(ADMIN_KEY)
    }

    pub fn is_admin(&self) -> Result<bool> {
        Ok(self.store.get(ADMIN_KEY)?.as_deref() == Some("true"))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
