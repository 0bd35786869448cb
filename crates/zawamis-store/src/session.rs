//! Login session slots.
//!
//! The user session and the admin session are independent: each has its own
//! flag and profile slot and ending one leaves the other alone.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use zawamis_shared::constants::{
    ADMIN_AUTHENTICATED_SLOT, ADMIN_USER_SLOT, AUTH_TOKEN_SLOT, CURRENT_USER_SLOT,
    IS_AUTHENTICATED_SLOT, USER_EMAIL_SLOT,
};

use crate::error::Result;
use crate::models::{AdminProfile, UserProfile};
use crate::storage::Storage;

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Start a user session. Without a backend token a random one is issued.
    pub fn begin_user(&self, profile: &UserProfile, token: Option<String>) -> Result<String> {
        let token = token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.put(CURRENT_USER_SLOT, profile)?;
        self.storage.set(USER_EMAIL_SLOT, &profile.email)?;
        self.storage.set(AUTH_TOKEN_SLOT, &token)?;
        self.storage.set(IS_AUTHENTICATED_SLOT, "true")?;

        tracing::info!(user_id = %profile.id, email = %profile.email, "user session started");
        Ok(token)
    }

    pub fn end_user(&self) -> Result<()> {
        for slot in [
            IS_AUTHENTICATED_SLOT,
            CURRENT_USER_SLOT,
            USER_EMAIL_SLOT,
            AUTH_TOKEN_SLOT,
        ] {
            self.storage.remove(slot)?;
        }
        tracing::info!("user session ended");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.flag(IS_AUTHENTICATED_SLOT)
    }

    /// The signed-in user, if the session flag is set and the profile decodes.
    pub fn current_user(&self) -> Option<UserProfile> {
        if !self.is_authenticated() {
            return None;
        }
        self.load(CURRENT_USER_SLOT)
    }

    pub fn user_email(&self) -> Option<String> {
        self.raw(USER_EMAIL_SLOT)
    }

    pub fn auth_token(&self) -> Option<String> {
        self.raw(AUTH_TOKEN_SLOT)
    }

    pub fn begin_admin(&self, profile: &AdminProfile) -> Result<()> {
        self.put(ADMIN_USER_SLOT, profile)?;
        self.storage.set(ADMIN_AUTHENTICATED_SLOT, "true")?;
        tracing::info!(admin_id = %profile.id, email = %profile.email, "admin session started");
        Ok(())
    }

    pub fn end_admin(&self) -> Result<()> {
        self.storage.remove(ADMIN_AUTHENTICATED_SLOT)?;
        self.storage.remove(ADMIN_USER_SLOT)?;
        tracing::info!("admin session ended");
        Ok(())
    }

    pub fn is_admin_authenticated(&self) -> bool {
        self.flag(ADMIN_AUTHENTICATED_SLOT)
    }

    pub fn current_admin(&self) -> Option<AdminProfile> {
        if !self.is_admin_authenticated() {
            return None;
        }
        self.load(ADMIN_USER_SLOT)
    }

    fn put<T: Serialize>(&self, slot: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.storage.set(slot, &text)
    }

    fn raw(&self, slot: &str) -> Option<String> {
        match self.storage.get(slot) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(slot, error = %e, "session slot unreadable");
                None
            }
        }
    }

    fn flag(&self, slot: &str) -> bool {
        self.raw(slot).as_deref() == Some("true")
    }

    fn load<T: DeserializeOwned>(&self, slot: &str) -> Option<T> {
        let text = self.raw(slot)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(slot, error = %e, "session slot does not decode");
                None
            }
        }
    }
}
