//! The support thread between users and admins.
//!
//! All messages of all users live in one unpartitioned slot; per-user views
//! are derived at read time by [`crate::projection`]. Operations that target
//! a missing id are silent no-ops and report `Ok(false)`.

use chrono::Utc;

use zawamis_shared::constants::{MAX_ATTACHMENT_SIZE, MESSAGES_SLOT};
use zawamis_shared::validation::{validate_message, validate_reply};
use zawamis_shared::{Attachment, RecordId, Role};

use crate::error::Result;
use crate::models::{AdminReply, DeletionState, MessageRecord};
use crate::projection::{project_messages, Viewer};
use crate::records::KeyedRecordStore;

#[derive(Clone)]
pub struct MessageThread {
    records: KeyedRecordStore,
    max_attachment_size: usize,
}

impl MessageThread {
    pub fn new(records: KeyedRecordStore) -> Self {
        Self {
            records,
            max_attachment_size: MAX_ATTACHMENT_SIZE,
        }
    }

    pub fn with_attachment_limit(mut self, max_attachment_size: usize) -> Self {
        self.max_attachment_size = max_attachment_size;
        self
    }

    pub fn post(
        &self,
        owner_email: &str,
        owner_name: &str,
        body: &str,
        attachment: Option<Attachment>,
    ) -> Result<MessageRecord> {
        validate_message(body, attachment.as_ref(), self.max_attachment_size)?;

        let floor = self.records.max_id(MESSAGES_SLOT);

        let message = MessageRecord {
            id: RecordId::next_after(floor)?,
            user_email: owner_email.to_string(),
            user_name: owner_name.to_string(),
            text: body.trim().to_string(),
            attachment,
            created_at: Utc::now(),
            deletion: DeletionState::Active,
            reply: None,
        };
        self.records.append_as(MESSAGES_SLOT, &message)?;

        tracing::info!(msg_id = %message.id, owner = %owner_email, "message posted");
        Ok(message)
    }

    /// Hide a message from its owner. Only the owner can do this.
    pub fn delete_for_me(&self, id: RecordId, acting_user_email: &str) -> Result<bool> {
        let changed = self.modify(id, |m| {
            if m.user_email != acting_user_email {
                tracing::debug!(msg_id = %id, "delete-for-me by non-owner ignored");
                return false;
            }
            let next = m.deletion.hide_from(Role::User);
            let changed = next != m.deletion;
            m.deletion = next;
            changed
        })?;

        if changed {
            tracing::info!(msg_id = %id, "message hidden from owner");
        }
        Ok(changed)
    }

    /// The admin console's own soft delete.
    pub fn delete_for_admin(&self, id: RecordId) -> Result<bool> {
        let changed = self.modify(id, |m| {
            let next = m.deletion.hide_from(Role::Admin);
            let changed = next != m.deletion;
            m.deletion = next;
            changed
        })?;

        if changed {
            tracing::info!(msg_id = %id, "message hidden from admins");
        }
        Ok(changed)
    }

    /// Scrub a message for both parties. Confirmation is up to the caller.
    pub fn delete_for_everyone(&self, id: RecordId) -> Result<bool> {
        let changed = self.modify(id, |m| {
            if m.deletion.is_tombstoned() {
                return false;
            }
            m.tombstone();
            true
        })?;

        if changed {
            tracing::info!(msg_id = %id, "message deleted for everyone");
        }
        Ok(changed)
    }

    /// Set the admin reply, replacing any earlier one.
    pub fn reply(&self, id: RecordId, reply_text: &str) -> Result<bool> {
        let text = validate_reply(reply_text)?;

        let changed = self.modify(id, |m| {
            if m.deletion.is_tombstoned() {
                tracing::debug!(msg_id = %id, "reply to deleted message ignored");
                return false;
            }
            m.reply = Some(AdminReply {
                text: text.to_string(),
                replied_at: Utc::now(),
            });
            true
        })?;

        if changed {
            tracing::info!(msg_id = %id, "admin reply saved");
        }
        Ok(changed)
    }

    pub fn project_for(&self, viewer: &Viewer) -> Vec<MessageRecord> {
        project_messages(self.all(), viewer)
    }

    /// Every stored message, including hidden and tombstoned ones.
    pub fn all(&self) -> Vec<MessageRecord> {
        self.records.read_as(MESSAGES_SLOT)
    }

    pub fn get(&self, id: RecordId) -> Option<MessageRecord> {
        self.all().into_iter().find(|m| m.id == id)
    }

    fn modify<F>(&self, id: RecordId, f: F) -> Result<bool>
    where
        F: FnOnce(&mut MessageRecord) -> bool,
    {
        self.records
            .update_as::<MessageRecord, _>(MESSAGES_SLOT, |messages| {
                match messages.iter_mut().find(|m| m.id == id) {
                    Some(message) => f(message),
                    None => {
                        tracing::debug!(msg_id = %id, "message not found, nothing to do");
                        false
                    }
                }
            })
    }
}
