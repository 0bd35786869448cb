//! Actor-specific read views over ledgers and the message thread.
//!
//! Projections never mutate storage. Ordering is fixed:
//! - a user sees their own records newest first;
//! - an admin sees everything visible to admins in store order (oldest first).

use zawamis_shared::Role;

use crate::models::{ApplicationRecord, MessageRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    User { email: String },
    Admin,
}

impl Viewer {
    pub fn user(email: impl Into<String>) -> Self {
        Self::User {
            email: email.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Admin => Role::Admin,
        }
    }

    fn owns(&self, owner_email: &str) -> bool {
        match self {
            Self::User { email } => email == owner_email,
            Self::Admin => true,
        }
    }
}

pub fn project_messages(records: Vec<MessageRecord>, viewer: &Viewer) -> Vec<MessageRecord> {
    let role = viewer.role();
    let visible = records
        .into_iter()
        .filter(|m| viewer.owns(&m.user_email) && m.deletion.is_visible_to(role));

    match viewer {
        Viewer::User { .. } => newest_first(visible.collect(), |m| m.id),
        Viewer::Admin => visible.collect(),
    }
}

pub fn project_applications(
    records: Vec<ApplicationRecord>,
    viewer: &Viewer,
) -> Vec<ApplicationRecord> {
    let visible = records
        .into_iter()
        .filter(|a| viewer.owns(&a.user_email));

    match viewer {
        Viewer::User { .. } => newest_first(visible.collect(), |a| a.id),
        Viewer::Admin => visible.collect(),
    }
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use zawamis_shared::RecordId;

    use super::*;
    use crate::models::DeletionState;

    fn msg(id: u64, email: &str, deletion: DeletionState) -> MessageRecord {
        MessageRecord {
            id: RecordId(id),
            user_email: email.into(),
            user_name: "n".into(),
            text: format!("m{id}"),
            attachment: None,
            created_at: Utc::now(),
            deletion,
            reply: None,
        }
    }

    fn ids(records: &[MessageRecord]) -> Vec<u64> {
        records.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn user_sees_own_visible_messages_newest_first() {
        let records = vec![
            msg(1, "a@x", DeletionState::Active),
            msg(2, "b@x", DeletionState::Active),
            msg(3, "a@x", DeletionState::HiddenFromUser),
            msg(4, "a@x", DeletionState::HiddenFromAdmin),
            msg(5, "a@x", DeletionState::Active),
        ];

        let view = project_messages(records, &Viewer::user("a@x"));
        assert_eq!(ids(&view), vec![5, 4, 1]);
    }

    #[test]
    fn admin_sees_all_owners_in_store_order() {
        let records = vec![
            msg(1, "a@x", DeletionState::Active),
            msg(2, "b@x", DeletionState::HiddenFromUser),
            msg(3, "a@x", DeletionState::HiddenFromAdmin),
            msg(4, "c@x", DeletionState::Tombstoned),
            msg(5, "c@x", DeletionState::HiddenFromBoth),
            msg(6, "c@x", DeletionState::Active),
        ];

        let view = project_messages(records, &Viewer::Admin);
        assert_eq!(ids(&view), vec![1, 2, 6]);
    }
}
