//! Domain records persisted in storage slots.
//!
//! Everything is serialized camelCase, matching the field names the web
//! client reads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use zawamis_shared::constants::TOMBSTONE_TEXT;
use zawamis_shared::{
    ApplicationStatus, Attachment, CredentialHash, Gender, MaritalStatus, RecordId, Role,
};

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// References to the documents uploaded at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDocuments {
    pub passport_photo: Option<String>,
    pub birth_certificate: Option<String>,
    pub education_certificate: Option<String>,
}

/// Everything about a user that is safe to hand to a view. This is also what
/// the `currentUser` session slot holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: RecordId,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub gender: Gender,
    pub id_number: String,
    pub marital_status: MaritalStatus,
    pub form_four_number: String,
    pub registration_date: DateTime<Utc>,
    #[serde(default)]
    pub documents: UserDocuments,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Entry of the `users` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub credential: CredentialHash,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Admin-facing projection of a user registration (`userRegistrations`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub user_id: RecordId,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub id_number: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub marital_status: MaritalStatus,
    pub form_four_number: String,
    pub registration_date: DateTime<Utc>,
}

impl From<&UserProfile> for RegistrationRecord {
    fn from(p: &UserProfile) -> Self {
        Self {
            user_id: p.id,
            first_name: p.first_name.clone(),
            middle_name: p.middle_name.clone(),
            last_name: p.last_name.clone(),
            email: p.email.clone(),
            phone_number: p.phone_number.clone(),
            id_number: p.id_number.clone(),
            gender: p.gender,
            date_of_birth: p.date_of_birth,
            marital_status: p.marital_status,
            form_four_number: p.form_four_number.clone(),
            registration_date: p.registration_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Admins
// ---------------------------------------------------------------------------

/// Admin identity without credentials; held by the `adminUser` session slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: RecordId,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    pub phone_number: String,
    pub email: String,
    pub registration_date: DateTime<Utc>,
}

/// Entry of the `adminUsers` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    #[serde(flatten)]
    pub profile: AdminProfile,
    pub credential: CredentialHash,
}

// ---------------------------------------------------------------------------
// Job applications
// ---------------------------------------------------------------------------

/// Entry of the `jobApplications` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: RecordId,
    pub user_id: RecordId,
    pub user_name: String,
    pub user_email: String,
    pub job_title: String,
    pub cv_file: String,
    pub cv_file_name: String,
    pub cover_letter_file: String,
    pub cover_letter_file_name: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
}

/// The "documents" view of an application: who submitted which files.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSubmission {
    pub application_id: RecordId,
    pub user_id: RecordId,
    pub user_name: String,
    pub user_email: String,
    pub cv_file: String,
    pub cv_file_name: String,
    pub cover_letter_file: String,
    pub cover_letter_file_name: String,
    pub application_date: DateTime<Utc>,
}

impl From<&ApplicationRecord> for DocumentSubmission {
    fn from(a: &ApplicationRecord) -> Self {
        Self {
            application_id: a.id,
            user_id: a.user_id,
            user_name: a.user_name.clone(),
            user_email: a.user_email.clone(),
            cv_file: a.cv_file.clone(),
            cv_file_name: a.cv_file_name.clone(),
            cover_letter_file: a.cover_letter_file.clone(),
            cover_letter_file_name: a.cover_letter_file_name.clone(),
            application_date: a.application_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who can still see a message.
///
/// Stored as the `deletedByUser` / `deletedByAdmin` flags plus a
/// `tombstoned` marker; see [`DeletionFlags`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "DeletionFlags", into = "DeletionFlags")]
pub enum DeletionState {
    #[default]
    Active,
    HiddenFromUser,
    HiddenFromAdmin,
    HiddenFromBoth,
    /// Deleted for everyone; content scrubbed. Terminal.
    Tombstoned,
}

impl DeletionState {
    pub fn hide_from(self, role: Role) -> Self {
        match (self, role) {
            (Self::Tombstoned, _) => Self::Tombstoned,
            (Self::Active, Role::User) => Self::HiddenFromUser,
            (Self::Active, Role::Admin) => Self::HiddenFromAdmin,
            (Self::HiddenFromAdmin, Role::User) | (Self::HiddenFromUser, Role::Admin) => {
                Self::HiddenFromBoth
            }
            (state, _) => state,
        }
    }

    pub fn is_visible_to(self, role: Role) -> bool {
        match self {
            Self::Active => true,
            Self::HiddenFromUser => role == Role::Admin,
            Self::HiddenFromAdmin => role == Role::User,
            Self::HiddenFromBoth | Self::Tombstoned => false,
        }
    }

    pub fn is_tombstoned(self) -> bool {
        self == Self::Tombstoned
    }
}

/// On-disk encoding of [`DeletionState`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionFlags {
    #[serde(default)]
    pub deleted_by_user: bool,
    #[serde(default)]
    pub deleted_by_admin: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tombstoned: bool,
}

impl From<DeletionFlags> for DeletionState {
    fn from(f: DeletionFlags) -> Self {
        match (f.tombstoned, f.deleted_by_user, f.deleted_by_admin) {
            (true, _, _) => Self::Tombstoned,
            (false, false, false) => Self::Active,
            (false, true, false) => Self::HiddenFromUser,
            (false, false, true) => Self::HiddenFromAdmin,
            (false, true, true) => Self::HiddenFromBoth,
        }
    }
}

impl From<DeletionState> for DeletionFlags {
    fn from(s: DeletionState) -> Self {
        let (deleted_by_user, deleted_by_admin, tombstoned) = match s {
            DeletionState::Active => (false, false, false),
            DeletionState::HiddenFromUser => (true, false, false),
            DeletionState::HiddenFromAdmin => (false, true, false),
            DeletionState::HiddenFromBoth => (true, true, false),
            DeletionState::Tombstoned => (true, true, true),
        };
        Self {
            deleted_by_user,
            deleted_by_admin,
            tombstoned,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminReply {
    #[serde(rename = "adminReply")]
    pub text: String,
    #[serde(rename = "replyDate")]
    pub replied_at: DateTime<Utc>,
}

/// Entry of the `userComments` slot: one support message from a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: RecordId,
    pub user_email: String,
    pub user_name: String,
    pub text: String,
    #[serde(flatten)]
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub deletion: DeletionState,
    #[serde(flatten)]
    pub reply: Option<AdminReply>,
}

impl MessageRecord {
    /// Scrub content and hide from everyone. Cannot be undone.
    pub fn tombstone(&mut self) {
        self.text = TOMBSTONE_TEXT.to_string();
        self.attachment = None;
        self.deletion = DeletionState::Tombstoned;
    }
}

// ---------------------------------------------------------------------------
// Job views
// ---------------------------------------------------------------------------

/// Entry of the `jobViews` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobViewRecord {
    pub job_title: String,
    pub view_date: DateTime<Utc>,
    pub session_id: String,
    /// Viewer email, or `"Guest"`.
    pub user: String,
}
