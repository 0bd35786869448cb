/// Application name
pub const APP_NAME: &str = "Zawamis";

// Storage slot names. These match the keys the web client writes; entries
// in the old plaintext or locale-date layouts are skipped on read.

pub const USERS_SLOT: &str = "users";
pub const ADMIN_USERS_SLOT: &str = "adminUsers";
pub const REGISTRATIONS_SLOT: &str = "userRegistrations";
pub const JOB_APPLICATIONS_SLOT: &str = "jobApplications";
/// Legacy duplicate of `jobApplications`. Never written.
pub const USER_APPLICATIONS_SLOT: &str = "userApplications";
pub const MESSAGES_SLOT: &str = "userComments";
pub const JOB_VIEWS_SLOT: &str = "jobViews";

// Session slots
pub const IS_AUTHENTICATED_SLOT: &str = "isAuthenticated";
pub const ADMIN_AUTHENTICATED_SLOT: &str = "adminAuthenticated";
pub const CURRENT_USER_SLOT: &str = "currentUser";
pub const ADMIN_USER_SLOT: &str = "adminUser";
pub const USER_EMAIL_SLOT: &str = "userEmail";
pub const AUTH_TOKEN_SLOT: &str = "authToken";

/// Maximum number of whitespace-delimited words in a message body
pub const MAX_MESSAGE_WORDS: usize = 200;

/// Text left behind when a message is deleted for everyone
pub const TOMBSTONE_TEXT: &str = "This message has been deleted";

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum message attachment size in bytes (5 MiB)
pub const MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024;

/// Default polling period for view refresh, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Viewer label recorded for anonymous job views
pub const GUEST_VIEWER: &str = "Guest";

pub const MIME_PDF: &str = "application/pdf";
pub const PHOTO_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];
