//! User and admin accounts.
//!
//! Credentials are stored only as salted hashes. Registering a user also
//! appends the admin-facing projection to the registrations ledger.

use chrono::{NaiveDate, Utc};

use zawamis_shared::constants::{ADMIN_USERS_SLOT, USERS_SLOT};
use zawamis_shared::validation::{require_field, validate_document, validate_new_password};
use zawamis_shared::{
    Attachment, CredentialHash, DocumentKind, Gender, MaritalStatus, RecordId, ValidationError,
};

use crate::error::{Result, StoreError};
use crate::ledger::{Ledger, RegistrationLedger};
use crate::models::{
    AdminProfile, AdminRecord, RegistrationRecord, UserDocuments, UserProfile, UserRecord,
};
use crate::records::KeyedRecordStore;

#[derive(Debug, Clone)]
pub struct UserRegistrationForm {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub gender: Gender,
    pub id_number: String,
    pub marital_status: MaritalStatus,
    pub form_four_number: String,
    pub password: String,
    pub confirm_password: String,
    pub passport_photo: Option<Attachment>,
    pub birth_certificate: Option<Attachment>,
    pub education_certificate: Option<Attachment>,
}

impl UserRegistrationForm {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_field(&self.first_name, "first name")?;
        require_field(&self.last_name, "last name")?;
        require_field(&self.email, "email")?;
        require_field(&self.id_number, "ID number")?;
        validate_new_password(&self.password, &self.confirm_password)?;

        for (kind, doc) in self.documents() {
            validate_document(kind, doc.map(|a| a.mime_type.as_str()))?;
        }
        Ok(())
    }

    pub fn documents(&self) -> [(DocumentKind, Option<&Attachment>); 3] {
        [
            (DocumentKind::PassportPhoto, self.passport_photo.as_ref()),
            (DocumentKind::BirthCertificate, self.birth_certificate.as_ref()),
            (
                DocumentKind::EducationCertificate,
                self.education_certificate.as_ref(),
            ),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct AdminRegistrationForm {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub marital_status: Option<MaritalStatus>,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl AdminRegistrationForm {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_field(&self.first_name, "first name")?;
        require_field(&self.last_name, "last name")?;
        require_field(&self.email, "email")?;
        validate_new_password(&self.password, &self.confirm_password)
    }
}

#[derive(Clone)]
pub struct AccountBook {
    users: Ledger<UserRecord>,
    admins: Ledger<AdminRecord>,
    registrations: RegistrationLedger,
}

impl AccountBook {
    pub fn new(records: KeyedRecordStore) -> Self {
        Self {
            users: Ledger::new(records.clone(), USERS_SLOT),
            admins: Ledger::new(records.clone(), ADMIN_USERS_SLOT),
            registrations: RegistrationLedger::registrations(records),
        }
    }

    /// Fail if a local user already has this form's email or ID number.
    pub fn check_available(&self, form: &UserRegistrationForm) -> Result<()> {
        let users = self.users.all();
        if users
            .iter()
            .any(|u| same_email(&u.profile.email, &form.email))
        {
            return Err(StoreError::DuplicateEmail(form.email.clone()));
        }
        let id_number = form.id_number.trim();
        if users.iter().any(|u| u.profile.id_number.trim() == id_number) {
            return Err(StoreError::DuplicateIdNumber(id_number.to_string()));
        }
        Ok(())
    }

    /// Create a local user account.
    ///
    /// `assigned_id` is the id the REST backend gave the user, when there is
    /// one; otherwise a fresh [`RecordId`] is used.
    pub fn register_user(
        &self,
        form: &UserRegistrationForm,
        assigned_id: Option<RecordId>,
    ) -> Result<UserProfile> {
        form.validate()?;
        self.check_available(form)?;

        let credential = CredentialHash::from_password(&form.password)?;
        let id = match assigned_id {
            Some(id) => id,
            None => RecordId::next_after(self.users.max_id())?,
        };

        let profile = UserProfile {
            id,
            first_name: form.first_name.trim().to_string(),
            middle_name: form
                .middle_name
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            last_name: form.last_name.trim().to_string(),
            date_of_birth: form.date_of_birth,
            phone_number: form.phone_number.trim().to_string(),
            email: form.email.trim().to_string(),
            gender: form.gender,
            id_number: form.id_number.trim().to_string(),
            marital_status: form.marital_status,
            form_four_number: form.form_four_number.trim().to_string(),
            registration_date: Utc::now(),
            documents: UserDocuments {
                passport_photo: form.passport_photo.as_ref().map(|a| a.reference.clone()),
                birth_certificate: form.birth_certificate.as_ref().map(|a| a.file_name.clone()),
                education_certificate: form
                    .education_certificate
                    .as_ref()
                    .map(|a| a.file_name.clone()),
            },
        };

        self.users.append(&UserRecord {
            profile: profile.clone(),
            credential,
            is_active: true,
        })?;
        self.registrations
            .append(&RegistrationRecord::from(&profile))?;

        tracing::info!(user_id = %profile.id, email = %profile.email, "user registered");
        Ok(profile)
    }

    pub fn register_admin(&self, form: &AdminRegistrationForm) -> Result<AdminProfile> {
        form.validate()?;

        if self
            .admins
            .all()
            .iter()
            .any(|a| same_email(&a.profile.email, &form.email))
        {
            return Err(StoreError::DuplicateEmail(form.email.clone()));
        }

        let credential = CredentialHash::from_password(&form.password)?;
        let profile = AdminProfile {
            id: RecordId::next_after(self.admins.max_id())?,
            first_name: form.first_name.trim().to_string(),
            middle_name: form.middle_name.clone().filter(|m| !m.trim().is_empty()),
            last_name: form.last_name.trim().to_string(),
            gender: form.gender,
            marital_status: form.marital_status,
            phone_number: form.phone_number.trim().to_string(),
            email: form.email.trim().to_string(),
            registration_date: Utc::now(),
        };

        self.admins.append(&AdminRecord {
            profile: profile.clone(),
            credential,
        })?;

        tracing::info!(admin_id = %profile.id, email = %profile.email, "admin registered");
        Ok(profile)
    }

    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<UserProfile> {
        let user = self
            .users
            .all()
            .into_iter()
            .find(|u| u.is_active && same_email(&u.profile.email, email))
            .ok_or(StoreError::InvalidCredentials)?;

        if !user.credential.verify(password)? {
            tracing::debug!(email, "user login rejected");
            return Err(StoreError::InvalidCredentials);
        }
        Ok(user.profile)
    }

    /// Admin login. A valid *user* login here is reported as
    /// [`StoreError::NotAnAdmin`] so the caller can redirect.
    pub fn authenticate_admin(&self, email: &str, password: &str) -> Result<AdminProfile> {
        if let Some(admin) = self
            .admins
            .all()
            .into_iter()
            .find(|a| same_email(&a.profile.email, email))
        {
            if admin.credential.verify(password)? {
                return Ok(admin.profile);
            }
        }

        if self.authenticate_user(email, password).is_ok() {
            return Err(StoreError::NotAnAdmin);
        }

        tracing::debug!(email, "admin login rejected");
        Err(StoreError::InvalidCredentials)
    }

    /// Record a login the backend accepted.
    ///
    /// The backend is the authority on who exists: a local account with this
    /// email gets the backend's profile (when it sent one) and a credential
    /// for `password`; otherwise the backend's profile becomes a new local
    /// account. Without either there is nothing to sign in as.
    pub fn adopt_remote_login(
        &self,
        email: &str,
        password: &str,
        remote: Option<UserProfile>,
    ) -> Result<UserProfile> {
        let credential = CredentialHash::from_password(password)?;

        let mut adopted = None;
        self.users.update(|users| {
            let Some(user) = users
                .iter_mut()
                .find(|u| same_email(&u.profile.email, email))
            else {
                return false;
            };
            if let Some(remote) = remote.clone() {
                let documents = std::mem::take(&mut user.profile.documents);
                user.profile = UserProfile {
                    documents: if remote.documents == UserDocuments::default() {
                        documents
                    } else {
                        remote.documents.clone()
                    },
                    ..remote
                };
            }
            user.credential = credential.clone();
            user.is_active = true;
            adopted = Some(user.profile.clone());
            true
        })?;
        if let Some(profile) = adopted {
            tracing::info!(user_id = %profile.id, email, "local account refreshed from backend");
            return Ok(profile);
        }

        let profile = remote.ok_or_else(|| StoreError::AccountNotFound(email.to_string()))?;
        self.users.append(&UserRecord {
            profile: profile.clone(),
            credential,
            is_active: true,
        })?;
        tracing::info!(user_id = %profile.id, email, "local account created from backend");
        Ok(profile)
    }

    /// Set a new password on every account (user and admin) with this email.
    pub fn reset_password(&self, email: &str, new_password: &str, confirm: &str) -> Result<()> {
        validate_new_password(new_password, confirm)?;

        let credential = CredentialHash::from_password(new_password)?;

        let user_updated = self.users.update(|users| {
            let mut hit = false;
            for user in users.iter_mut().filter(|u| same_email(&u.profile.email, email)) {
                user.credential = credential.clone();
                hit = true;
            }
            hit
        })?;
        let admin_updated = self.admins.update(|admins| {
            let mut hit = false;
            for admin in admins
                .iter_mut()
                .filter(|a| same_email(&a.profile.email, email))
            {
                admin.credential = credential.clone();
                hit = true;
            }
            hit
        })?;

        if !user_updated && !admin_updated {
            return Err(StoreError::AccountNotFound(email.to_string()));
        }

        tracing::info!(email, user_updated, admin_updated, "password reset");
        Ok(())
    }

    pub fn users(&self) -> Vec<UserProfile> {
        self.users.all().into_iter().map(|u| u.profile).collect()
    }

    pub fn admins(&self) -> Vec<AdminProfile> {
        self.admins.all().into_iter().map(|a| a.profile).collect()
    }

    pub fn registrations(&self) -> Vec<RegistrationRecord> {
        self.registrations.all()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{MemoryStorage, Storage};

    fn book() -> (Arc<MemoryStorage>, AccountBook) {
        let storage = Arc::new(MemoryStorage::new());
        let book = AccountBook::new(KeyedRecordStore::new(storage.clone()));
        (storage, book)
    }

    fn user_form(email: &str, id_number: &str) -> UserRegistrationForm {
        UserRegistrationForm {
            first_name: "Amina".into(),
            middle_name: Some("".into()),
            last_name: "Otieno".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1998, 4, 2).unwrap(),
            phone_number: "0712345678".into(),
            email: email.into(),
            gender: Gender::Female,
            id_number: id_number.into(),
            marital_status: MaritalStatus::Single,
            form_four_number: "F4-001".into(),
            password: "s3cret!".into(),
            confirm_password: "s3cret!".into(),
            passport_photo: Some(Attachment::inline("me.png", "image/png", &[0x89, 0x50])),
            birth_certificate: Some(Attachment::linked("blob:b", "birth.pdf", "application/pdf", 9)),
            education_certificate: Some(Attachment::linked(
                "blob:e",
                "kcse.pdf",
                "application/pdf",
                9,
            )),
        }
    }

    fn admin_form(email: &str) -> AdminRegistrationForm {
        AdminRegistrationForm {
            first_name: "Juma".into(),
            middle_name: None,
            last_name: "Mwangi".into(),
            gender: Some(Gender::Male),
            marital_status: None,
            phone_number: "0700000000".into(),
            email: email.into(),
            password: "adminpw".into(),
            confirm_password: "adminpw".into(),
        }
    }

    #[test]
    fn register_user_never_stores_the_password() {
        let (storage, book) = book();
        let profile = book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        assert_eq!(profile.middle_name, None);
        assert_eq!(profile.documents.birth_certificate.as_deref(), Some("birth.pdf"));

        let raw = storage.get(USERS_SLOT).unwrap().unwrap();
        assert!(!raw.contains("s3cret!"));
        assert!(raw.contains("$argon2id$"));
    }

    #[test]
    fn register_user_appends_registration_projection() {
        let (_, book) = book();
        let profile = book
            .register_user(&user_form("a@x.com", "1"), Some(RecordId(31)))
            .unwrap();
        assert_eq!(profile.id, RecordId(31));

        let regs = book.registrations();
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].user_id, RecordId(31));
        assert_eq!(regs[0].email, "a@x.com");
    }

    #[test]
    fn duplicate_email_or_id_number_is_rejected() {
        let (_, book) = book();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        assert!(matches!(
            book.register_user(&user_form("A@X.com", "2"), None),
            Err(StoreError::DuplicateEmail(_))
        ));
        assert!(matches!(
            book.register_user(&user_form("b@x.com", "1"), None),
            Err(StoreError::DuplicateIdNumber(_))
        ));
        assert_eq!(book.users().len(), 1);
        assert_eq!(book.registrations().len(), 1);
    }

    #[test]
    fn id_number_check_ignores_surrounding_whitespace() {
        let (_, book) = book();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        assert!(matches!(
            book.check_available(&user_form("b@x.com", " 1 ")),
            Err(StoreError::DuplicateIdNumber(n)) if n == "1"
        ));
        assert!(book.check_available(&user_form("b@x.com", "2")).is_ok());
    }

    #[test]
    fn max_id_in_slot_is_an_error_not_a_panic() {
        let (storage, book) = book();
        storage
            .set(USERS_SLOT, &format!(r#"[{{"id":{},"legacy":true}}]"#, u64::MAX))
            .unwrap();

        assert!(matches!(
            book.register_user(&user_form("a@x.com", "1"), None),
            Err(StoreError::IdSpaceExhausted(_))
        ));
    }

    fn remote_profile(email: &str) -> UserProfile {
        UserProfile {
            id: RecordId(77),
            first_name: "Amina".into(),
            middle_name: None,
            last_name: "Otieno".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1998, 4, 2).unwrap(),
            phone_number: "0799999999".into(),
            email: email.into(),
            gender: Gender::Female,
            id_number: "1".into(),
            marital_status: MaritalStatus::Married,
            form_four_number: "F4-001".into(),
            registration_date: Utc::now(),
            documents: UserDocuments::default(),
        }
    }

    #[test]
    fn remote_login_creates_missing_local_account() {
        let (_, book) = book();
        let profile = book
            .adopt_remote_login("a@x.com", "s3cret!", Some(remote_profile("a@x.com")))
            .unwrap();
        assert_eq!(profile.id, RecordId(77));
        assert!(book.authenticate_user("a@x.com", "s3cret!").is_ok());
        // Signing in is not a registration.
        assert!(book.registrations().is_empty());
    }

    #[test]
    fn remote_login_refreshes_existing_account() {
        let (_, book) = book();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        let profile = book
            .adopt_remote_login("A@x.com", "changed!", Some(remote_profile("a@x.com")))
            .unwrap();
        assert_eq!(profile.phone_number, "0799999999");
        assert_eq!(profile.documents.birth_certificate.as_deref(), Some("birth.pdf"));
        assert!(book.authenticate_user("a@x.com", "changed!").is_ok());
        assert_eq!(book.users().len(), 1);

        let kept = book.adopt_remote_login("a@x.com", "again!!", None).unwrap();
        assert_eq!(kept.id, RecordId(77));
    }

    #[test]
    fn remote_login_without_profile_or_local_account() {
        let (_, book) = book();
        assert!(matches!(
            book.adopt_remote_login("a@x.com", "s3cret!", None),
            Err(StoreError::AccountNotFound(_))
        ));
    }

    #[test]
    fn password_reset_keeps_foreign_user_entries() {
        let (storage, book) = book();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&storage.get(USERS_SLOT).unwrap().unwrap()).unwrap();
        raw.as_array_mut().unwrap().insert(
            0,
            serde_json::json!({"id": 5, "email": "old@x.com", "password": "123456"}),
        );
        storage.set(USERS_SLOT, &raw.to_string()).unwrap();

        book.reset_password("a@x.com", "newpass1", "newpass1").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&storage.get(USERS_SLOT).unwrap().unwrap()).unwrap();
        let raw = raw.as_array().unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["email"], "old@x.com");
        assert_eq!(raw[0]["password"], "123456");
        assert!(book.authenticate_user("a@x.com", "newpass1").is_ok());
    }

    #[test]
    fn registration_form_rules() {
        let (_, book) = book();

        let mut mismatch = user_form("a@x.com", "1");
        mismatch.confirm_password = "other!!".into();
        assert!(matches!(
            book.register_user(&mismatch, None),
            Err(StoreError::Validation(ValidationError::PasswordMismatch))
        ));

        let mut weak = user_form("a@x.com", "1");
        weak.password = "abc".into();
        weak.confirm_password = "abc".into();
        assert!(matches!(
            book.register_user(&weak, None),
            Err(StoreError::Validation(ValidationError::WeakPassword { .. }))
        ));

        let mut no_photo = user_form("a@x.com", "1");
        no_photo.passport_photo = None;
        assert!(matches!(
            book.register_user(&no_photo, None),
            Err(StoreError::Validation(ValidationError::MissingDocument(
                DocumentKind::PassportPhoto
            )))
        ));

        assert!(book.users().is_empty());
    }

    #[test]
    fn user_login() {
        let (_, book) = book();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        let profile = book.authenticate_user("a@x.com", "s3cret!").unwrap();
        assert_eq!(profile.full_name(), "Amina Otieno");

        assert!(matches!(
            book.authenticate_user("a@x.com", "wrong!!"),
            Err(StoreError::InvalidCredentials)
        ));
        assert!(matches!(
            book.authenticate_user("nobody@x.com", "s3cret!"),
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn admin_login_and_user_redirect() {
        let (_, book) = book();
        book.register_admin(&admin_form("boss@x.com")).unwrap();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();

        assert_eq!(
            book.authenticate_admin("boss@x.com", "adminpw").unwrap().email,
            "boss@x.com"
        );
        assert!(matches!(
            book.authenticate_admin("a@x.com", "s3cret!"),
            Err(StoreError::NotAnAdmin)
        ));
        assert!(matches!(
            book.authenticate_admin("boss@x.com", "nope!!"),
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn duplicate_admin_email_is_rejected() {
        let (_, book) = book();
        book.register_admin(&admin_form("boss@x.com")).unwrap();
        assert!(matches!(
            book.register_admin(&admin_form("boss@x.com")),
            Err(StoreError::DuplicateEmail(_))
        ));
    }

    #[test]
    fn reset_password_applies_to_users_and_admins() {
        let (_, book) = book();
        book.register_user(&user_form("a@x.com", "1"), None).unwrap();
        book.register_admin(&admin_form("boss@x.com")).unwrap();

        book.reset_password("a@x.com", "newpass1", "newpass1").unwrap();
        assert!(book.authenticate_user("a@x.com", "newpass1").is_ok());
        assert!(book.authenticate_user("a@x.com", "s3cret!").is_err());

        book.reset_password("boss@x.com", "newpass2", "newpass2").unwrap();
        assert!(book.authenticate_admin("boss@x.com", "newpass2").is_ok());

        assert!(matches!(
            book.reset_password("ghost@x.com", "newpass3", "newpass3"),
            Err(StoreError::AccountNotFound(_))
        ));
        assert!(matches!(
            book.reset_password("a@x.com", "short", "short"),
            Err(StoreError::Validation(ValidationError::WeakPassword { .. }))
        ));
    }

    #[test]
    fn legacy_plaintext_records_are_not_loaded() {
        let (storage, book) = book();
        storage
            .set(
                ADMIN_USERS_SLOT,
                r#"[{"firstName":"Old","lastName":"Admin","email":"old@x.com","password":"123456","registrationDate":"2024-01-01"}]"#,
            )
            .unwrap();

        assert!(book.admins().is_empty());
        assert!(matches!(
            book.authenticate_admin("old@x.com", "123456"),
            Err(StoreError::InvalidCredentials)
        ));
    }
}
