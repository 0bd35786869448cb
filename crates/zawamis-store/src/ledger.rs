//! Append-only ledgers read by the admin console.

use std::marker::PhantomData;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use zawamis_shared::constants::{JOB_APPLICATIONS_SLOT, REGISTRATIONS_SLOT};
use zawamis_shared::validation::{require_field, validate_document};
use zawamis_shared::{ApplicationStatus, Attachment, DocumentKind, RecordId, ValidationError};

use crate::error::Result;
use crate::models::{ApplicationRecord, DocumentSubmission, RegistrationRecord};
use crate::projection::{project_applications, Viewer};
use crate::records::KeyedRecordStore;

/// Ordered, append-only sequence of `T` persisted under one slot.
pub struct Ledger<T> {
    records: KeyedRecordStore,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Ledger<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Ledger<T> {
    pub fn new(records: KeyedRecordStore, key: &'static str) -> Self {
        Self {
            records,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn append(&self, record: &T) -> Result<()> {
        self.records.append_as(self.key, record)?;
        tracing::debug!(slot = self.key, "ledger entry appended");
        Ok(())
    }

    /// Largest id in the slot, counting entries this build cannot decode.
    pub fn max_id(&self) -> Option<RecordId> {
        self.records.max_id(self.key)
    }

    pub fn all(&self) -> Vec<T> {
        self.records.read_as(self.key)
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn update<F>(&self, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<T>) -> bool,
    {
        self.records.update_as(self.key, mutate)
    }
}

pub type RegistrationLedger = Ledger<RegistrationRecord>;

impl Ledger<RegistrationRecord> {
    pub fn registrations(records: KeyedRecordStore) -> Self {
        Self::new(records, REGISTRATIONS_SLOT)
    }
}

/// What a user submits when applying for a job.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: RecordId,
    pub user_name: String,
    pub user_email: String,
    pub job_title: String,
    pub cv: Option<Attachment>,
    pub cover_letter: Option<Attachment>,
}

impl NewApplication {
    pub fn validate(&self) -> Result<()> {
        require_field(&self.job_title, "job title")?;
        require_field(&self.user_email, "user email")?;
        validate_document(DocumentKind::Cv, self.cv.as_ref().map(|a| a.mime_type.as_str()))?;
        validate_document(
            DocumentKind::CoverLetter,
            self.cover_letter.as_ref().map(|a| a.mime_type.as_str()),
        )?;
        Ok(())
    }
}

/// The single job-application ledger.
///
/// The web client wrote every submission twice (`jobApplications` and a
/// near-identical `userApplications`). Here there is one canonical slot and
/// the "documents" list is a projection of it.
#[derive(Clone)]
pub struct ApplicationLedger {
    ledger: Ledger<ApplicationRecord>,
}

impl ApplicationLedger {
    pub fn new(records: KeyedRecordStore) -> Self {
        Self {
            ledger: Ledger::new(records, JOB_APPLICATIONS_SLOT),
        }
    }

    pub fn submit(&self, application: NewApplication) -> Result<ApplicationRecord> {
        application.validate()?;

        let floor = self.ledger.max_id();
        let cv = application
            .cv
            .ok_or(ValidationError::MissingDocument(DocumentKind::Cv))?;
        let cover_letter = application
            .cover_letter
            .ok_or(ValidationError::MissingDocument(DocumentKind::CoverLetter))?;

        let record = ApplicationRecord {
            id: RecordId::next_after(floor)?,
            user_id: application.user_id,
            user_name: application.user_name,
            user_email: application.user_email,
            job_title: application.job_title,
            cv_file: cv.reference,
            cv_file_name: cv.file_name,
            cover_letter_file: cover_letter.reference,
            cover_letter_file_name: cover_letter.file_name,
            status: ApplicationStatus::Pending,
            application_date: Utc::now(),
        };
        self.append(&record)?;

        tracing::info!(
            application_id = %record.id,
            job = %record.job_title,
            user = %record.user_email,
            "job application recorded"
        );
        Ok(record)
    }

    pub fn append(&self, record: &ApplicationRecord) -> Result<()> {
        self.ledger.append(record)
    }

    pub fn all(&self) -> Vec<ApplicationRecord> {
        self.ledger.all()
    }

    /// Full application records, as the admin's "applications" tab shows them.
    pub fn applications(&self) -> Vec<ApplicationRecord> {
        project_applications(self.all(), &Viewer::Admin)
    }

    /// Submitted files per application, as the admin's "documents" tab shows them.
    pub fn documents(&self) -> Vec<DocumentSubmission> {
        self.applications()
            .iter()
            .map(DocumentSubmission::from)
            .collect()
    }

    /// A user's own applications, newest first.
    pub fn for_user(&self, email: &str) -> Vec<ApplicationRecord> {
        project_applications(self.all(), &Viewer::user(email))
    }

    pub fn set_status(&self, id: RecordId, status: ApplicationStatus) -> Result<bool> {
        let changed = self.ledger.update(|apps| {
            match apps.iter_mut().find(|a| a.id == id) {
                Some(app) if app.status != status => {
                    app.status = status;
                    true
                }
                _ => false,
            }
        })?;

        if changed {
            tracing::info!(application_id = %id, ?status, "application status updated");
        }
        Ok(changed)
    }
}
