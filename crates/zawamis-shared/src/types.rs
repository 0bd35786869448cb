use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::IdSpaceExhausted;

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

/// Identifier shared by every record kind.
///
/// Ids look like millisecond timestamps (so ids written by the web client,
/// which used `Date.now()`, stay comparable) but are strictly increasing
/// within a process: two ids issued in the same millisecond never collide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn next() -> Result<Self, IdSpaceExhausted> {
        Self::next_after(None)
    }

    /// Issue an id that is also greater than `floor`, typically the largest
    /// id already present in the slot being appended to.
    ///
    /// Fails once `floor` or the last issued id is `u64::MAX`; nothing is
    /// issued in that case.
    pub fn next_after(floor: Option<RecordId>) -> Result<Self, IdSpaceExhausted> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let above_floor = match floor {
            Some(f) => f.0.checked_add(1).ok_or(IdSpaceExhausted)?,
            None => 0,
        };

        let mut prev = LAST_ISSUED.load(Ordering::Acquire);
        loop {
            let above_prev = prev.checked_add(1).ok_or(IdSpaceExhausted)?;
            let candidate = now.max(above_prev).max(above_floor);
            match LAST_ISSUED.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(Self(candidate)),
                Err(actual) => prev = actual,
            }
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Rejected,
    Hired,
}

/// Documents a user uploads during registration or when applying for a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    PassportPhoto,
    BirthCertificate,
    EducationCertificate,
    Cv,
    CoverLetter,
}

impl DocumentKind {
    /// Multipart field name expected by the REST backend.
    pub fn form_field(&self) -> &'static str {
        match self {
            Self::PassportPhoto => "passport_photo",
            Self::BirthCertificate => "birth_certificate",
            Self::EducationCertificate => "education_certificate",
            Self::Cv => "cv",
            Self::CoverLetter => "cover_letter",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::PassportPhoto => "passport photo",
            Self::BirthCertificate => "birth certificate",
            Self::EducationCertificate => "education certificate",
            Self::Cv => "CV",
            Self::CoverLetter => "cover letter",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_issued_back_to_back_are_distinct() {
        let a = RecordId::next().unwrap();
        let b = RecordId::next().unwrap();
        assert!(b > a);
    }

    #[test]
    fn next_after_respects_floor() {
        let far_future = RecordId(4_000_000_000_000);
        let id = RecordId::next_after(Some(far_future)).unwrap();
        assert!(id > far_future);
    }

    #[test]
    fn floor_at_the_top_of_the_range_is_an_error() {
        assert_eq!(
            RecordId::next_after(Some(RecordId(u64::MAX))),
            Err(IdSpaceExhausted)
        );
        // Nothing was consumed; normal issuing carries on.
        assert!(RecordId::next().is_ok());
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..500).map(|_| RecordId::next().unwrap()).collect::<Vec<_>>()))
            .collect();

        let mut all: Vec<RecordId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn record_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RecordId(1_700_000_000_123)).unwrap();
        assert_eq!(json, "1700000000123");
    }

    #[test]
    fn enums_use_backend_spelling() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(
            serde_json::to_string(&DocumentKind::BirthCertificate).unwrap(),
            "\"birthCertificate\""
        );
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Pending);
    }
}
