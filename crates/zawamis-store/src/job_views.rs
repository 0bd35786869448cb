//! Job listing view counter.

use std::collections::BTreeMap;

use chrono::Utc;

use zawamis_shared::constants::{GUEST_VIEWER, JOB_VIEWS_SLOT};

use crate::error::Result;
use crate::models::JobViewRecord;
use crate::records::KeyedRecordStore;

#[derive(Clone)]
pub struct JobViewTracker {
    records: KeyedRecordStore,
}

impl JobViewTracker {
    pub fn new(records: KeyedRecordStore) -> Self {
        Self { records }
    }

    /// Record that `job_title` was opened in `session_id`.
    ///
    /// A job counts once per session; repeat views return `false` and write
    /// nothing.
    pub fn track(&self, job_title: &str, session_id: &str, viewer: Option<&str>) -> Result<bool> {
        let views: Vec<JobViewRecord> = self.records.read_as(JOB_VIEWS_SLOT);
        if views
            .iter()
            .any(|v| v.job_title == job_title && v.session_id == session_id)
        {
            return Ok(false);
        }

        let view = JobViewRecord {
            job_title: job_title.to_string(),
            view_date: Utc::now(),
            session_id: session_id.to_string(),
            user: viewer.unwrap_or(GUEST_VIEWER).to_string(),
        };
        self.records.append_as(JOB_VIEWS_SLOT, &view)?;

        tracing::debug!(job = job_title, session = session_id, "job view recorded");
        Ok(true)
    }

    pub fn all(&self) -> Vec<JobViewRecord> {
        self.records.read_as(JOB_VIEWS_SLOT)
    }

    /// Distinct-session view count per job title.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for view in self.all() {
            *counts.entry(view.job_title).or_insert(0) += 1;
        }
        counts
    }
}
