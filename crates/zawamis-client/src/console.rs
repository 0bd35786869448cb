//! Snapshot sources behind the portal's screens.

use std::collections::BTreeMap;

use zawamis_store::{
    ApplicationLedger, ApplicationRecord, DocumentSubmission, JobViewTracker, MessageRecord,
    MessageThread, RegistrationLedger, RegistrationRecord, SessionStore, UserProfile, Viewer,
};

use crate::refresh::SnapshotSource;

/// Everything the admin management screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleSnapshot {
    pub registrations: Vec<RegistrationRecord>,
    pub applications: Vec<ApplicationRecord>,
    pub documents: Vec<DocumentSubmission>,
    pub messages: Vec<MessageRecord>,
    pub job_views: BTreeMap<String, usize>,
}

#[derive(Clone)]
pub struct AdminConsole {
    registrations: RegistrationLedger,
    applications: ApplicationLedger,
    thread: MessageThread,
    job_views: JobViewTracker,
}

impl AdminConsole {
    pub fn new(
        registrations: RegistrationLedger,
        applications: ApplicationLedger,
        thread: MessageThread,
        job_views: JobViewTracker,
    ) -> Self {
        Self {
            registrations,
            applications,
            thread,
            job_views,
        }
    }
}

impl SnapshotSource for AdminConsole {
    type Snapshot = ConsoleSnapshot;

    fn load(&self) -> ConsoleSnapshot {
        let applications = self.applications.applications();
        let documents = applications.iter().map(DocumentSubmission::from).collect();

        ConsoleSnapshot {
            registrations: self.registrations.all(),
            applications,
            documents,
            messages: self.thread.project_for(&Viewer::Admin),
            job_views: self.job_views.counts(),
        }
    }
}

/// A user's view of their own support messages, newest first.
#[derive(Clone)]
pub struct Inbox {
    thread: MessageThread,
    viewer: Viewer,
}

impl Inbox {
    pub fn new(thread: MessageThread, owner_email: impl Into<String>) -> Self {
        Self {
            thread,
            viewer: Viewer::user(owner_email),
        }
    }
}

impl SnapshotSource for Inbox {
    type Snapshot = Vec<MessageRecord>;

    fn load(&self) -> Vec<MessageRecord> {
        self.thread.project_for(&self.viewer)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub user: Option<UserProfile>,
    pub applications: Vec<ApplicationRecord>,
}

/// The signed-in user's dashboard. Follows whoever is signed in at load time.
#[derive(Clone)]
pub struct Dashboard {
    sessions: SessionStore,
    applications: ApplicationLedger,
}

impl Dashboard {
    pub fn new(sessions: SessionStore, applications: ApplicationLedger) -> Self {
        Self {
            sessions,
            applications,
        }
    }
}

impl SnapshotSource for Dashboard {
    type Snapshot = DashboardSnapshot;

    fn load(&self) -> DashboardSnapshot {
        let Some(user) = self.sessions.current_user() else {
            return DashboardSnapshot::default();
        };
        let applications = self.applications.for_user(&user.email);
        DashboardSnapshot {
            user: Some(user),
            applications,
        }
    }
}
