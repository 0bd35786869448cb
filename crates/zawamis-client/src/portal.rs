//! The [`Portal`] ties storage, the REST backend and configuration together
//! and exposes what the screens do.
//!
//! With a backend configured, registering, logging in and applying go to the
//! backend first and only touch local storage once it has accepted. The
//! backend decides who may log in; local storage just mirrors the accounts
//! it vouches for. An offline portal uses local storage alone.

use std::sync::Arc;

use zawamis_shared::{ApplicationStatus, Attachment, RecordId};
use zawamis_store::{
    AccountBook, AdminProfile, AdminRegistrationForm, ApplicationLedger, ApplicationRecord,
    JobViewTracker, KeyedRecordStore, MessageRecord, MessageThread, NewApplication,
    RegistrationLedger, SessionStore, SqliteStorage, Storage, UserProfile,
    UserRegistrationForm,
};

use crate::api::{ApiClient, ApiResponse, RemoteUser};
use crate::config::PortalConfig;
use crate::console::{AdminConsole, ConsoleSnapshot, Dashboard, DashboardSnapshot, Inbox};
use crate::error::{PortalError, Result};
use crate::refresh::{ChangeFeed, PollingFeed, Subscription};

#[derive(Clone)]
pub struct Portal {
    api: Option<ApiClient>,
    accounts: AccountBook,
    sessions: SessionStore,
    thread: MessageThread,
    registrations: RegistrationLedger,
    applications: ApplicationLedger,
    job_views: JobViewTracker,
    feed: PollingFeed,
}

impl Portal {
    /// Open the SQLite store named by the configuration and connect to the
    /// backend.
    pub fn open(config: &PortalConfig) -> Result<Self> {
        let storage = match &config.data_path {
            Some(path) => SqliteStorage::open_at(path)?,
            None => SqliteStorage::new()?,
        };
        Self::new(Arc::new(storage), config)
    }

    pub fn new(storage: Arc<dyn Storage>, config: &PortalConfig) -> Result<Self> {
        let api = ApiClient::new(config)?;
        Ok(Self::build(storage, config, Some(api)))
    }

    pub fn offline(storage: Arc<dyn Storage>, config: &PortalConfig) -> Self {
        Self::build(storage, config, None)
    }

    fn build(storage: Arc<dyn Storage>, config: &PortalConfig, api: Option<ApiClient>) -> Self {
        let records = KeyedRecordStore::new(storage.clone());
        Self {
            api,
            accounts: AccountBook::new(records.clone()),
            sessions: SessionStore::new(storage),
            thread: MessageThread::new(records.clone())
                .with_attachment_limit(config.max_attachment_bytes),
            registrations: RegistrationLedger::registrations(records.clone()),
            applications: ApplicationLedger::new(records.clone()),
            job_views: JobViewTracker::new(records),
            feed: PollingFeed::new(config.poll_interval),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.api.is_none()
    }

    // -- User accounts --

    /// Register and sign in.
    pub async fn register(&self, form: &UserRegistrationForm) -> Result<UserProfile> {
        form.validate()?;
        self.accounts.check_available(form)?;

        let assigned_id = match &self.api {
            Some(api) => api
                .register(form)
                .await?
                .user
                .and_then(|user| user.record_id()),
            None => None,
        };

        let profile = self.accounts.register_user(form, assigned_id)?;
        self.sessions.begin_user(&profile, None)?;
        Ok(profile)
    }

    /// Sign in.
    ///
    /// With a backend, its answer is final: an account it accepts is created
    /// or refreshed locally. Offline, the local account book decides.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let Some(api) = &self.api else {
            let profile = self.accounts.authenticate_user(email, password)?;
            self.sessions.begin_user(&profile, None)?;
            return Ok(profile);
        };

        let response = api.login(email, password).await?;
        self.complete_remote_login(email, password, response)
    }

    fn complete_remote_login(
        &self,
        email: &str,
        password: &str,
        response: ApiResponse,
    ) -> Result<UserProfile> {
        let remote = response.user.as_ref().and_then(RemoteUser::to_profile);
        if remote.is_none() {
            tracing::debug!(email, "backend login carried no usable profile");
        }

        let profile = self.accounts.adopt_remote_login(email, password, remote)?;
        self.sessions.begin_user(&profile, response.token)?;
        Ok(profile)
    }

    pub fn logout(&self) -> Result<()> {
        Ok(self.sessions.end_user()?)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.sessions.current_user()
    }

    pub fn reset_password(&self, email: &str, new_password: &str, confirm: &str) -> Result<()> {
        Ok(self.accounts.reset_password(email, new_password, confirm)?)
    }

    // -- Admin accounts --

    pub fn register_admin(&self, form: &AdminRegistrationForm) -> Result<AdminProfile> {
        Ok(self.accounts.register_admin(form)?)
    }

    pub fn admin_login(&self, email: &str, password: &str) -> Result<AdminProfile> {
        let profile = self.accounts.authenticate_admin(email, password)?;
        self.sessions.begin_admin(&profile)?;
        Ok(profile)
    }

    pub fn admin_logout(&self) -> Result<()> {
        Ok(self.sessions.end_admin()?)
    }

    pub fn current_admin(&self) -> Option<AdminProfile> {
        self.sessions.current_admin()
    }

    // -- Jobs --

    pub async fn apply_for_job(
        &self,
        job_title: &str,
        cv: Attachment,
        cover_letter: Attachment,
    ) -> Result<ApplicationRecord> {
        let user = self.signed_in_user()?;
        let application = NewApplication {
            user_id: user.id,
            user_name: user.full_name(),
            user_email: user.email.clone(),
            job_title: job_title.trim().to_string(),
            cv: Some(cv),
            cover_letter: Some(cover_letter),
        };
        application.validate()?;

        if let (Some(api), Some(cv), Some(letter)) =
            (&self.api, &application.cv, &application.cover_letter)
        {
            api.apply_job(user.id, &application.job_title, cv, letter)
                .await?;
        }

        Ok(self.applications.submit(application)?)
    }

    pub fn my_applications(&self) -> Result<Vec<ApplicationRecord>> {
        let user = self.signed_in_user()?;
        Ok(self.applications.for_user(&user.email))
    }

    /// Count a job listing view. Returns `false` if this session already
    /// viewed the job.
    pub fn view_job(&self, job_title: &str, session_id: &str) -> Result<bool> {
        let viewer = self.sessions.user_email();
        Ok(self
            .job_views
            .track(job_title, session_id, viewer.as_deref())?)
    }

    pub fn set_application_status(&self, id: RecordId, status: ApplicationStatus) -> Result<bool> {
        self.signed_in_admin()?;
        Ok(self.applications.set_status(id, status)?)
    }

    // -- Support messages --

    pub fn send_message(&self, body: &str, attachment: Option<Attachment>) -> Result<MessageRecord> {
        let user = self.signed_in_user()?;
        Ok(self
            .thread
            .post(&user.email, &user.full_name(), body, attachment)?)
    }

    pub fn delete_message_for_me(&self, id: RecordId) -> Result<bool> {
        let user = self.signed_in_user()?;
        Ok(self.thread.delete_for_me(id, &user.email)?)
    }

    /// Tombstone a message. Admins may do this to any message, users only to
    /// their own.
    pub fn delete_message_for_everyone(&self, id: RecordId) -> Result<bool> {
        if self.sessions.is_admin_authenticated() {
            return Ok(self.thread.delete_for_everyone(id)?);
        }

        let user = self.signed_in_user()?;
        match self.thread.get(id) {
            Some(message) if message.user_email == user.email => {
                Ok(self.thread.delete_for_everyone(id)?)
            }
            _ => Ok(false),
        }
    }

    pub fn reply_to_message(&self, id: RecordId, text: &str) -> Result<bool> {
        self.signed_in_admin()?;
        Ok(self.thread.reply(id, text)?)
    }

    pub fn hide_message_from_admin(&self, id: RecordId) -> Result<bool> {
        self.signed_in_admin()?;
        Ok(self.thread.delete_for_admin(id)?)
    }

    // -- Views --

    pub fn admin_console(&self) -> AdminConsole {
        AdminConsole::new(
            self.registrations.clone(),
            self.applications.clone(),
            self.thread.clone(),
            self.job_views.clone(),
        )
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.sessions.clone(), self.applications.clone())
    }

    pub fn inbox(&self) -> Result<Inbox> {
        let user = self.signed_in_user()?;
        Ok(Inbox::new(self.thread.clone(), user.email))
    }

    pub fn watch_console(&self) -> Subscription<ConsoleSnapshot> {
        self.feed.subscribe(self.admin_console())
    }

    pub fn watch_dashboard(&self) -> Subscription<DashboardSnapshot> {
        self.feed.subscribe(self.dashboard())
    }

    pub fn watch_inbox(&self) -> Result<Subscription<Vec<MessageRecord>>> {
        Ok(self.feed.subscribe(self.inbox()?))
    }

    pub fn thread(&self) -> &MessageThread {
        &self.thread
    }

    pub fn applications(&self) -> &ApplicationLedger {
        &self.applications
    }

    pub fn registrations(&self) -> &RegistrationLedger {
        &self.registrations
    }

    fn signed_in_user(&self) -> Result<UserProfile> {
        self.sessions.current_user().ok_or(PortalError::NotSignedIn)
    }

    fn signed_in_admin(&self) -> Result<AdminProfile> {
        self.sessions.current_admin().ok_or(PortalError::NotSignedIn)
    }
}
