//! Thin client for the portal's REST backend.
//!
//! Only three endpoints exist: login (JSON), registration and job
//! application (both multipart). Every response has the same envelope,
//! `{success, message, user?, token?, errors?}`.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use zawamis_shared::{Attachment, DocumentKind, RecordId};
use zawamis_store::{UserDocuments, UserProfile, UserRegistrationForm};

use crate::config::PortalConfig;
use crate::error::ApiError;

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<RemoteUser>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// The backend's user object (snake_case, as its serializer writes it).
///
/// Every field is optional and kept as the raw string so one odd value does
/// not make the whole envelope unreadable; [`RemoteUser::to_profile`] does
/// the strict parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteUser {
    pub id: Option<u64>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub id_number: Option<String>,
    pub marital_status: Option<String>,
    pub form_four_number: Option<String>,
    pub registration_date: Option<String>,
}

impl RemoteUser {
    pub fn record_id(&self) -> Option<RecordId> {
        self.id.map(RecordId)
    }

    /// The local profile this user maps to, or `None` when a required field
    /// is missing or unreadable.
    pub fn to_profile(&self) -> Option<UserProfile> {
        let text = |field: &Option<String>| {
            field.as_deref().map(str::trim).unwrap_or_default().to_string()
        };
        let required = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let registration_date = self
            .registration_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(UserProfile {
            id: self.record_id()?,
            first_name: required(&self.first_name)?,
            middle_name: required(&self.middle_name),
            last_name: required(&self.last_name)?,
            date_of_birth: NaiveDate::parse_from_str(self.date_of_birth.as_deref()?, "%Y-%m-%d")
                .ok()?,
            phone_number: text(&self.phone_number),
            email: required(&self.email)?,
            gender: choice(self.gender.as_deref()?)?,
            id_number: required(&self.id_number)?,
            marital_status: choice(self.marital_status.as_deref()?)?,
            form_four_number: text(&self.form_four_number),
            registration_date,
            documents: UserDocuments::default(),
        })
    }
}

/// Parse a backend choice value such as `female` into its enum.
fn choice<T: DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(Value::String(value.trim().to_ascii_lowercase())).ok()
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &PortalConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse, ApiError> {
        let request = self
            .client
            .post(self.endpoint("login"))
            .json(&LoginRequest { email, password });
        self.send(request, "login").await
    }

    pub async fn register(&self, form: &UserRegistrationForm) -> Result<ApiResponse, ApiError> {
        let mut multipart = Form::new()
            .text("first_name", form.first_name.clone())
            .text("middle_name", form.middle_name.clone().unwrap_or_default())
            .text("last_name", form.last_name.clone())
            .text("date_of_birth", form.date_of_birth.to_string())
            .text("phone_number", form.phone_number.clone())
            .text("email", form.email.clone())
            .text("gender", wire_value(&form.gender))
            .text("id_number", form.id_number.clone())
            .text("marital_status", wire_value(&form.marital_status))
            .text("form_four_number", form.form_four_number.clone())
            .text("password", form.password.clone())
            .text("confirm_password", form.confirm_password.clone());

        for (kind, doc) in form.documents() {
            if let Some(doc) = doc {
                multipart = multipart.part(kind.form_field(), file_part(doc)?);
            }
        }

        let request = self
            .client
            .post(self.endpoint("register"))
            .multipart(multipart);
        self.send(request, "register").await
    }

    pub async fn apply_job(
        &self,
        user_id: RecordId,
        job_title: &str,
        cv: &Attachment,
        cover_letter: &Attachment,
    ) -> Result<ApiResponse, ApiError> {
        let multipart = Form::new()
            .text("user_id", user_id.to_string())
            .text("job_title", job_title.to_string())
            .part(DocumentKind::Cv.form_field(), file_part(cv)?)
            .part(DocumentKind::CoverLetter.form_field(), file_part(cover_letter)?);

        let request = self
            .client
            .post(self.endpoint("apply-job"))
            .multipart(multipart);
        self.send(request, "apply-job").await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &'static str,
    ) -> Result<ApiResponse, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        let body: ApiResponse = response.json().await.map_err(|e| {
            tracing::warn!(endpoint, %status, error = %e, "unreadable response body");
            ApiError::Network(e)
        })?;

        tracing::debug!(endpoint, %status, success = body.success, "backend responded");
        interpret(status, body)
    }
}

/// Accept a response only when both the HTTP status and the envelope say
/// it succeeded.
fn interpret(status: StatusCode, body: ApiResponse) -> Result<ApiResponse, ApiError> {
    if status.is_success() && body.success {
        return Ok(body);
    }

    let message = if body.message.trim().is_empty() {
        format!("Request failed ({status})")
    } else {
        body.message.clone()
    };
    Err(ApiError::Rejected {
        message,
        errors: body.errors.as_ref().map(flatten_errors).unwrap_or_default(),
    })
}

/// Flatten `{"field": ["reason", ...]}` into `field: reason` lines.
fn flatten_errors(errors: &Value) -> Vec<String> {
    match errors {
        Value::Object(fields) => fields
            .iter()
            .flat_map(|(field, reasons)| match reasons {
                Value::Array(list) => list
                    .iter()
                    .map(|r| format!("{field}: {}", text_of(r)))
                    .collect::<Vec<_>>(),
                other => vec![format!("{field}: {}", text_of(other))],
            })
            .collect(),
        Value::Array(list) => list.iter().map(text_of).collect(),
        Value::Null => Vec::new(),
        other => vec![text_of(other)],
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Serialized form of a unit enum, e.g. `Gender::Female` -> `female`.
fn wire_value<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        _ => String::new(),
    }
}

fn file_part(attachment: &Attachment) -> Result<Part, ApiError> {
    let upload_error = |reason: String| ApiError::Upload {
        file_name: attachment.file_name.clone(),
        reason,
    };

    let bytes = attachment
        .inline_bytes()
        .ok_or_else(|| upload_error("file content is not available".to_string()))?;

    Part::bytes(bytes)
        .file_name(attachment.file_name.clone())
        .mime_str(&attachment.mime_type)
        .map_err(|e| upload_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use zawamis_shared::{Gender, MaritalStatus};

    use super::*;

    fn parse(json: &str) -> ApiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn successful_login_envelope() {
        let body = parse(
            r#"{"success":true,"message":"Login successful","user":{"id":12,"email":"a@x.com","first_name":"Amina"},"token":"abc"}"#,
        );
        let body = interpret(StatusCode::OK, body).unwrap();
        assert_eq!(body.token.as_deref(), Some("abc"));
        assert_eq!(body.user.unwrap().record_id(), Some(RecordId(12)));
    }

    const LOGIN_OK: &str = r#"{
        "success": true,
        "message": "Login successful",
        "user": {
            "id": 12, "first_name": "Amina", "middle_name": "", "last_name": "Otieno",
            "date_of_birth": "1998-04-02", "phone_number": "0712345678",
            "email": "a@x.com", "gender": "female", "id_number": "1",
            "marital_status": "single", "form_four_number": "F4-001",
            "registration_date": "2025-01-02T10:00:00.123456Z", "is_active": true,
            "documents": [], "messages": [], "applications": []
        }
    }"#;

    #[test]
    fn backend_user_becomes_a_profile() {
        let user = parse(LOGIN_OK).user.unwrap();
        let profile = user.to_profile().unwrap();

        assert_eq!(profile.id, RecordId(12));
        assert_eq!(profile.middle_name, None);
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.marital_status, MaritalStatus::Single);
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1998, 4, 2).unwrap());
        assert_eq!(profile.registration_date.to_rfc3339(), "2025-01-02T10:00:00.123456+00:00");
    }

    #[test]
    fn incomplete_backend_user_has_no_profile() {
        let body = parse(r#"{"success":true,"user":{"id":12,"email":"a@x.com","gender":"robot"}}"#);
        let user = body.user.unwrap();
        assert_eq!(user.record_id(), Some(RecordId(12)));
        assert!(user.to_profile().is_none());
    }

    #[test]
    fn rejection_carries_message_and_field_errors() {
        let body = parse(
            r#"{"success":false,"message":"Validation failed","errors":{"email":["Enter a valid email address."],"id_number":["Required."]}}"#,
        );
        match interpret(StatusCode::BAD_REQUEST, body) {
            Err(ApiError::Rejected { message, errors }) => {
                assert_eq!(message, "Validation failed");
                assert_eq!(
                    errors,
                    vec![
                        "email: Enter a valid email address.".to_string(),
                        "id_number: Required.".to_string(),
                    ]
                );
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn success_flag_and_status_must_agree() {
        let ok_status_but_failed = parse(r#"{"success":false,"message":"Invalid email or password"}"#);
        assert!(matches!(
            interpret(StatusCode::OK, ok_status_but_failed),
            Err(ApiError::Rejected { .. })
        ));

        let bare_500 = parse(r#"{}"#);
        match interpret(StatusCode::INTERNAL_SERVER_ERROR, bare_500) {
            Err(ApiError::Rejected { message, errors }) => {
                assert!(message.contains("500"));
                assert!(errors.is_empty());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn enum_fields_use_backend_spelling() {
        assert_eq!(wire_value(&Gender::Female), "female");
    }

    #[test]
    fn linked_attachments_cannot_be_uploaded() {
        let linked = Attachment::linked("blob:1", "cv.pdf", "application/pdf", 10);
        assert!(matches!(file_part(&linked), Err(ApiError::Upload { .. })));

        let inline = Attachment::inline("cv.pdf", "application/pdf", b"%PDF-1.4");
        assert!(file_part(&inline).is_ok());
    }

    #[test]
    fn endpoints_keep_trailing_slash() {
        let client = ApiClient::new(&PortalConfig::default()).unwrap();
        assert_eq!(client.endpoint("apply-job"), "http://127.0.0.1:8000/api/apply-job/");
    }
}
