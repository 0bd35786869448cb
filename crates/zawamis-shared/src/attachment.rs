use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A single file attached to a message.
///
/// Field names follow the web client's flat layout (`file`, `fileName`,
/// `fileType`) so the struct can be flattened into a message record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// `data:` URL for inline content, otherwise an opaque reference.
    #[serde(rename = "file")]
    pub reference: String,
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub mime_type: String,
    #[serde(default, rename = "fileSize")]
    pub size: usize,
    /// BLAKE3 hash of the content, hex. Only known for inline attachments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Attachment {
    pub fn inline(file_name: &str, mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            reference: format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
            content_hash: Some(blake3::hash(bytes).to_hex().to_string()),
        }
    }

    pub fn linked(reference: &str, file_name: &str, mime_type: &str, size: usize) -> Self {
        Self {
            reference: reference.to_string(),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size,
            content_hash: None,
        }
    }

    /// Decode the bytes of an inline attachment. `None` for linked ones.
    pub fn inline_bytes(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.reference.strip_prefix("data:")?.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}
