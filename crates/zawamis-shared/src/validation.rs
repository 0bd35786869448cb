//! Input rules shared by every form that writes to a ledger or thread.

use crate::attachment::Attachment;
use crate::constants::{MAX_MESSAGE_WORDS, MIME_PDF, MIN_PASSWORD_LEN, PHOTO_MIME_TYPES};
use crate::error::ValidationError;
use crate::types::DocumentKind;

/// Number of whitespace-delimited tokens in the trimmed text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn validate_message(
    body: &str,
    attachment: Option<&Attachment>,
    max_attachment_size: usize,
) -> Result<(), ValidationError> {
    let count = word_count(body);
    if count > MAX_MESSAGE_WORDS {
        return Err(ValidationError::TooManyWords {
            count,
            max: MAX_MESSAGE_WORDS,
        });
    }

    match attachment {
        None if body.trim().is_empty() => Err(ValidationError::EmptyMessage),
        Some(a) if a.size > max_attachment_size => Err(ValidationError::AttachmentTooLarge {
            size: a.size,
            max: max_attachment_size,
        }),
        _ => Ok(()),
    }
}

/// Returns the trimmed reply text.
pub fn validate_reply(text: &str) -> Result<&str, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyReply);
    }
    Ok(trimmed)
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Check that a required document was supplied with an accepted MIME type.
/// Photos must be JPEG or PNG, everything else PDF.
pub fn validate_document(
    kind: DocumentKind,
    mime_type: Option<&str>,
) -> Result<(), ValidationError> {
    let mime_type = mime_type.ok_or(ValidationError::MissingDocument(kind))?;

    let accepted = match kind {
        DocumentKind::PassportPhoto => PHOTO_MIME_TYPES.contains(&mime_type),
        DocumentKind::BirthCertificate
        | DocumentKind::EducationCertificate
        | DocumentKind::Cv
        | DocumentKind::CoverLetter => mime_type == MIME_PDF,
    };

    if accepted {
        Ok(())
    } else {
        Err(ValidationError::InvalidDocumentType {
            kind,
            mime_type: mime_type.to_string(),
        })
    }
}

pub fn require_field(value: &str, name: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_ATTACHMENT_SIZE;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn word_count_ignores_surrounding_and_repeated_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("  Need \n help\t now "), 3);
    }

    #[test]
    fn exactly_max_words_is_accepted() {
        assert!(validate_message(&words(200), None, MAX_ATTACHMENT_SIZE).is_ok());
    }

    #[test]
    fn one_word_over_is_rejected() {
        let err = validate_message(&words(201), None, MAX_ATTACHMENT_SIZE).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyWords {
                count: 201,
                max: 200
            }
        );
    }

    #[test]
    fn empty_body_needs_an_attachment() {
        assert_eq!(
            validate_message("  ", None, MAX_ATTACHMENT_SIZE),
            Err(ValidationError::EmptyMessage)
        );
        let a = Attachment::inline("a.txt", "text/plain", b"x");
        assert!(validate_message("", Some(&a), MAX_ATTACHMENT_SIZE).is_ok());
    }

    #[test]
    fn oversized_attachment_is_rejected() {
        let a = Attachment::linked("blob:1", "big.bin", "application/octet-stream", 11);
        assert_eq!(
            validate_message("hi", Some(&a), 10),
            Err(ValidationError::AttachmentTooLarge { size: 11, max: 10 })
        );
    }

    #[test]
    fn reply_is_trimmed_and_must_not_be_blank() {
        assert_eq!(validate_reply("  On it \n"), Ok("On it"));
        assert_eq!(validate_reply(" \t"), Err(ValidationError::EmptyReply));
    }

    #[test]
    fn password_rules() {
        assert_eq!(
            validate_new_password("abcdef", "abcdeg"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_new_password("abc", "abc"),
            Err(ValidationError::WeakPassword { min: 6 })
        );
        assert!(validate_new_password("abcdef", "abcdef").is_ok());
    }

    #[test]
    fn document_types() {
        assert!(validate_document(DocumentKind::PassportPhoto, Some("image/png")).is_ok());
        assert!(validate_document(DocumentKind::Cv, Some("application/pdf")).is_ok());
        assert_eq!(
            validate_document(DocumentKind::BirthCertificate, None),
            Err(ValidationError::MissingDocument(DocumentKind::BirthCertificate))
        );
        assert!(matches!(
            validate_document(DocumentKind::PassportPhoto, Some("application/pdf")),
            Err(ValidationError::InvalidDocumentType { .. })
        ));
        assert!(matches!(
            validate_document(DocumentKind::CoverLetter, Some("image/png")),
            Err(ValidationError::InvalidDocumentType { .. })
        ));
    }
}
