//! Multipart parsing for complaint submissions.
//!
//! A submission is one multipart form with text fields (`category_id`,
//! `subject`, `description`, `priority`) and up to five `attachments`
//! file parts. Limits are enforced while the stream is read, so an
//! oversized part fails the request before it is buffered whole.

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt as _;
use serde_json::json;

use crate::domain::{AttachmentUpload, ComplaintSubmission, Error, Priority};

use super::validation::{missing_field_error, parse_i32, parse_priority};
use crate::domain::CategoryId;

/// Maximum number of file parts accepted per submission.
pub(crate) const MAX_ATTACHMENTS: usize = 5;

/// Maximum size of a single attachment.
pub(crate) const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Upper bound on text field size; far beyond any legitimate form value.
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// Accepted attachment file extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "pdf", "doc", "docx"];

/// Accepted attachment MIME types, matching [`ALLOWED_EXTENSIONS`].
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Fully parsed complaint submission form.
pub(crate) struct ComplaintForm {
    pub submission: ComplaintSubmission,
    pub uploads: Vec<AttachmentUpload>,
}

fn malformed(error: &actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart payload: {error}"))
}

fn attachment_rejected(file_name: &str, reason: &str) -> Error {
    Error::invalid_request("invalid file type; only JPEG, PNG, PDF, DOC, DOCX allowed")
        .with_details(json!({
            "field": "attachments",
            "file_name": file_name,
            "code": reason,
        }))
}

fn attachment_too_large(file_name: &str) -> Error {
    Error::invalid_request("attachment exceeds the 5 MiB limit").with_details(json!({
        "field": "attachments",
        "file_name": file_name,
        "code": "attachment_too_large",
    }))
}

/// Validate extension and MIME type against the allowlists.
fn check_attachment_type(file_name: &str, content_type: &str) -> Result<(), Error> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| attachment_rejected(file_name, "missing_extension"))?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(attachment_rejected(file_name, "extension_not_allowed"));
    }
    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(attachment_rejected(file_name, "mime_type_not_allowed"));
    }
    Ok(())
}

/// Drain a field into memory, failing once `limit` is exceeded.
async fn read_field_bytes(
    field: &mut Field,
    limit: usize,
    too_large: impl Fn() -> Error,
) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|e| malformed(&e))? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text_field(field: &mut Field, name: &str) -> Result<String, Error> {
    let bytes = read_field_bytes(field, MAX_TEXT_BYTES, || {
        Error::invalid_request(format!("field {name} is too large"))
    })
    .await?;
    String::from_utf8(bytes)
        .map_err(|_| Error::invalid_request(format!("field {name} must be valid UTF-8")))
}

async fn read_attachment(field: &mut Field, file_name: String) -> Result<AttachmentUpload, Error> {
    let content_type = field
        .content_type()
        .map(ToString::to_string)
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    check_attachment_type(&file_name, &content_type)?;

    let bytes = read_field_bytes(field, MAX_ATTACHMENT_BYTES, || {
        attachment_too_large(&file_name)
    })
    .await?;
    Ok(AttachmentUpload {
        original_name: file_name,
        content_type,
        bytes,
    })
}

/// Consume the multipart stream into a validated [`ComplaintForm`].
pub(crate) async fn parse_complaint_form(mut payload: Multipart) -> Result<ComplaintForm, Error> {
    let mut category_id: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut description: Option<String> = None;
    let mut priority: Option<String> = None;
    let mut uploads: Vec<AttachmentUpload> = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(|e| malformed(&e))? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            // Nameless parts carry nothing we can route; skip them.
            let _ = read_field_bytes(&mut field, MAX_ATTACHMENT_BYTES, || {
                Error::invalid_request("unnamed part is too large")
            })
            .await?;
            continue;
        };

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(ToOwned::to_owned);

        match (name.as_str(), file_name) {
            ("attachments", Some(file_name)) => {
                if uploads.len() == MAX_ATTACHMENTS {
                    return Err(Error::invalid_request(format!(
                        "at most {MAX_ATTACHMENTS} attachments are allowed"
                    ))
                    .with_details(json!({
                        "field": "attachments",
                        "code": "too_many_attachments",
                    })));
                }
                uploads.push(read_attachment(&mut field, file_name).await?);
            }
            ("category_id", _) => category_id = Some(read_text_field(&mut field, "category_id").await?),
            ("subject", _) => subject = Some(read_text_field(&mut field, "subject").await?),
            ("description", _) => {
                description = Some(read_text_field(&mut field, "description").await?);
            }
            ("priority", _) => priority = Some(read_text_field(&mut field, "priority").await?),
            _ => {
                // Unknown fields are drained and ignored.
                let _ = read_field_bytes(&mut field, MAX_ATTACHMENT_BYTES, || {
                    Error::invalid_request(format!("field {name} is too large"))
                })
                .await?;
            }
        }
    }

    let category_raw = category_id.ok_or_else(|| missing_field_error("category_id"))?;
    let category_id = CategoryId::new(parse_i32(&category_raw, "category_id")?);
    let subject = subject.ok_or_else(|| missing_field_error("subject"))?;
    let description = description.ok_or_else(|| missing_field_error("description"))?;
    let priority = match priority.as_deref().map(str::trim) {
        None | Some("") => Priority::default(),
        Some(raw) => parse_priority(raw)?,
    };

    Ok(ComplaintForm {
        submission: ComplaintSubmission {
            category_id,
            subject,
            description,
            priority,
        },
        uploads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", "image/png")]
    #[case("photo.JPG", "image/jpeg")]
    #[case("scan.pdf", "application/pdf")]
    #[case("letter.doc", "application/msword")]
    #[case(
        "letter.docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    )]
    fn allowed_types_pass(#[case] file_name: &str, #[case] mime: &str) {
        assert!(check_attachment_type(file_name, mime).is_ok());
    }

    #[rstest]
    #[case("script.sh", "application/x-sh", "extension_not_allowed")]
    #[case("photo.png", "application/octet-stream", "mime_type_not_allowed")]
    #[case("noextension", "image/png", "missing_extension")]
    #[case("archive.zip", "application/zip", "extension_not_allowed")]
    fn disallowed_types_are_rejected(
        #[case] file_name: &str,
        #[case] mime: &str,
        #[case] code: &str,
    ) {
        let err = check_attachment_type(file_name, mime).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some(code)
        );
    }
}
