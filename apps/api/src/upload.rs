//! Multipart upload handling. Uploads carry at most one PDF under the
//! `file` field; every other field is treated as text.

use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub struct MultipartPayload {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartPayload {
    pub fn require_file(self) -> Result<UploadedFile, AppError> {
        self.file
            .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))
    }
}

/// Drains a multipart stream into text fields plus the optional PDF.
/// Non-PDF files are rejected outright.
pub async fn read_payload(mut multipart: Multipart) -> Result<MultipartPayload, AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(String::from);
                let content_type = field.content_type().map(String::from);
                if content_type.as_deref() != Some("application/pdf") {
                    return Err(AppError::Validation(
                        "Only PDF files are allowed".to_string(),
                    ));
                }
                let bytes = field.bytes().await.map_err(map_multipart_error)?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some(other) => {
                let key = other.to_string();
                let value = field.text().await.map_err(map_multipart_error)?;
                fields.insert(key, value);
            }
            None => continue,
        }
    }

    Ok(MultipartPayload { fields, file })
}

fn map_multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(
            "Uploaded file is too large. Max size is 10MB.".to_string(),
        )
    } else {
        AppError::Validation(format!("Invalid multipart payload: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "test-boundary";

    fn part(name: &str, filename: Option<&str>, content_type: Option<&str>, body: &str) -> String {
        let mut s = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"");
        if let Some(f) = filename {
            s.push_str(&format!("; filename=\"{f}\""));
        }
        s.push_str("\r\n");
        if let Some(ct) = content_type {
            s.push_str(&format!("Content-Type: {ct}\r\n"));
        }
        s.push_str("\r\n");
        s.push_str(body);
        s.push_str("\r\n");
        s
    }

    async fn multipart_from(body: String) -> Multipart {
        let request = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_read_payload_splits_file_and_text_fields() {
        let body = format!(
            "{}{}--{BOUNDARY}--\r\n",
            part("approvedOverview", None, None, "{\"budget\":100}"),
            part("file", Some("rfp.pdf"), Some("application/pdf"), "%PDF-1.4 data"),
        );
        let payload = read_payload(multipart_from(body).await).await.unwrap();

        assert_eq!(
            payload.fields.get("approvedOverview").map(String::as_str),
            Some("{\"budget\":100}")
        );
        let file = payload.file.unwrap();
        assert_eq!(file.file_name.as_deref(), Some("rfp.pdf"));
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(&file.bytes[..], b"%PDF-1.4 data");
    }

    #[tokio::test]
    async fn test_read_payload_rejects_non_pdf() {
        let body = format!(
            "{}--{BOUNDARY}--\r\n",
            part("file", Some("notes.txt"), Some("text/plain"), "hello"),
        );
        let err = read_payload(multipart_from(body).await).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Only PDF files are allowed"));
    }

    #[tokio::test]
    async fn test_require_file_when_absent() {
        let body = format!(
            "{}--{BOUNDARY}--\r\n",
            part("raw_text", None, None, "just text"),
        );
        let payload = read_payload(multipart_from(body).await).await.unwrap();
        let err = payload.require_file().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "No file uploaded"));
    }
}
