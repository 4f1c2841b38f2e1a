use crate::AppState;
use crate::api::error::AppError;
use crate::models::{ErrorResponse, UploadResponse};
use crate::utils::validation::{sanitize_filename, validate_pdf_mime_type};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use futures::TryStreamExt;
use std::io;
use tokio_util::io::StreamReader;

pub const NO_FILE_PROVIDED: &str = "No file provided";
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Only PDF files are allowed.";
pub const SAVE_FAILED: &str = "Failed to save file";

const BODY_TOO_LARGE: &str = "Request body exceeds the maximum allowed limit";

fn multipart_app_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(BODY_TOO_LARGE.to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Body limit hits inside a field surface as `ErrorKind::FileTooLarge` so the
/// storage error can be mapped back to 413 without looking at message text.
fn multipart_io_error(e: MultipartError) -> io::Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::Error::new(io::ErrorKind::FileTooLarge, e.body_text())
    } else {
        io::Error::other(e.body_text())
    }
}

fn is_body_limit_error(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::FileTooLarge)
    })
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Multipart, description = "PDF statement in form field `file`"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file provided or not a PDF", body = ErrorResponse),
        (status = 413, description = "Body exceeds the configured limit", body = ErrorResponse),
        (status = 500, description = "File could not be written", body = ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result: Result<Json<UploadResponse>, AppError> = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(multipart_app_error)?
        {
            if field.name() != Some("file") {
                continue;
            }

            let content_type = field.content_type().map(|s| s.to_string());
            if let Err(e) = validate_pdf_mime_type(content_type.as_deref()) {
                tracing::warn!("Rejected upload: {}", e);
                return Err(AppError::BadRequest(INVALID_FILE_TYPE.to_string()));
            }

            let filename = sanitize_filename(field.file_name().unwrap_or_default());

            let body_with_io_error = field.map_err(multipart_io_error);
            let reader = StreamReader::new(body_with_io_error);

            let stored = state
                .storage
                .save_stream(&filename, Box::new(reader))
                .await
                .map_err(|e| {
                    if is_body_limit_error(&e) {
                        AppError::PayloadTooLarge(BODY_TOO_LARGE.to_string())
                    } else {
                        tracing::error!("Error saving file: {:#}", e);
                        AppError::Storage(SAVE_FAILED.to_string())
                    }
                })?;

            tracing::info!(
                "📄 Stored statement {} ({} bytes)",
                stored.filename,
                stored.size
            );

            // Later `file` fields are ignored
            return Ok(Json(UploadResponse::stored(stored.filename)));
        }

        Err(AppError::BadRequest(NO_FILE_PROVIDED.to_string()))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Drain the rest of the body so the client sees the response instead of a reset
            tracing::warn!("Upload failed: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_error_is_found_through_context() {
        let limit = io::Error::new(io::ErrorKind::FileTooLarge, "field exceeded");
        let wrapped = anyhow::Error::new(limit).context("writing uploads/1-jan.pdf");
        assert!(is_body_limit_error(&wrapped));
    }

    #[test]
    fn test_other_io_errors_are_not_body_limit_errors() {
        // Message text alone does not mark a body limit
        let disk = io::Error::other("length limit exceeded");
        let wrapped = anyhow::Error::new(disk).context("writing uploads/1-jan.pdf");
        assert!(!is_body_limit_error(&wrapped));
        assert!(!is_body_limit_error(&anyhow::anyhow!("No space left on device")));
    }
}
