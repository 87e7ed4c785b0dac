//! Streaming a published artifact back to the client.

use crate::error::HttpAppError;
use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use futures::StreamExt;
use placement_core::{is_scriptable_mime, AppError};
use placement_services::ResolvedArtifact;

/// How the client should treat the streamed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

/// Header-safe rendition of a user-supplied file name.
fn header_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn stream_response<R>(
    resolved: ResolvedArtifact<R>,
    disposition: Disposition,
) -> Result<Response<Body>, HttpAppError> {
    let ResolvedArtifact {
        attachment, body, ..
    } = resolved;

    tracing::debug!(
        storage_key = %attachment.storage.key,
        size_bytes = attachment.size_bytes,
        "Streaming artifact from storage"
    );

    let body_stream = body.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let kind = match disposition {
        Disposition::Inline if !is_scriptable_mime(&attachment.mime_type) => "inline",
        _ => "attachment",
    };
    let content_disposition = format!(
        "{}; filename=\"{}\"",
        kind,
        header_filename(&attachment.original_name)
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.mime_type.as_str())
        .header(header::CONTENT_LENGTH, attachment.size_bytes)
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Body::from_stream(body_stream))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}
