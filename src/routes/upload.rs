/**
 * Upload Route
 * Image upload to the local upload directory, served back under /uploads
 */
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5MB
/// File cap plus room for multipart framing
pub const MAX_BODY_SIZE: usize = MAX_FILE_SIZE + 64 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Upload failure rendered as `{success: false, error}`
#[derive(Debug)]
pub struct UploadError {
    status: StatusCode,
    message: String,
}

impl UploadError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(UploadResponse {
                success: false,
                url: None,
                error: Some(self.message),
            }),
        )
            .into_response()
    }
}

fn validate_image_magic_bytes(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("gif"),
        // RIFF....WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("webp"),
        _ => None,
    }
}

fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// POST /api/admin/upload - multipart with a `file` field
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return Err(UploadError::bad_request("No file provided")),
            Err(e) => {
                tracing::warn!("Multipart error: {}", e);
                return Err(UploadError::bad_request("Invalid multipart data"));
            }
        }
    };

    let original_name = field.file_name().unwrap_or_default().to_string();
    let allowed = extension_of(&original_name)
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    if !allowed {
        return Err(UploadError::bad_request(
            "Unsupported file type. Allowed: JPEG, PNG, WebP, GIF.",
        ));
    }

    let bytes = field.bytes().await.map_err(|e| {
        tracing::warn!("Failed to read upload bytes: {}", e);
        UploadError::bad_request("Failed to read file data")
    })?;

    if bytes.is_empty() {
        return Err(UploadError::bad_request("Empty file"));
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(UploadError::bad_request("File too large. Maximum size is 5MB."));
    }

    let ext = validate_image_magic_bytes(&bytes).ok_or_else(|| {
        UploadError::bad_request("File content does not match an allowed image type.")
    })?;

    let dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory {}: {}", dir.display(), e);
        UploadError::internal("Failed to initialize upload directory")
    })?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    tokio::fs::write(dir.join(&filename), &bytes)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write upload {}: {}", filename, e);
            UploadError::internal("Failed to save file")
        })?;

    tracing::info!("Image uploaded: {} ({} bytes)", filename, bytes.len());

    Ok(Json(UploadResponse {
        success: true,
        url: Some(format!("/uploads/{}", filename)),
        error: None,
    }))
}
