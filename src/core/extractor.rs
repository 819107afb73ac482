use axum::{
    body::Body,
    extract::{multipart::MultipartError, rejection::JsonRejection, FromRequest, Multipart, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::uploads::services::{CandidateFile, UploadError};

/// JSON body extractor whose rejections use the `ApiResponse` error envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(AppJsonRejection)
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a request with Content-Type: application/json".to_string()
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

/// The upload form: a `user_name` text field and a `file` part.
///
/// Both are optional here; their absence is reported by the upload workflow
/// with the same messages as any other invalid submission.
pub struct UploadForm {
    pub user_name: String,
    pub file: Option<CandidateFile>,
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Expected multipart form data: {}", e)))?;

        let mut user_name = String::new();
        let mut file = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, "Failed to read multipart data"))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "user_name" => {
                    user_name = field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, "Failed to read user_name field"))?;
                }
                "file" => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let name = field
                        .file_name()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unnamed".to_string());
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error(e, "Failed to read file data"))?;

                    file = Some(CandidateFile::from_bytes(name, content_type, data.to_vec()));
                }
                _ => debug!("Ignoring unknown field: {}", field_name),
            }
        }

        Ok(Self { user_name, file })
    }
}

/// A body cut off by the request size limit is reported as an oversized file
fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        debug!("Multipart body exceeds the request limit: {}", err);
        return UploadError::FileTooLarge.into();
    }
    debug!("{}: {}", context, err);
    AppError::BadRequest(format!("{}: {}", context, err))
}
