use axum::{
    extract::{FromRequest, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejections use the service's `{ "message" }` error body.
///
/// Accepts `application/json` and any `+json` media type. A missing
/// Content-Type is tolerated.
pub struct RecordJson<T>(pub T);

fn is_json_media_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    media_type == "application/json" || media_type.ends_with("+json")
}

impl<T, S> FromRequest<S> for RecordJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut req = req;

        match req.headers().get(header::CONTENT_TYPE) {
            Some(content_type) => {
                let valid = content_type
                    .to_str()
                    .map(is_json_media_type)
                    .unwrap_or(false);
                if !valid {
                    return Err(AppError::BadRequest(
                        "Content-Type must be application/json".to_string(),
                    ));
                }
            }
            None => {
                // Json rejects bodies without a content type.
                req.headers_mut().insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/json"),
                );
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(RecordJson(value)),
            Err(rejection) => Err(AppError::BadRequest(format!(
                "Invalid JSON: {}",
                rejection.body_text()
            ))),
        }
    }
}
