//! Request extractors for the conversation API
//!
//! Both extractors turn axum's plain-text rejections into the JSON error
//! envelope, so a bad `{id}` segment and a bad request body fail the same way.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::Error;

/// JSON body that must deserialize and pass its `validator` rules.
///
/// A create-conversation body with an empty `name`, or a message body whose
/// `sender` is neither `user` nor `bot`, is rejected with 400 before any
/// handler runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// Why a `ValidatedJson` body was refused; always rendered as 400
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// Malformed JSON, wrong field types, unknown enum values
    Json(JsonRejection),
    /// Well-formed JSON that broke a validation rule
    Validation(Error),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            ValidatedJsonRejection::Json(e) => Error::Validation(e.body_text()).into_response(),
            ValidatedJsonRejection::Validation(e) => e.into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        payload.validate().map_err(|e| {
            ValidatedJsonRejection::Validation(Error::Validation(format!(
                "Validation failed: {}",
                e
            )))
        })?;
        Ok(ValidatedJson(payload))
    }
}

/// Path parameters, e.g. the integer conversation id in
/// `/api/conversations/{id}`. A segment that does not parse is a 400
/// `VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Validation(e.body_text()))?;
        Ok(ApiPath(value))
    }
}
