//! A JSON extractor that reports malformed bodies using our own
//! [`ApiError`] taxonomy instead of axum's raw-string rejections.
//!
//! Grounded on `lexe-api::server::LxJson`: `axum::Json`'s `IntoResponse`
//! impl for rejections is a bare string body, which doesn't fit the
//! `ErrorResponse` envelope every other error on this service uses.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::IntoResponse,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ApiError, ApiErrorKind};

pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Json(value))
            .map_err(json_rejection_to_api_error)
    }
}

fn json_rejection_to_api_error(rejection: JsonRejection) -> ApiError {
    ApiError::new(ApiErrorKind::InvalidRequest, rejection.body_text())
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}
