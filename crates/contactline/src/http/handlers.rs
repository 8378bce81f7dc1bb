//! API handlers

use std::any::Any;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use contactline_smtp::Connector;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::errors::{ApiError, ErrorResponse};
use super::state::AppState;
use crate::notification::{ContactSubmission, NotificationError};

/// Reported when the notification was delivered.
pub const EMAIL_SENT: &str = "Email sent successfully";

/// Reported when no mail account is configured.
pub const NOTIFICATION_DISABLED: &str =
    "Message saved but email notification disabled (Gmail credentials not configured)";

/// Send contact email response body
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true`
    pub success: bool,

    /// What happened to the notification
    pub message: String,
}

impl SuccessResponse {
    fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Relay a contact-form submission to the site owner by email
///
/// The body is decoded regardless of its declared content type.
///
/// # Errors
///
/// Returns a 400 for missing fields or unusable addresses and a 500 for
/// undecodable bodies and delivery failures.
pub async fn send_contact_email<C>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError>
where
    C: Connector + Send + Sync + 'static,
{
    let submission: ContactSubmission = serde_json::from_slice(&body)
        .inspect_err(|e| error!(error = %e, "undecodable contact request"))?;
    let contact = submission.validate()?;

    let Some(credentials) = state.credentials.resolve() else {
        warn!("mail credentials not configured, notification skipped");
        return Ok(Json(SuccessResponse::new(NOTIFICATION_DISABLED)));
    };

    let message = contact.compose(&state.sender_name, credentials.username())?;
    state
        .mailer
        .send(&credentials, &message)
        .await
        .map_err(NotificationError::from)
        .inspect_err(|e| error!(error = %e, "contact notification failed"))?;

    info!(recipient = contact.recipient(), "contact notification sent");
    Ok(Json(SuccessResponse::new(EMAIL_SENT)))
}

/// Answer a CORS preflight; the headers come from the router's layers
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Catch panics and return a 500 error
pub fn panic_handler(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Internal server error".to_string()
    };

    error!(panic = %details, "handler panicked");

    let error = ErrorResponse { error: details };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}
