use thiserror::Error;

/// Failures surfaced while handling a single form submission.
///
/// Every variant funnels through the administrative error channel before
/// the pipeline returns; a missing submission event is not an error at all
/// and never reaches this type.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("counselor email not found for: {0}")]
    UnknownCounselor(String),

    #[error("invalid recipient address {address}: {reason}")]
    InvalidRecipient { address: String, reason: String },

    #[error("mail transport error: {0}")]
    Mail(String),

    #[error("sheet store error: {0}")]
    Sheet(String),

    #[error("configuration error: {0}")]
    Config(String),
}
