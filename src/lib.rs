pub mod compose;
pub mod config;
pub mod error;
pub mod form;
pub mod handler;
pub mod mailer;
pub mod observability;
pub mod reason;
pub mod routing;
pub mod sheets;

pub use config::Config;
pub use error::NotifyError;
pub use form::{FormData, FormEvent};
pub use handler::{Outcome, Processor};
