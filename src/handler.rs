use std::sync::Arc;

use crate::compose::compose;
use crate::config::Config;
use crate::error::NotifyError;
use crate::form::{missing_required_fields, FormData, FormEvent};
use crate::mailer::{notify_admin, MailTransport, OutboundEmail};
use crate::reason::is_emergency;
use crate::routing::RoutingTable;
use crate::sheets::{ensure_checkboxes, SheetStore};

/// What became of one inbound event. `process` never returns an error;
/// every failure path has already been logged and alerted by the time
/// the outcome is handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No event or no `values` payload; a benign no-op.
    Ignored,
    /// Validation, routing, or delivery failed; the administrator was alerted.
    Failed,
    Sent {
        recipients: Vec<String>,
        broadcast: bool,
    },
}

/// The submission pipeline with its collaborators injected once at
/// startup: configuration, mail transport, sheet store. Immutable for
/// the life of the process.
pub struct Processor {
    config: Config,
    routes: RoutingTable,
    mailer: Arc<dyn MailTransport>,
    sheets: Arc<dyn SheetStore>,
}

impl Processor {
    pub fn new(config: Config, mailer: Arc<dyn MailTransport>, sheets: Arc<dyn SheetStore>) -> Self {
        let routes = config.routing_table();
        Self {
            config,
            routes,
            mailer,
            sheets,
        }
    }

    /// Handle one form submission end to end: extract, validate, route,
    /// compose, dispatch, then stamp the tracking sheets.
    pub async fn process(&self, event: Option<&FormEvent>) -> Outcome {
        let Some(values) = event.and_then(|e| e.values.as_deref()) else {
            tracing::info!("Form submission event or values are undefined, ignoring");
            return Outcome::Ignored;
        };

        tracing::debug!(field_count = values.len(), "Processing form submission");

        match self.dispatch(values).await {
            Ok((recipients, broadcast)) => {
                // Sheet maintenance failures alert the admin but do not
                // undo a delivered notification.
                if let Err(error) = ensure_checkboxes(self.sheets.as_ref(), &self.config.sheets).await
                {
                    self.alert(&error).await;
                }
                Outcome::Sent {
                    recipients,
                    broadcast,
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to process counselor request");
                self.alert(&error).await;
                Outcome::Failed
            }
        }
    }

    /// Run checkbox maintenance alone; the manual refresh entry point.
    /// Returns false when any sheet failed (the admin has been alerted).
    pub async fn refresh_checkboxes(&self) -> bool {
        tracing::info!("Manually refreshing checkboxes");
        match ensure_checkboxes(self.sheets.as_ref(), &self.config.sheets).await {
            Ok(()) => true,
            Err(error) => {
                self.alert(&error).await;
                false
            }
        }
    }

    async fn alert(&self, error: &NotifyError) {
        notify_admin(
            self.mailer.as_ref(),
            &self.config.notify.admin_email,
            error,
        )
        .await;
    }

    async fn dispatch(&self, values: &[String]) -> Result<(Vec<String>, bool), NotifyError> {
        let data = FormData::extract(values, &self.config.columns);

        if let Some(field) = missing_required_fields(&data).first().copied() {
            return Err(NotifyError::MissingField(field));
        }

        let message = compose(&data, &self.config.notify.subject);
        let broadcast = is_emergency(&data, &self.config.notify.emergency_urgency);

        let recipients: Vec<String> = if broadcast {
            tracing::warn!(
                counselor = %data.counselor_name,
                "Emergency request, broadcasting to all counselors"
            );
            self.routes
                .all_addresses()
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            let address = self
                .routes
                .resolve(&data.counselor_name)
                .ok_or_else(|| NotifyError::UnknownCounselor(data.counselor_name.clone()))?;
            vec![address.to_string()]
        };

        let email = OutboundEmail {
            to: recipients.clone(),
            subject: message.subject,
            body: message.body,
            html_body: Some(message.html_body),
        };

        self.mailer.send(&email).await?;

        tracing::info!(
            to = %recipients.join(", "),
            broadcast,
            "Counselor notification sent"
        );

        Ok((recipients, broadcast))
    }
}
