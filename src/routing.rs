use crate::config::RouteEntry;

/// Immutable counselor-name to mailbox map, built once at startup from
/// the active environment's route list.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    routes: Vec<(String, String)>,
}

impl RoutingTable {
    pub fn new(entries: &[RouteEntry]) -> Self {
        Self {
            routes: entries
                .iter()
                .map(|e| (e.counselor.clone(), e.email.clone()))
                .collect(),
        }
    }

    /// Mailbox for a counselor display name. `None` means the submission
    /// carries a name the table does not know; the pipeline treats that
    /// as a routing failure, never a panic.
    pub fn resolve(&self, counselor_name: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|(name, _)| name == counselor_name)
            .map(|(_, email)| email.as_str())
    }

    /// Every configured mailbox in table order, deduplicated. This is the
    /// broadcast recipient set; the test table maps several counselors to
    /// one admin address, so duplicates are real.
    pub fn all_addresses(&self) -> Vec<&str> {
        let mut addresses: Vec<&str> = Vec::new();
        for (_, email) in &self.routes {
            if !addresses.contains(&email.as_str()) {
                addresses.push(email.as_str());
            }
        }
        addresses
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
