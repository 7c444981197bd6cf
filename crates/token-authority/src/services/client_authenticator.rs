//! Shared-secret client authentication.
//!
//! Maps a presented `(token name, secret)` pair to a registered client. The
//! caller only learns match or no-match, never which half was wrong.

use crate::models::RegisteredClient;
use crate::observability::hash_for_correlation;
use common::secret::ExposeSecret;
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::instrument;

pub struct ClientCredentialAuthenticator {
    clients: HashMap<String, RegisteredClient>,
}

impl ClientCredentialAuthenticator {
    pub fn new(clients: HashMap<String, RegisteredClient>) -> Self {
        Self { clients }
    }

    /// Return the registered client if `token_name` exists and `presented_secret`
    /// equals its secret exactly.
    ///
    /// The secret comparison runs in constant time for equal-length inputs.
    #[instrument(skip_all, name = "ta.services.authenticate", fields(client = %hash_for_correlation(token_name)))]
    pub fn authenticate(&self, token_name: &str, presented_secret: &str) -> Option<&RegisteredClient> {
        let Some(client) = self.clients.get(token_name) else {
            tracing::debug!(target: "ta.services.authenticate", "Unknown client token name");
            return None;
        };

        let stored = client.secret.expose_secret().as_bytes();
        if bool::from(stored.ct_eq(presented_secret.as_bytes())) {
            Some(client)
        } else {
            tracing::debug!(target: "ta.services.authenticate", "Client secret mismatch");
            None
        }
    }
}
