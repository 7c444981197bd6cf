//! Context-to-key resolution.
//!
//! All signing-mode branching lives here. Issuance, verification and JWK
//! publication ask for a key by `(context, purpose)` and never look at the mode.

use crate::crypto::KeyMaterial;
use crate::errors::TaError;
use crate::key_store::KeyStore;
use crate::models::{ContextKeyConfig, SigningMode};
use common::secret::SecretString;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// What the resolved key will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    Sign,
    Verify,
    Public,
}

impl KeyPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPurpose::Sign => "sign",
            KeyPurpose::Verify => "verify",
            KeyPurpose::Public => "public",
        }
    }
}

/// Resolves the key material for a context.
pub trait KeyResolver: Send + Sync {
    /// Resolve key material for `context` and `purpose`.
    ///
    /// # Errors
    ///
    /// - `UnknownContext` - context not configured, or the needed path is absent/empty
    /// - `UnsupportedOperation` - `Public` requested in shared-secret mode
    /// - `KeyMaterialUnavailable` - key file missing, unreadable or empty
    fn resolve(&self, context: &str, purpose: KeyPurpose) -> Result<KeyMaterial, TaError>;

    /// Signing mode this resolver serves.
    fn mode(&self) -> SigningMode;
}

/// Resolver backed by the static context table and a [`KeyStore`].
pub struct ConfiguredKeyResolver {
    mode: SigningMode,
    contexts: HashMap<String, ContextKeyConfig>,
    app_secret: Option<SecretString>,
    key_store: Arc<dyn KeyStore>,
}

impl ConfiguredKeyResolver {
    pub fn new(
        mode: SigningMode,
        contexts: HashMap<String, ContextKeyConfig>,
        app_secret: Option<SecretString>,
        key_store: Arc<dyn KeyStore>,
    ) -> Self {
        Self {
            mode,
            contexts,
            app_secret,
            key_store,
        }
    }

    fn resolve_shared_secret(&self, purpose: KeyPurpose) -> Result<KeyMaterial, TaError> {
        if purpose == KeyPurpose::Public {
            return Err(TaError::UnsupportedOperation(
                "No public key exists for a shared secret".to_string(),
            ));
        }

        self.app_secret
            .clone()
            .map(KeyMaterial::SharedSecret)
            .ok_or_else(|| TaError::KeyMaterialUnavailable("Application secret not configured".to_string()))
    }

    fn resolve_certificate(&self, context: &str, purpose: KeyPurpose) -> Result<KeyMaterial, TaError> {
        let entry = self.contexts.get(context).ok_or_else(|| {
            tracing::debug!(target: "ta.services.key_resolver", "Context not configured");
            TaError::UnknownContext
        })?;

        let path = match purpose {
            KeyPurpose::Sign | KeyPurpose::Verify => entry.private_key_path(),
            KeyPurpose::Public => entry.public_key_path(),
        }
        .ok_or_else(|| {
            tracing::debug!(
                target: "ta.services.key_resolver",
                purpose = purpose.as_str(),
                "Context has no key path for purpose"
            );
            TaError::UnknownContext
        })?;

        let content = self.key_store.read(path)?;

        Ok(match purpose {
            KeyPurpose::Sign | KeyPurpose::Verify => {
                KeyMaterial::RsaPrivatePem(SecretString::from(content))
            }
            KeyPurpose::Public => KeyMaterial::RsaPublicPem(content),
        })
    }
}

impl KeyResolver for ConfiguredKeyResolver {
    #[instrument(skip_all, name = "ta.services.key_resolver", fields(purpose = purpose.as_str()))]
    fn resolve(&self, context: &str, purpose: KeyPurpose) -> Result<KeyMaterial, TaError> {
        match self.mode {
            SigningMode::SharedSecret => self.resolve_shared_secret(purpose),
            SigningMode::Certificate => self.resolve_certificate(context, purpose),
        }
    }

    fn mode(&self) -> SigningMode {
        self.mode
    }
}
