//! Named register transports.
//!
//! The binary picks its transport by name (`--transport`). Factories are
//! collected into a [`TransportRegistry`] value at startup; later
//! registrations replace earlier ones, so a platform can override a
//! built-in transport.

use asic_common::device::config::AsicConfig;
use asic_common::device::transport::{RegisterTransport, TransportFactory};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::CoreError;
use crate::transports::register_all_transports;

/// Transport factories keyed by name.
#[derive(Default)]
pub struct TransportRegistry {
    factories: BTreeMap<&'static str, TransportFactory>,
}

impl TransportRegistry {
    /// Registry holding the built-in transports.
    pub fn with_builtin() -> Self {
        let mut registry = Self::default();
        register_all_transports(&mut registry);
        registry
    }

    /// Add a factory under `name`, replacing any previous one.
    pub fn register(&mut self, name: &'static str, factory: TransportFactory) {
        if self.factories.insert(name, factory).is_some() {
            debug!("Transport '{name}' overridden");
        }
    }

    /// Build the transport registered under `name`.
    ///
    /// # Errors
    /// `CoreError::TransportNotFound` for an unknown name.
    pub fn create_transport(
        &self,
        name: &str,
        config: &AsicConfig,
    ) -> Result<Box<dyn RegisterTransport>, CoreError> {
        self.factories
            .get(name)
            .map(|factory| factory(config))
            .ok_or_else(|| CoreError::TransportNotFound(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}
