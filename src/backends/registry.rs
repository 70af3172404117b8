//! Backend registry construction and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::echo::EchoBackend;
use super::error::{BackendError, BackendResult};
use super::tcp_forwarder::TcpForwarderBackend;
use super::wol_forwarder::WolForwarderBackend;
use super::Backend;
use crate::config::BackendConfigs;

/// Name-indexed collection of backends, built once from configuration.
///
/// Immutable after construction. Names must be unique across all backend
/// sections; duplicates are rejected.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// Build every configured backend and index it by name.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate names or if a WoL forwarder's wake
    /// parameters are invalid.
    pub fn from_config(config: &BackendConfigs) -> BackendResult<Self> {
        let mut backends: HashMap<String, Arc<dyn Backend>> = HashMap::new();

        for echo in &config.echo {
            insert_unique(&mut backends, Arc::new(EchoBackend::new(echo)))?;
        }

        for forwarder in &config.tcp_forwarder {
            insert_unique(&mut backends, Arc::new(TcpForwarderBackend::new(forwarder)))?;
        }

        for wol in &config.wol_forwarder {
            insert_unique(&mut backends, Arc::new(WolForwarderBackend::new(wol)?))?;
        }

        Ok(Self { backends })
    }

    /// Look up a backend by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.backends.get(name).cloned()
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

fn insert_unique(
    backends: &mut HashMap<String, Arc<dyn Backend>>,
    backend: Arc<dyn Backend>,
) -> BackendResult<()> {
    let name = backend.name().to_string();
    if backends.contains_key(&name) {
        return Err(BackendError::DuplicateName { name });
    }
    backends.insert(name, backend);
    Ok(())
}
