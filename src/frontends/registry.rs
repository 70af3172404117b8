//! Frontend registry: parallel startup and coordinated shutdown.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::error::{FrontendError, FrontendResult};
use super::tcp::TcpFrontend;
use crate::backends::BackendRegistry;
use crate::config::FrontendConfigs;

/// Name-indexed collection of frontends, built once from configuration.
///
/// Immutable after construction. One failed frontend brings the rest
/// down: a listen error triggers [`FrontendRegistry::close_all`].
pub struct FrontendRegistry {
    frontends: HashMap<String, Arc<TcpFrontend>>,
}

impl FrontendRegistry {
    /// Build every configured frontend, resolving backends by name.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate names or if any frontend fails to
    /// construct; frontends already built are closed first, so no
    /// listeners are left dangling.
    pub fn from_config(
        config: &FrontendConfigs,
        backends: &BackendRegistry,
    ) -> FrontendResult<Self> {
        let mut frontends: HashMap<String, Arc<TcpFrontend>> = HashMap::new();

        for tcp in &config.tcp {
            if frontends.contains_key(&tcp.name) {
                close_each(frontends.values());
                return Err(FrontendError::DuplicateName {
                    name: tcp.name.clone(),
                });
            }

            match TcpFrontend::new(tcp, backends) {
                Ok(frontend) => {
                    frontends.insert(tcp.name.clone(), Arc::new(frontend));
                },
                Err(e) => {
                    close_each(frontends.values());
                    return Err(e);
                },
            }
        }

        Ok(Self { frontends })
    }

    /// Look up a frontend by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<TcpFrontend>> {
        self.frontends.get(name).cloned()
    }

    /// Number of registered frontends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frontends.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frontends.is_empty()
    }

    /// Start every frontend's accept loop in its own task.
    ///
    /// If any frontend's `listen` returns an error, the error is logged
    /// and all frontends are closed.
    pub fn listen_all(self: &Arc<Self>) {
        for frontend in self.frontends.values() {
            let frontend = Arc::clone(frontend);
            let registry = Arc::clone(self);

            tokio::spawn(async move {
                if let Err(e) = frontend.listen().await {
                    warn!(name = %frontend.name(), error = %e, "frontend failed to listen");
                    registry.close_all();
                }
            });
        }
    }

    /// Close every frontend, logging per-frontend failures and continuing.
    pub fn close_all(&self) {
        close_each(self.frontends.values());
    }
}

fn close_each<'a, I>(frontends: I)
where
    I: IntoIterator<Item = &'a Arc<TcpFrontend>>,
{
    for frontend in frontends {
        if let Err(e) = frontend.close() {
            warn!(name = %frontend.name(), error = %e, "couldn't close frontend properly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use crate::config::{BackendConfigs, EchoBackendConfig, TcpFrontendConfig};

    fn echo_registry() -> BackendRegistry {
        BackendRegistry::from_config(&BackendConfigs {
            echo: vec![EchoBackendConfig {
                name: "e1".to_string(),
            }],
            tcp_forwarder: Vec::new(),
            wol_forwarder: Vec::new(),
        })
        .unwrap()
    }

    fn tcp(name: &str, target: &str) -> TcpFrontendConfig {
        TcpFrontendConfig {
            name: name.to_string(),
            listen_addr: "127.0.0.1:0".to_string(),
            target: target.to_string(),
        }
    }

    async fn wait_bound(frontend: &TcpFrontend) -> std::net::SocketAddr {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if let Some(addr) = frontend.bound_addr() {
                    return addr;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("frontend did not bind in time")
    }

    #[test]
    fn test_construction_failure_reports_frontend_context() {
        let backends = echo_registry();
        let config = FrontendConfigs {
            tcp: vec![tcp("ok", "e1"), tcp("broken", "missing")],
        };

        let result = FrontendRegistry::from_config(&config, &backends);
        assert!(matches!(
            result,
            Err(FrontendError::UnknownBackend { name, target })
                if name == "broken" && target == "missing"
        ));
    }

    #[test]
    fn test_duplicate_frontend_names_rejected() {
        let backends = echo_registry();
        let config = FrontendConfigs {
            tcp: vec![tcp("same", "e1"), tcp("same", "e1")],
        };

        let result = FrontendRegistry::from_config(&config, &backends);
        assert!(matches!(
            result,
            Err(FrontendError::DuplicateName { name }) if name == "same"
        ));
    }

    #[tokio::test]
    async fn test_listen_all_and_close_all() {
        let backends = echo_registry();
        let config = FrontendConfigs {
            tcp: vec![tcp("f1", "e1"), tcp("f2", "e1")],
        };

        let registry = Arc::new(FrontendRegistry::from_config(&config, &backends).unwrap());
        registry.listen_all();

        for name in ["f1", "f2"] {
            let frontend = registry.get(name).unwrap();
            let addr = wait_bound(&frontend).await;

            let mut client = TcpStream::connect(addr).await.unwrap();
            client.write_all(b"ping").await.unwrap();
            let mut buf = [0u8; 4];
            client.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf, b"ping");
        }

        registry.close_all();

        // Once closed, new connections are refused or reset.
        let addr = registry.get("f1").unwrap().bound_addr().unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match TcpStream::connect(addr).await {
                    Ok(mut stream) => {
                        // Accepted by a backlog race; the read must fail.
                        let mut buf = [0u8; 1];
                        if matches!(stream.read(&mut buf).await, Ok(0) | Err(_)) {
                            break;
                        }
                    },
                    Err(_) => break,
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("listener did not close");
    }

    #[test]
    fn test_get_unknown_frontend() {
        let backends = echo_registry();
        let registry =
            FrontendRegistry::from_config(&FrontendConfigs::default(), &backends).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get("nope").is_none());
    }
}
