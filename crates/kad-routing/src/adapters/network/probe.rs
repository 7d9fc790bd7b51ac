use std::time::Duration;

use crate::domain::Contact;
use crate::ports::{LivenessProbe, ProbeCallback};

// ============================================================================
// StaticLivenessProbe - Fixed verdict, no network
// ============================================================================

/// Probe that answers immediately with a fixed verdict.
///
/// With no transport wired in, `alive()` is the conservative choice: full
/// buckets keep their incumbents, which is plain Kademlia behavior.
#[derive(Debug, Clone, Copy)]
pub struct StaticLivenessProbe {
    verdict: bool,
}

impl StaticLivenessProbe {
    /// Every probed contact is reported reachable.
    #[must_use]
    pub fn alive() -> Self {
        Self { verdict: true }
    }

    /// Every probed contact is reported unreachable.
    #[must_use]
    pub fn unreachable() -> Self {
        Self { verdict: false }
    }
}

impl Default for StaticLivenessProbe {
    fn default() -> Self {
        Self::alive()
    }
}

impl LivenessProbe for StaticLivenessProbe {
    fn probe(&self, _contact: &Contact, _timeout: Duration, on_complete: ProbeCallback) {
        on_complete(self.verdict);
    }
}

// ============================================================================
// TcpLivenessProbe - TCP connect check (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod tcp_probe {
    use super::*;
    use tokio::net::TcpStream;
    use tokio::runtime::Handle;
    use tracing::debug;

    /// Reachability check by TCP connect, bounded by the probe timeout.
    ///
    /// Each probe runs as a task on the supplied tokio runtime; the caller
    /// never waits on it.
    #[derive(Debug, Clone)]
    pub struct TcpLivenessProbe {
        handle: Handle,
    }

    impl TcpLivenessProbe {
        /// Spawn probes on the given runtime.
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Spawn probes on the runtime the caller is running in, if any.
        pub fn from_current() -> Option<Self> {
            Handle::try_current().ok().map(Self::new)
        }
    }

    impl LivenessProbe for TcpLivenessProbe {
        fn probe(&self, contact: &Contact, timeout: Duration, on_complete: ProbeCallback) {
            let address = contact.address();
            let node_id = contact.node_id;

            self.handle.spawn(async move {
                let alive =
                    match tokio::time::timeout(timeout, TcpStream::connect(address.as_str())).await
                    {
                        Ok(Ok(_stream)) => true,
                        Ok(Err(e)) => {
                            debug!(%node_id, %address, error = %e, "liveness probe connect failed");
                            false
                        }
                        Err(_) => {
                            debug!(%node_id, %address, ?timeout, "liveness probe timed out");
                            false
                        }
                    };
                on_complete(alive);
            });
        }
    }
}

#[cfg(feature = "network")]
pub use tcp_probe::TcpLivenessProbe;
