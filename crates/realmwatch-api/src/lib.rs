// realmwatch-api: HTTP probes used by the mode decision engine

pub mod error;
pub mod reachability;
pub mod realm_client;
pub mod transport;

pub use error::Error;
pub use reachability::{DEFAULT_PROBE_TIMEOUT, DEFAULT_REACHABILITY_URL, ReachabilityProbe};
pub use realm_client::{DEFAULT_FETCH_TIMEOUT, RealmProbeClient, parse_realm_body};
pub use transport::{TlsMode, TransportConfig};
