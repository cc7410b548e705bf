//! Server-wide state handed to every connection task.

use std::sync::Arc;

use linechat_shared::time::Clock;

use crate::{auth::Authenticator, registry::Registry, relay::RelayHandle};

/// Built once per server run and shared by reference-counting.
///
/// Holds the only long-lived relay sender besides the ones cloned into
/// connection tasks; dropping the last context lets the relay stop.
pub(crate) struct ServerContext {
    pub registry: Arc<Registry>,
    pub relay: RelayHandle,
    pub authenticator: Authenticator,
    pub clock: Arc<dyn Clock>,
}
