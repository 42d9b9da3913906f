use std::{fmt, sync::Arc};

use crate::upstream::transport::Transport;

/// One upstream address paired with the transport that talks to it.
///
/// Immutable once built. Cloning is cheap: both fields are reference-counted.
#[derive(Clone)]
pub struct Endpoint {
    identifier: Arc<str>,
    transport: Arc<dyn Transport>,
}

impl Endpoint {
    #[must_use]
    pub fn new(identifier: impl Into<Arc<str>>, transport: Arc<dyn Transport>) -> Self {
        Self { identifier: identifier.into(), transport }
    }

    /// Opaque address of the upstream, usually its URL.
    #[must_use]
    pub fn identifier(&self) -> &Arc<str> {
        &self.identifier
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("identifier", &self.identifier).finish_non_exhaustive()
    }
}
