//! Transport routing.
//!
//! The hosted Bot API refuses `getFile` above 20 MiB; a self-hosted relay lifts
//! that to the 2000 MiB protocol cap. The router picks the endpoint from the
//! capability flag and the declared size, and is a pure function of both.

use crate::constants::{HOSTED_MAX_FILE_SIZE, LOCAL_MAX_FILE_SIZE};
use crate::models::{Endpoint, RejectReason, RoutingDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportRouter {
    local_available: bool,
}

impl TransportRouter {
    pub fn new(local_available: bool) -> Self {
        Self { local_available }
    }

    /// Decide where to fetch from. A missing size routes on capability alone;
    /// the fetcher re-checks the real byte count while streaming.
    pub fn route(&self, declared_size_bytes: Option<u64>) -> Result<RoutingDecision, RejectReason> {
        let size = declared_size_bytes.unwrap_or(0);

        if self.local_available {
            if size > LOCAL_MAX_FILE_SIZE {
                return Err(RejectReason::ExceedsHardLimit);
            }
            return Ok(RoutingDecision::new(Endpoint::Local));
        }

        if size > HOSTED_MAX_FILE_SIZE {
            return Err(RejectReason::ExceedsHostedLimit);
        }
        Ok(RoutingDecision::new(Endpoint::Hosted))
    }
}
