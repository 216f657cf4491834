use std::fmt;

use crate::constants::{HOSTED_MAX_FILE_SIZE, LOCAL_MAX_FILE_SIZE};

/// Which Bot API server a file is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The public `api.telegram.org` service.
    Hosted,
    /// A self-hosted `telegram-bot-api` relay.
    Local,
}

impl Endpoint {
    pub fn max_size_bytes(&self) -> u64 {
        match self {
            Endpoint::Hosted => HOSTED_MAX_FILE_SIZE,
            Endpoint::Local => LOCAL_MAX_FILE_SIZE,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Hosted => write!(f, "hosted"),
            Endpoint::Local => write!(f, "local"),
        }
    }
}

/// Where to fetch from and how many bytes that endpoint may deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub endpoint: Endpoint,
    pub max_size_bytes: u64,
}

impl RoutingDecision {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            max_size_bytes: endpoint.max_size_bytes(),
        }
    }
}
