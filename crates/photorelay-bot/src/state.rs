use std::sync::Arc;

use photorelay_core::{AccessGuard, Config};
use photorelay_immich_client::ImmichClient;
use photorelay_pipeline::Pipeline;
use tokio_util::sync::CancellationToken;

/// Shared, read-only state handed to every update handler.
pub struct AppState {
    pub config: Arc<Config>,
    pub guard: Arc<AccessGuard>,
    pub immich: Arc<ImmichClient>,
    pub pipeline: Arc<Pipeline>,
    /// Cancelled on shutdown; in-flight relays stop at the next network call.
    pub shutdown: CancellationToken,
}
