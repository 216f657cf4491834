//! Photorelay Pipeline
//!
//! Moves one Telegram file into Immich: stream it into a scoped temporary file,
//! decide whether the original metadata survived, upload it with bounded
//! retries and report exactly one outcome to the sender. Telegram and Immich
//! sit behind the `FileSource`, `AssetSink` and `ResponseNotifier` traits so
//! the whole flow can run against in-memory stubs.

pub mod dispatcher;
pub mod fetcher;
pub mod metadata;
pub mod notifier;
pub mod pipeline;

pub use dispatcher::{AssetSink, UploadDispatcher};
pub use fetcher::{
    ByteStream, FetchError, FetchResult, FetchedPayload, FileFetcher, FileSource, RemoteFile,
};
pub use metadata::{capture_time, exif_capture_time};
pub use notifier::{render_outcome, ResponseNotifier};
pub use pipeline::Pipeline;
