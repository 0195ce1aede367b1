use std::sync::Arc;

use tokio_util::task::LocalPoolHandle;

use crate::ogp::CacheFront;

/// Shared application state passed to all handlers.
///
/// Extraction futures hold the streaming parser across awaits and are not
/// `Send`, so handlers run them on `extract_pool`.
#[derive(Clone)]
pub struct AppState {
    pub ogp: Arc<CacheFront>,
    pub extract_pool: LocalPoolHandle,
}
