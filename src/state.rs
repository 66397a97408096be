// Shared handles passed to every request handler

use std::sync::Arc;

use crate::service::ChatService;
use crate::store::ChatStore;
use crate::uploads::UploadDir;

/// Composition root output: cheap to clone, one per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub chat: Arc<ChatService>,
    pub uploads: UploadDir,
    pub max_upload_bytes: u64,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ChatStore>,
        chat: ChatService,
        uploads: UploadDir,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            store,
            chat: Arc::new(chat),
            uploads,
            max_upload_bytes,
        }
    }
}
