use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use derive_new::new;

use super::{DocumentStore, StorageError};

#[derive(Debug, Clone, new)]
pub struct App {
    pub documents: Arc<DocumentStore>,
}

impl App {
    pub async fn open(data_file: impl AsRef<Path>) -> Result<App, StorageError> {
        let documents = DocumentStore::open(data_file).await?;
        Ok(App::new(Arc::new(documents)))
    }
}

impl Deref for App {
    type Target = DocumentStore;

    fn deref(&self) -> &Self::Target {
        &self.documents
    }
}
