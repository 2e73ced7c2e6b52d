use crate::config::HubConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::StoredFile;
use crate::services::collaborators::{FileStore, HttpFetcher, SaveFile};
use crate::services::fetch::ReqwestFetcher;
use crate::services::files::LocalFileStore;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Copies remotely hosted files into local storage
#[derive(Clone)]
pub struct RemoteFileMirror {
    fetcher: Arc<dyn HttpFetcher>,
    files: Arc<dyn FileStore>,
}

impl RemoteFileMirror {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, files: Arc<dyn FileStore>) -> Self {
        Self { fetcher, files }
    }

    /// `reqwest` fetcher with the configured timeout, storing under `files_root`
    pub fn with_defaults(db_pool: Arc<DbPool>, config: &HubConfig) -> Result<Self, ServiceError> {
        let fetcher = ReqwestFetcher::new(config.remote_fetch_timeout())?;
        let files = LocalFileStore::new(db_pool, config.files_root.clone());
        Ok(Self::new(Arc::new(fetcher), Arc::new(files)))
    }

    /// Downloads `url` and stores it attached to `owner_type`/`owner_id`.
    ///
    /// Anything that is not an `http(s)` URL is ignored and yields `None`.
    /// Fetch failures are returned as they come from the fetcher.
    #[instrument(skip(self))]
    pub async fn mirror(
        &self,
        url: &str,
        owner_type: &str,
        owner_id: &str,
    ) -> Result<Option<StoredFile>, ServiceError> {
        if !url.starts_with("http") {
            debug!("not a remote url, nothing to mirror");
            return Ok(None);
        }

        let file_name = file_name_from_url(url)?;
        let content = self.fetcher.get(url).await?;

        let stored = self
            .files
            .save_file(SaveFile {
                file_name,
                content,
                attached_to_doctype: owner_type.to_string(),
                attached_to_name: owner_id.to_string(),
                decode: false,
                is_private: false,
            })
            .await?;

        counter!("hub_items.files_mirrored", 1);
        info!(file_url = %stored.file_url, "mirrored remote file");
        Ok(Some(stored))
    }
}

/// Last path segment of `url`, ignoring the query string and fragment
pub fn file_name_from_url(url: &str) -> Result<String, ServiceError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit('/').next().unwrap_or_default();

    if name.is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "cannot derive a file name from '{}'",
            url
        )));
    }
    Ok(name.to_string())
}
