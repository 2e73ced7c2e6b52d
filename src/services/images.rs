use crate::errors::ServiceError;
use crate::models::{ImageField, Item, StoredFile, HUB_ITEM_DOCTYPE};
use crate::services::collaborators::{FileStore, SaveFile};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// True for values that already point at stored or remote content
pub fn is_valid_file_url(value: &str) -> bool {
    value.starts_with("/files") || value.starts_with("/private/files") || value.starts_with("http")
}

/// Moves inline image payloads into file storage
#[derive(Clone)]
pub struct ImageNormalizer {
    files: Arc<dyn FileStore>,
    strict: bool,
}

impl ImageNormalizer {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self {
            files,
            strict: false,
        }
    }

    /// Reject payloads with an empty file name or content instead of leaving them as is
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Stores a pending upload and points the image at the stored file.
    /// Returns the created file, if any.
    #[instrument(skip(self, item), fields(item = %item.name))]
    pub async fn normalize(&self, item: &mut Item) -> Result<Option<StoredFile>, ServiceError> {
        let payload = match &item.image {
            ImageField::Empty | ImageField::Reference(_) => return Ok(None),
            ImageField::PendingUpload(payload) => payload,
        };

        if payload.file_name.is_empty() || payload.base64_content.is_empty() {
            if self.strict {
                return Err(ServiceError::ValidationError(
                    "image payload needs both a file name and base64 content".into(),
                ));
            }
            warn!("incomplete image payload left unprocessed");
            return Ok(None);
        }

        if is_valid_file_url(&payload.base64_content) {
            debug!("image payload already references a stored file");
            return Ok(None);
        }

        let stored = self
            .files
            .save_file(SaveFile {
                file_name: payload.file_name.clone(),
                content: Bytes::from(payload.base64_content.clone()),
                attached_to_doctype: HUB_ITEM_DOCTYPE.to_string(),
                attached_to_name: item.name.clone(),
                decode: true,
                is_private: false,
            })
            .await?;

        info!(file_url = %stored.file_url, "extracted inline image");
        item.image = ImageField::Reference(stored.file_url.clone());
        Ok(Some(stored))
    }
}
