use crate::entities::file;
use crate::errors::ServiceError;
use crate::models::StoredFile;
use crate::services::collaborators::{FileStore, SaveFile};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const PUBLIC_DIR: &str = "files";
const PRIVATE_DIR: &str = "private/files";

/// Stores files on local disk under `root` and records them in the `files` table
#[derive(Clone)]
pub struct LocalFileStore {
    db: Arc<DatabaseConnection>,
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(db: Arc<DatabaseConnection>, root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Picks a name inside `dir` that does not clobber different content.
    /// Returns the name and whether the content still has to be written.
    async fn resolve_name(
        &self,
        dir: &Path,
        file_name: &str,
        content_hash: &str,
    ) -> Result<(String, bool), ServiceError> {
        let existing = dir.join(file_name);
        if !tokio::fs::try_exists(&existing).await? {
            return Ok((file_name.to_string(), true));
        }

        let current = tokio::fs::read(&existing).await?;
        if hex::encode(Sha256::digest(&current)) == content_hash {
            return Ok((file_name.to_string(), false));
        }

        let renamed = suffixed_name(file_name, &content_hash[content_hash.len() - 6..]);
        let write = !tokio::fs::try_exists(dir.join(&renamed)).await?;
        Ok((renamed, write))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    #[instrument(skip(self, request), fields(file_name = %request.file_name, attached_to = %request.attached_to_name))]
    async fn save_file(&self, request: SaveFile) -> Result<StoredFile, ServiceError> {
        let content = if request.decode {
            decode_content(&request.content)?
        } else {
            request.content.to_vec()
        };

        let file_name = sanitize_file_name(&request.file_name)?;
        let content_hash = hex::encode(Sha256::digest(&content));

        let (subdir, url_prefix) = if request.is_private {
            (PRIVATE_DIR, "/private/files")
        } else {
            (PUBLIC_DIR, "/files")
        };
        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let (file_name, needs_write) = self.resolve_name(&dir, &file_name, &content_hash).await?;
        if needs_write {
            tokio::fs::write(dir.join(&file_name), &content).await?;
        } else {
            debug!(file_name = %file_name, "identical content already on disk");
        }

        let record = file::ActiveModel {
            id: Set(Uuid::new_v4()),
            file_name: Set(file_name.clone()),
            file_url: Set(format!("{}/{}", url_prefix, file_name)),
            attached_to_doctype: Set(Some(request.attached_to_doctype)),
            attached_to_name: Set(Some(request.attached_to_name)),
            is_private: Set(request.is_private),
            content_hash: Set(content_hash),
            file_size: Set(content.len() as i64),
            created_at: Set(Utc::now()),
        };
        let stored = record.insert(&*self.db).await?;

        counter!("hub_items.files_saved", 1);
        info!(file_url = %stored.file_url, size = stored.file_size, "File saved");

        Ok(stored)
    }
}

/// Decodes base64 text, dropping a leading `data:<mime>;base64,` header
pub fn decode_content(content: &[u8]) -> Result<Vec<u8>, ServiceError> {
    let text = std::str::from_utf8(content)
        .map_err(|_| ServiceError::InvalidInput("base64 content is not valid text".into()))?;
    let encoded = match text.split_once(',') {
        Some((_, data)) => data,
        None => text,
    };

    general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::InvalidInput(format!("invalid base64 content: {}", e)))
}

fn sanitize_file_name(file_name: &str) -> Result<String, ServiceError> {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(ServiceError::InvalidInput(format!(
            "invalid file name '{}'",
            file_name
        )));
    }
    Ok(name.to_string())
}

/// `photo.png` + `a1b2c3` -> `photoa1b2c3.png`
fn suffixed_name(file_name: &str, suffix: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}{}.{}", stem, suffix, ext),
        _ => format!("{}{}", file_name, suffix),
    }
}
