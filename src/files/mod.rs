use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::error::{Error, Result};

const MAX_EXTENSION_LEN: usize = 10;

/// Blob store for uploaded record files.
///
/// Blobs are written under generated names (`<uuid>[.<ext>]`) so the
/// client-supplied file name never reaches the filesystem; it is kept only as
/// metadata.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(uploads_dir: &Path) -> Self {
        Self {
            base_path: uploads_dir.to_path_buf(),
        }
    }

    fn blob_path(&self, stored_name: &str) -> Result<PathBuf> {
        validate_stored_name(stored_name)?;
        Ok(self.base_path.join(stored_name))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }

    /// Writes `data` and returns the generated stored name.
    pub async fn put(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let stored_name = stored_name_for(original_name);

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;

        let final_path = self.blob_path(&stored_name)?;
        fs::rename(&temp_path, &final_path).await?;

        Ok(stored_name)
    }

    pub async fn get(&self, stored_name: &str) -> Result<(BufReader<File>, u64)> {
        let path = self.blob_path(stored_name)?;
        let file = File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::NotFound
            } else {
                Error::Io(e)
            }
        })?;
        let size = file.metadata().await?.len();

        Ok((BufReader::new(file), size))
    }

    /// Removes a blob. Returns false if it was already gone.
    pub async fn delete(&self, stored_name: &str) -> Result<bool> {
        let path = self.blob_path(stored_name)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

fn stored_name_for(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match extension_of(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

/// Lowercased extension of `name`, if it is short and alphanumeric.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn validate_stored_name(name: &str) -> Result<()> {
    let (id, ext) = match name.split_once('.') {
        Some((id, ext)) => (id, Some(ext)),
        None => (name, None),
    };

    if Uuid::parse_str(id).is_err() {
        return Err(Error::InvalidInput(format!("invalid stored file name '{name}'")));
    }
    let ext_ok =
        ext.is_none_or(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if !ext_ok {
        return Err(Error::InvalidInput(format!("invalid stored file name '{name}'")));
    }

    Ok(())
}
