//! File-backed blob storage.
//!
//! One file per alias, named `<prefix><alias>`, inside an app-private
//! directory. Writes go to a temporary sibling first and are renamed into
//! place, so a crash never leaves a half-written key file behind. On unix
//! files are created with mode 0600.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::traits::{SecureStorage, SecureStorageError, SecureStorageResult};
use crate::config::DEFAULT_FILE_PREFIX;

/// [`SecureStorage`] over a directory of files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    prefix: String,
}

impl FileStorage {
    /// Use `dir` with the default file prefix. The directory is created if missing.
    pub fn new(dir: impl Into<PathBuf>) -> SecureStorageResult<Self> {
        Self::with_prefix(dir, DEFAULT_FILE_PREFIX)
    }

    pub fn with_prefix(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> SecureStorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SecureStorageError::io(dir.display().to_string(), e))?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, alias: &str) -> SecureStorageResult<PathBuf> {
        if alias.is_empty() {
            return Err(SecureStorageError::invalid_alias(alias, "empty"));
        }
        if alias.contains(['/', '\\']) || alias == "." || alias == ".." {
            return Err(SecureStorageError::invalid_alias(
                alias,
                "contains a path separator",
            ));
        }
        if alias.contains('\0') {
            return Err(SecureStorageError::invalid_alias(alias, "contains a NUL byte"));
        }
        Ok(self.dir.join(format!("{}{}", self.prefix, alias)))
    }
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl SecureStorage for FileStorage {
    fn get(&self, alias: &str) -> SecureStorageResult<Option<Vec<u8>>> {
        let path = self.path_for(alias)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SecureStorageError::io(alias, e)),
        }
    }

    fn put(&self, alias: &str, data: &[u8]) -> SecureStorageResult<()> {
        let path = self.path_for(alias)?;
        let tmp_path = self.dir.join(format!(".{}{}.tmp", self.prefix, alias));

        write_private(&tmp_path, data).map_err(|e| SecureStorageError::io(alias, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            SecureStorageError::io(alias, e)
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(alias, bytes = data.len(), "blob written");
        Ok(())
    }

    fn delete(&self, alias: &str) -> SecureStorageResult<()> {
        let path = self.path_for(alias)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SecureStorageError::not_found(alias)),
            Err(e) => Err(SecureStorageError::io(alias, e)),
        }
    }
}
