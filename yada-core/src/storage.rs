//! On-disk storage for the catalog, logs, and profile.
//!
//! Everything lives in one data directory:
//! ```text
//! <DATA_DIR>/
//!   foods.txt      pipe-delimited food records
//!   logs.json      every day's log, keyed by date
//!   profile.json   body metrics and calorie method
//! ```
//!
//! Writes go to a temporary file first and are renamed into place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The files kept in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFile {
    Foods,
    Logs,
    Profile,
}

impl DataFile {
    pub fn filename(&self) -> &'static str {
        match self {
            DataFile::Foods => "foods.txt",
            DataFile::Logs => "logs.json",
            DataFile::Profile => "profile.json",
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Reads and writes the data files under one directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    data_dir: PathBuf,
}

impl DataStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, file: DataFile) -> PathBuf {
        self.data_dir.join(file.filename())
    }

    pub fn exists(&self, file: DataFile) -> bool {
        self.path(file).exists()
    }

    /// Reads a data file. Returns `Ok(None)` if it doesn't exist yet.
    pub fn read(&self, file: DataFile) -> Result<Option<String>, StorageError> {
        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Like [`DataStore::read`] but without requiring valid UTF-8.
    pub fn read_bytes(&self, file: DataFile) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path(file);
        match fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Replaces a data file with `content`, creating the data directory if
    /// needed.
    pub fn write(&self, file: DataFile, content: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| StorageError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let path = self.path(file);
        let temp_path = path.with_extension("tmp");
        let result = write_and_rename(&temp_path, &path, content.as_bytes());
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    /// Reads and deserializes a JSON data file.
    pub fn read_json<T: DeserializeOwned>(&self, file: DataFile) -> Result<Option<T>, StorageError> {
        let Some(content) = self.read(file)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::Parse {
                path: self.path(file),
                message: e.to_string(),
            })
    }

    /// Serializes `value` as pretty JSON and writes it.
    pub fn write_json<T: Serialize>(&self, file: DataFile, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(value).map_err(|e| StorageError::Parse {
            path: self.path(file),
            message: e.to_string(),
        })?;
        self.write(file, &content)
    }
}

fn write_and_rename(temp_path: &Path, path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let mut out = File::create(temp_path).map_err(io_err(temp_path))?;
    out.write_all(content).map_err(io_err(temp_path))?;
    out.sync_all().map_err(io_err(temp_path))?;
    drop(out);

    fs::rename(temp_path, path).map_err(io_err(path))
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { path, source }
}
