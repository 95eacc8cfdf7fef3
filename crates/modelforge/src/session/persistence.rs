//! Persistence for build sessions - save/load JSON files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{ModelForgeError, Result};

use super::session::ModelBuilderSession;

/// A directory of session files, one pretty-printed JSON file per session id.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file backing a session id.
    pub fn session_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Save a session, creating the store directory if needed.
    pub fn save(&self, session: &ModelBuilderSession) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|e| {
                ModelForgeError::Persistence(format!(
                    "Failed to create session directory '{}': {}",
                    self.root.display(),
                    e
                ))
            })?;
        }

        let path = self.session_path(&session.id);
        let file = File::create(&path).map_err(|e| {
            ModelForgeError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, session).map_err(|e| {
            ModelForgeError::Persistence(format!("Failed to serialize session: {}", e))
        })?;

        Ok(())
    }

    /// Load a session by id. An unknown id is a [`ModelForgeError::Session`]
    /// error; I/O and parse failures stay `Persistence`.
    pub fn load(&self, id: &str) -> Result<ModelBuilderSession> {
        let path = self.session_path(id);

        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelForgeError::Session(format!("no session with id '{}'", id))
            } else {
                ModelForgeError::Persistence(format!(
                    "Failed to open session '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let reader = BufReader::new(file);
        let session: ModelBuilderSession = serde_json::from_reader(reader).map_err(|e| {
            ModelForgeError::Persistence(format!(
                "Failed to parse session '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(session)
    }

    /// List stored session ids, sorted, skipping files that are not
    /// `<id>.json`.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            ModelForgeError::Persistence(format!(
                "Failed to read session directory '{}': {}",
                self.root.display(),
                e
            ))
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect();

        ids.sort();
        Ok(ids)
    }

    /// Delete a stored session.
    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.session_path(id);
        fs::remove_file(&path).map_err(|e| {
            ModelForgeError::Persistence(format!(
                "Failed to delete session '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
