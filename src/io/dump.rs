//! Raw observation dumps.
//!
//! Each fetch writes the pre-normalization observations for the player to
//! `game_data_<display name>.json`, replacing the previous file. The dump is a
//! side artifact for offline inspection; nothing reads it back at runtime.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::Observation;
use crate::error::PersistError;

/// Somewhere raw observations can be recorded.
pub trait ObservationSink: Send + Sync {
    fn record(&self, player_name: &str, observations: &[Observation]) -> Result<(), PersistError>;
}

/// Writes one JSON array per player into a directory.
#[derive(Debug, Clone)]
pub struct JsonDumpStore {
    dir: PathBuf,
}

impl JsonDumpStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, player_name: &str) -> PathBuf {
        self.dir.join(format!("game_data_{}.json", file_stem(player_name)))
    }
}

impl ObservationSink for JsonDumpStore {
    fn record(&self, player_name: &str, observations: &[Observation]) -> Result<(), PersistError> {
        let path = self.path_for(player_name);
        write_dump(&self.dir, &path, observations).map_err(|source| PersistError {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), n = observations.len(), "wrote raw dump");
        Ok(())
    }
}

/// Discards everything. Used by the CLI when no dump is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ObservationSink for NullSink {
    fn record(&self, _player_name: &str, _observations: &[Observation]) -> Result<(), PersistError> {
        Ok(())
    }
}

fn write_dump(dir: &Path, path: &Path, observations: &[Observation]) -> std::io::Result<()> {
    create_dir_all(dir)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, observations)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Display names are user-controlled; keep them from escaping the dump dir.
fn file_stem(player_name: &str) -> String {
    let stem: String = player_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() { "unknown".to_string() } else { stem }
}
