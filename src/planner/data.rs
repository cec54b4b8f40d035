use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use bincode::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::planner::{
    normalize::RawDocument,
    window::{Granularity, ViewWindow},
};

/// Everything the CLI remembers between runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct State {
    pub window: ViewWindow,
    pub query: String,
    pub source: Option<PathBuf>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            window: ViewWindow::today(Granularity::Month),
            query: String::new(),
            source: None,
        }
    }
}

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open() -> Result<Self> {
        Ok(Self::at(
            dirs::data_local_dir()
                .ok_or_else(|| anyhow!("error: Failed to find user data directory"))?
                .join("planner"),
        ))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn read(&self) -> Result<State> {
        Ok(if let Ok(encoded) = fs::read(self.file()) {
            deserialize(&encoded).context("error: Saved planner state is corrupt")?
        } else {
            State::default()
        })
    }

    pub fn write(&self, state: &State) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.file(), serialize(state)?)?;
        Ok(())
    }

    fn file(&self) -> PathBuf {
        self.dir.join("state")
    }
}

/// Reads a JSON array of documents. Entries that don't deserialize are
/// skipped with a warning rather than failing the whole file.
pub fn load_documents(path: &Path) -> Result<Vec<RawDocument>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("error: Failed to read documents from {}", path.display()))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&text)
        .with_context(|| format!("error: {} is not a JSON array", path.display()))?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!(index = i, %err, "skipping malformed document");
                None
            }
        })
        .collect())
}
