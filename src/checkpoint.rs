use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Durable crawl cursor. `last_player == None` with `last_club` set means the
/// club completed; a set `last_player` means the club was interrupted midway.
/// Absence of the file means nothing is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub season: Option<String>,
    pub last_club: Option<String>,
    pub last_player: Option<String>,
}

impl Checkpoint {
    pub fn fresh(season: &str) -> Self {
        Self {
            season: Some(season.to_string()),
            last_club: None,
            last_player: None,
        }
    }
}

/// Single-slot JSON checkpoint file, overwritten wholesale on each save.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Last saved state, or the empty default when the file is missing or
    /// unreadable (a corrupt checkpoint restarts the season, it never aborts).
    pub fn load(&self) -> Checkpoint {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Checkpoint::default();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create checkpoint directory {}", parent.display()))?;
        }
        let json = serde_json::to_string(checkpoint).context("serialize checkpoint")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).context("write checkpoint")?;
        fs::rename(&tmp, &self.path).context("swap checkpoint")?;
        Ok(())
    }

    /// Delete the slot; called on full completion of a season's crawl.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("remove checkpoint"),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
