use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::Card;

/// Key under which the cards selected for printing are handed to the export
/// step.
pub const PRINT_CARDS_KEY: &str = "printCards";

/// Short-lived key/value hand-off between commands: one JSON file per key in
/// a session directory. Values are read at most once.
#[derive(Clone, Debug)]
pub struct HandoffStore {
    dir: PathBuf,
}

impl HandoffStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HandoffStore { dir: dir.into() }
    }

    /// Store in the system temp directory, namespaced by `CARDSHEET_SESSION`
    /// (default `default`).
    pub fn session() -> Self {
        let session = std::env::var("CARDSHEET_SESSION").unwrap_or_else(|_| "default".into());
        HandoffStore::new(std::env::temp_dir().join(format!("cardsheet-{session}")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    pub fn stash(&self, key: &str, cards: &[Card]) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(cards)?;
        std::fs::write(self.path_for(key), json)?;
        log::debug!("Stashed {} card(s) under '{key}'", cards.len());
        Ok(())
    }

    /// Read and remove the cards under `key`. A missing, unreadable, or
    /// corrupt entry yields an empty list.
    pub fn take(&self, key: &str) -> Vec<Card> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read hand-off entry '{key}': {e}");
                return Vec::new();
            }
        };
        if let Err(e) = std::fs::remove_file(&path) {
            log::warn!("Could not remove hand-off entry '{key}': {e}");
        }
        match serde_json::from_slice::<Vec<Card>>(&bytes) {
            Ok(cards) => cards,
            Err(e) => {
                log::warn!("Discarding corrupt hand-off entry '{key}': {e}");
                Vec::new()
            }
        }
    }

    pub fn stash_print_cards(&self, cards: &[Card]) -> Result<(), Error> {
        self.stash(PRINT_CARDS_KEY, cards)
    }

    pub fn take_print_cards(&self) -> Vec<Card> {
        self.take(PRINT_CARDS_KEY)
    }
}
