//! The session's single writer.
//!
//! `Store` owns the canonical `AppState`, exposes the closed set of mutations
//! the UI can trigger, and writes the whole document back to storage after
//! each one. Memory is authoritative: a failed write is reported as
//! [`Persist::Failed`] and the next successful write carries every change.

use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::game::migrate;
use crate::game::platform::{self, Platform};
use crate::game::state::{
    AppState, Attribute, Campaign, CharacterState, CompletedRun, DIE_FACES, GameState,
    MAX_STARS, STORAGE_KEY, SheetList,
};
use crate::game::storage::{Storage, StorageError};

/// How `select_character` treats an existing sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Start a fresh run from the catalog profile, replacing any saved sheet.
    Restart,
    /// Resume the saved sheet untouched.
    Load,
}

impl FromStr for SelectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restart" => Ok(SelectMode::Restart),
            "load" => Ok(SelectMode::Load),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Result of the storage write that follows a mutation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persist {
    Saved,
    /// The call was a no-op; nothing was written.
    Unchanged,
    /// Memory was updated but storage refused the write.
    Failed(StorageError),
}

impl Persist {
    pub fn warning(&self) -> Option<&StorageError> {
        match self {
            Persist::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid state JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("state JSON must be an object")]
    NotAnObject,
}

pub struct Store {
    state: AppState,
    active: Campaign,
    storage: Box<dyn Storage>,
    platform: Box<dyn Platform>,
    catalog: &'static Catalog,
}

impl Store {
    /// Read and migrate whatever is stored under [`STORAGE_KEY`].
    pub fn open(
        storage: Box<dyn Storage>,
        platform: Box<dyn Platform>,
        catalog: &'static Catalog,
    ) -> Self {
        let raw = storage.get_item(STORAGE_KEY);
        let state = migrate::migrate(raw.as_deref());
        info!(
            stored = raw.is_some(),
            tdoa_characters = state.tdoa.characters.len(),
            ttoi_characters = state.ttoi.characters.len(),
            "store opened"
        );
        Self {
            state,
            active: Campaign::Tdoa,
            storage,
            platform,
            catalog,
        }
    }

    // ── Reads ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn active_campaign(&self) -> Campaign {
        self.active
    }

    /// State of the active campaign.
    pub fn game(&self) -> &GameState {
        self.state.game(self.active)
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn export_json(&self) -> String {
        self.state.to_json()
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Switch the campaign that reads and campaign-scoped mutations target.
    pub fn select_campaign(&mut self, campaign: Campaign) {
        debug!(%campaign, "campaign selected");
        self.active = campaign;
    }

    pub fn roll_die(&mut self) -> Persist {
        let face = platform::die_face(self.platform.random_unit(), DIE_FACES);
        debug!(face, "die rolled");
        self.state.shared.dice_roll = face;
        self.persist()
    }

    /// Make `name` the active character of the current campaign.
    ///
    /// `Load` of a character with no saved sheet starts a fresh run instead.
    pub fn select_character(&mut self, name: &str, mode: SelectMode) -> Persist {
        if name.is_empty() {
            return Persist::Unchanged;
        }
        let game = self.state.game_mut(self.active);
        let saved = game.characters.contains_key(name);

        if mode == SelectMode::Restart || !saved {
            let sheet = self
                .catalog
                .character(name)
                .map(|profile| profile.starting_sheet())
                .unwrap_or_default();
            debug!(name, ?mode, saved, "starting fresh run");
            game.characters.insert(name.to_string(), sheet);
        } else {
            debug!(name, "loading saved character");
        }
        game.current_character_name = name.to_string();
        self.persist()
    }

    pub fn set_attribute(&mut self, attribute: Attribute, value: i64) -> Persist {
        self.update_active_character(|sheet| sheet.attributes.set(attribute, value))
    }

    pub fn set_items(&mut self, names: Vec<String>) -> Persist {
        self.set_list(SheetList::Items, names)
    }

    pub fn set_abilities(&mut self, names: Vec<String>) -> Persist {
        self.set_list(SheetList::Abilities, names)
    }

    pub fn set_weaknesses(&mut self, names: Vec<String>) -> Persist {
        self.set_list(SheetList::Weaknesses, names)
    }

    pub fn set_character_secrets(&mut self, names: Vec<String>) -> Persist {
        self.set_list(SheetList::Secrets, names)
    }

    /// Replace one list on the active sheet wholesale. Callers keep names unique.
    pub fn set_list(&mut self, list: SheetList, names: Vec<String>) -> Persist {
        self.update_active_character(move |sheet| {
            let target = match list {
                SheetList::Abilities => &mut sheet.abilities,
                SheetList::Weaknesses => &mut sheet.weaknesses,
                SheetList::Items => &mut sheet.items,
                SheetList::Secrets => &mut sheet.secrets,
            };
            *target = names;
        })
    }

    /// Save a page number. Negative pages are rejected.
    pub fn set_bookmark(&mut self, page: i64) -> Persist {
        let Ok(page) = u32::try_from(page) else {
            debug!(page, "bookmark rejected");
            return Persist::Unchanged;
        };
        self.state.game_mut(self.active).bookmark = page;
        self.persist()
    }

    /// Archive the active character's run.
    ///
    /// Removes the sheet, clears the active pointer, folds the run's secrets
    /// into `foundSecrets` and appends a [`CompletedRun`]. Without an active
    /// character nothing changes.
    pub fn finish_run(&mut self, stars: u8) -> Persist {
        let now = self.platform.now_millis();
        let game = self.state.game_mut(self.active);
        let name = std::mem::take(&mut game.current_character_name);
        let Some(sheet) = game.characters.remove(&name) else {
            game.current_character_name = name;
            return Persist::Unchanged;
        };

        for secret in &sheet.secrets {
            if !game.found_secrets.contains(secret) {
                game.found_secrets.push(secret.clone());
            }
        }
        let stars = stars.min(MAX_STARS);
        info!(name = %name, stars, secrets = sheet.secrets.len(), "run finished");
        game.completed_runs.push(CompletedRun {
            character_name: name,
            timestamp: now,
            secrets: sheet.secrets,
            stars,
        });
        self.persist()
    }

    /// Forget every found secret in the active campaign. Run history stays.
    pub fn clear_found_secrets(&mut self) -> Persist {
        self.state.game_mut(self.active).found_secrets.clear();
        self.persist()
    }

    /// Replace the whole document with a migrated import.
    pub fn import_json(&mut self, raw: &str) -> Result<Persist, ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(ImportError::NotAnObject);
        }
        self.state = migrate::migrate_value(&value);
        info!("state imported");
        Ok(self.persist())
    }

    // ── Internals ──────────────────────────────────────────────────

    fn update_active_character<F>(&mut self, f: F) -> Persist
    where
        F: FnOnce(&mut CharacterState),
    {
        match self.state.game_mut(self.active).active_character_mut() {
            Some(sheet) => {
                f(sheet);
                self.persist()
            }
            None => Persist::Unchanged,
        }
    }

    fn persist(&mut self) -> Persist {
        let json = self.state.to_json();
        match self.storage.set_item(STORAGE_KEY, &json) {
            Ok(()) => Persist::Saved,
            Err(e) => {
                warn!(error = %e, bytes = json.len(), "state write failed, keeping in-memory state");
                Persist::Failed(e)
            }
        }
    }
}
