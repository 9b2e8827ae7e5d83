//! Persisted document model.
//!
//! One `AppState` exists per browser profile. It is serialized whole under
//! [`STORAGE_KEY`] after every mutation, so the field names here ARE the
//! storage format (camelCase, campaign keys upper-case).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// localStorage key holding the serialized `AppState`.
pub const STORAGE_KEY: &str = "arkham-gamebook-state";

/// Faces of the shared die.
pub const DIE_FACES: u8 = 6;

/// Die value shown before the first roll.
pub const DEFAULT_DIE: u8 = 1;

/// Highest star rating a completed run can carry.
pub const MAX_STARS: u8 = 4;

/// The two gamebook campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Campaign {
    #[serde(rename = "TDOA")]
    Tdoa,
    #[serde(rename = "TTOI")]
    Ttoi,
}

impl Campaign {
    pub const ALL: [Campaign; 2] = [Campaign::Tdoa, Campaign::Ttoi];

    /// Storage key / tab label.
    pub fn code(self) -> &'static str {
        match self {
            Campaign::Tdoa => "TDOA",
            Campaign::Ttoi => "TTOI",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Campaign::Tdoa => "The Darkness Over Arkham",
            Campaign::Ttoi => "The Tides of Innsmouth",
        }
    }
}

impl fmt::Display for Campaign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Campaign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TDOA" => Ok(Campaign::Tdoa),
            "TTOI" => Ok(Campaign::Ttoi),
            other => Err(format!("unknown campaign: {}", other)),
        }
    }
}

/// The eight counters on a character sheet. Unbounded; negative values are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub willpower: i64,
    pub intellect: i64,
    pub combat: i64,
    pub health: i64,
    pub sanity: i64,
    pub resources: i64,
    pub clues: i64,
    pub doom: i64,
}

/// Names one field of [`Attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Willpower,
    Intellect,
    Combat,
    Health,
    Sanity,
    Resources,
    Clues,
    Doom,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Willpower,
        Attribute::Intellect,
        Attribute::Combat,
        Attribute::Health,
        Attribute::Sanity,
        Attribute::Resources,
        Attribute::Clues,
        Attribute::Doom,
    ];

    /// Field name in the persisted document.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::Willpower => "willpower",
            Attribute::Intellect => "intellect",
            Attribute::Combat => "combat",
            Attribute::Health => "health",
            Attribute::Sanity => "sanity",
            Attribute::Resources => "resources",
            Attribute::Clues => "clues",
            Attribute::Doom => "doom",
        }
    }

    /// Abbreviation used in the collapsed attribute summary.
    pub fn short_label(self) -> &'static str {
        match self {
            Attribute::Willpower => "W",
            Attribute::Intellect => "I",
            Attribute::Combat => "C",
            Attribute::Health => "H",
            Attribute::Sanity => "S",
            Attribute::Resources => "R",
            Attribute::Clues => "Cl",
            Attribute::Doom => "D",
        }
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|a| a.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown attribute: {}", s))
    }
}

impl Attributes {
    pub fn get(&self, attribute: Attribute) -> i64 {
        match attribute {
            Attribute::Willpower => self.willpower,
            Attribute::Intellect => self.intellect,
            Attribute::Combat => self.combat,
            Attribute::Health => self.health,
            Attribute::Sanity => self.sanity,
            Attribute::Resources => self.resources,
            Attribute::Clues => self.clues,
            Attribute::Doom => self.doom,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i64) {
        let slot = match attribute {
            Attribute::Willpower => &mut self.willpower,
            Attribute::Intellect => &mut self.intellect,
            Attribute::Combat => &mut self.combat,
            Attribute::Health => &mut self.health,
            Attribute::Sanity => &mut self.sanity,
            Attribute::Resources => &mut self.resources,
            Attribute::Clues => &mut self.clues,
            Attribute::Doom => &mut self.doom,
        };
        *slot = value;
    }

    /// Compact one-line form, e.g. `W:3 I:2 C:1 H:5 S:4 R:0 Cl:1 D:0`.
    pub fn summary(&self) -> String {
        Attribute::ALL
            .iter()
            .map(|a| format!("{}:{}", a.short_label(), self.get(*a)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One character's sheet within a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterState {
    pub attributes: Attributes,
    pub abilities: Vec<String>,
    pub weaknesses: Vec<String>,
    pub items: Vec<String>,
    /// Secrets discovered during the current run.
    pub secrets: Vec<String>,
}

/// One of the name lists on a character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetList {
    Abilities,
    Weaknesses,
    Items,
    Secrets,
}

impl SheetList {
    pub fn key(self) -> &'static str {
        match self {
            SheetList::Abilities => "abilities",
            SheetList::Weaknesses => "weaknesses",
            SheetList::Items => "items",
            SheetList::Secrets => "secrets",
        }
    }

    pub fn of(self, sheet: &CharacterState) -> &[String] {
        match self {
            SheetList::Abilities => &sheet.abilities,
            SheetList::Weaknesses => &sheet.weaknesses,
            SheetList::Items => &sheet.items,
            SheetList::Secrets => &sheet.secrets,
        }
    }
}

impl FromStr for SheetList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abilities" => Ok(SheetList::Abilities),
            "weaknesses" => Ok(SheetList::Weaknesses),
            "items" => Ok(SheetList::Items),
            "secrets" => Ok(SheetList::Secrets),
            other => Err(format!("unknown list: {}", other)),
        }
    }
}

/// Archived play-through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletedRun {
    pub character_name: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub secrets: Vec<String>,
    pub stars: u8,
}

/// Per-campaign state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameState {
    /// Empty string means no character is active.
    pub current_character_name: String,
    pub characters: BTreeMap<String, CharacterState>,
    pub found_secrets: Vec<String>,
    /// Saved page number, 0 = unset.
    pub bookmark: u32,
    pub completed_runs: Vec<CompletedRun>,
}

impl GameState {
    /// The active character, if the pointer names an existing entry.
    pub fn active_character(&self) -> Option<(&str, &CharacterState)> {
        if self.current_character_name.is_empty() {
            return None;
        }
        self.characters
            .get_key_value(&self.current_character_name)
            .map(|(name, sheet)| (name.as_str(), sheet))
    }

    pub fn active_character_mut(&mut self) -> Option<&mut CharacterState> {
        if self.current_character_name.is_empty() {
            return None;
        }
        self.characters.get_mut(&self.current_character_name)
    }
}

/// Data shared by both campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SharedState {
    pub dice_roll: u8,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            dice_roll: DEFAULT_DIE,
        }
    }
}

/// Root document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    #[serde(rename = "TDOA")]
    pub tdoa: GameState,
    #[serde(rename = "TTOI")]
    pub ttoi: GameState,
    pub shared: SharedState,
}

impl AppState {
    pub fn game(&self, campaign: Campaign) -> &GameState {
        match campaign {
            Campaign::Tdoa => &self.tdoa,
            Campaign::Ttoi => &self.ttoi,
        }
    }

    pub fn game_mut(&mut self, campaign: Campaign) -> &mut GameState {
        match campaign {
            Campaign::Tdoa => &mut self.tdoa,
            Campaign::Ttoi => &mut self.ttoi,
        }
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
