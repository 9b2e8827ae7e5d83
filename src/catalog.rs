//! Compiled-in reference catalogs: abilities, items, secrets and the
//! predefined investigators.
//!
//! The JSON under `data/` is embedded at build time and parsed once on first
//! use. Every lookup borrows from the single `'static` instance.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

use crate::game::state::{Attributes, Campaign, CharacterState, SheetList};

/// Characters typed before suggestions appear.
pub const SUGGEST_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub is_weakness: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub is_equipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Secret {
    pub name: String,
    pub campaign: Campaign,
}

/// A predefined investigator and the sheet a fresh run starts from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

impl CharacterProfile {
    /// Starting sheet for a new run. Secrets always start empty.
    pub fn starting_sheet(&self) -> CharacterState {
        CharacterState {
            attributes: self.attributes,
            abilities: self.abilities.clone(),
            weaknesses: self.weaknesses.clone(),
            items: self.items.clone(),
            secrets: Vec::new(),
        }
    }
}

/// Catalog record kinds that carry a description.
pub enum Entry<'a> {
    Ability(&'a Ability),
    Item(&'a Item),
    Secret(&'a Secret),
}

impl Entry<'_> {
    pub fn description(&self) -> Option<&str> {
        match self {
            Entry::Ability(a) => Some(&a.description),
            Entry::Item(i) => Some(&i.description),
            Entry::Secret(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    abilities: Vec<Ability>,
    items: Vec<Item>,
    secrets: Vec<Secret>,
    characters: Vec<CharacterProfile>,
    ability_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    secret_index: HashMap<String, usize>,
    character_index: HashMap<String, usize>,
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// The bundled catalog, parsed on first call.
pub fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(|| {
        Catalog::bundled().unwrap_or_else(|e| {
            warn!(error = %e, "bundled catalog failed to parse, lookups will be empty");
            Catalog::default()
        })
    })
}

fn index_by_name<T>(records: &[T], name: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (name(r).to_string(), i))
        .collect()
}

impl Catalog {
    fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(
            include_str!("../data/abilities.json"),
            include_str!("../data/items.json"),
            include_str!("../data/secrets.json"),
            include_str!("../data/characters.json"),
        )
    }

    pub fn from_json(
        abilities: &str,
        items: &str,
        secrets: &str,
        characters: &str,
    ) -> Result<Self, serde_json::Error> {
        let abilities: Vec<Ability> = serde_json::from_str(abilities)?;
        let items: Vec<Item> = serde_json::from_str(items)?;
        let secrets: Vec<Secret> = serde_json::from_str(secrets)?;
        let characters: Vec<CharacterProfile> = serde_json::from_str(characters)?;
        Ok(Self {
            ability_index: index_by_name(&abilities, |a| a.name.as_str()),
            item_index: index_by_name(&items, |i| i.name.as_str()),
            secret_index: index_by_name(&secrets, |s| s.name.as_str()),
            character_index: index_by_name(&characters, |c| c.name.as_str()),
            abilities,
            items,
            secrets,
            characters,
        })
    }

    pub fn ability(&self, name: &str) -> Option<&Ability> {
        self.ability_index.get(name).map(|&i| &self.abilities[i])
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.item_index.get(name).map(|&i| &self.items[i])
    }

    pub fn secret(&self, name: &str) -> Option<&Secret> {
        self.secret_index.get(name).map(|&i| &self.secrets[i])
    }

    pub fn character(&self, name: &str) -> Option<&CharacterProfile> {
        self.character_index.get(name).map(|&i| &self.characters[i])
    }

    pub fn characters(&self) -> &[CharacterProfile] {
        &self.characters
    }

    /// Look a sheet entry up in the catalog that backs its list.
    pub fn entry(&self, list: SheetList, name: &str) -> Option<Entry<'_>> {
        match list {
            SheetList::Abilities | SheetList::Weaknesses => self.ability(name).map(Entry::Ability),
            SheetList::Items => self.item(name).map(Entry::Item),
            SheetList::Secrets => self.secret(name).map(Entry::Secret),
        }
    }

    /// Text shown on the character picker.
    pub fn character_label(&self, name: &str) -> String {
        if name.is_empty() {
            return "Select Character".to_string();
        }
        match self.character(name) {
            Some(profile) => format!("{} - {}", profile.name, profile.description),
            None => name.to_string(),
        }
    }

    /// Autocomplete candidates for `list`: case-insensitive prefix match once
    /// at least [`SUGGEST_MIN_CHARS`] characters are typed, minus names already
    /// on the sheet.
    pub fn suggest(
        &self,
        list: SheetList,
        query: &str,
        selected: &[String],
        campaign: Campaign,
    ) -> Vec<&str> {
        if query.chars().count() < SUGGEST_MIN_CHARS {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let candidates: Box<dyn Iterator<Item = &str> + '_> = match list {
            SheetList::Abilities => Box::new(self.abilities.iter().map(|a| a.name.as_str())),
            SheetList::Weaknesses => Box::new(
                self.abilities
                    .iter()
                    .filter(|a| a.is_weakness)
                    .map(|a| a.name.as_str()),
            ),
            SheetList::Items => Box::new(self.items.iter().map(|i| i.name.as_str())),
            SheetList::Secrets => Box::new(
                self.secrets
                    .iter()
                    .filter(move |s| s.campaign == campaign)
                    .map(|s| s.name.as_str()),
            ),
        };
        candidates
            .filter(|name| name.to_lowercase().starts_with(&needle))
            .filter(|name| !selected.iter().any(|s| s == name))
            .collect()
    }
}
