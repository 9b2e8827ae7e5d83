//! Schema migration: turns whatever sits in localStorage into a current `AppState`.
//!
//! The stored document went through four shapes. Each campaign object is
//! probed newest-first and decoded into the matching [`CampaignGeneration`]
//! variant, which is then normalized into the current [`GameState`]:
//!
//! ```text
//! RunHistory     { currentCharacterName, characters, foundSecrets, bookmark, completedRuns }
//! FoundSecrets   { currentCharacterName, characters, foundSecrets }
//! CharacterMap   { currentCharacterName, characters }            + shared.diceRoll
//! Flat           { characterName, diceRoll, attributes, abilities?, weaknesses?, items, secrets? }
//! ```
//!
//! Migration never fails. Every field is decoded leniently: wrong types fall
//! back to the field default instead of rejecting the whole document, and an
//! unparseable document yields `AppState::default()`.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::game::state::{
    AppState, Attribute, Attributes, Campaign, CharacterState, CompletedRun, DEFAULT_DIE,
    DIE_FACES, GameState, MAX_STARS,
};

/// Migrate the raw stored string (`None` when the key is absent).
pub fn migrate(raw: Option<&str>) -> AppState {
    let Some(raw) = raw else {
        debug!("no stored document, starting from defaults");
        return AppState::default();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => migrate_value(&value),
        Err(e) => {
            warn!(error = %e, "stored document is not valid JSON, starting from defaults");
            AppState::default()
        }
    }
}

/// Migrate an already-parsed document.
pub fn migrate_value(root: &Value) -> AppState {
    let Some(root) = root.as_object() else {
        if !root.is_null() {
            warn!("stored document is not an object, starting from defaults");
        }
        return AppState::default();
    };

    let mut state = AppState::default();
    let mut flat_die = None;

    for campaign in Campaign::ALL {
        let generation = CampaignGeneration::detect(campaign, root.get(campaign.code()));
        debug!(%campaign, generation = generation.label(), "migrating campaign");
        let (game, die) = generation.normalize();
        flat_die = flat_die.or(die);
        *state.game_mut(campaign) = game;
    }

    let shared_die = root
        .get("shared")
        .and_then(|shared| shared.get("diceRoll"))
        .and_then(die_face);
    state.shared.dice_roll = shared_die.or(flat_die).unwrap_or(DEFAULT_DIE);

    state
}

// ── Generations ────────────────────────────────────────────────────

/// One historical shape of a per-campaign object.
#[derive(Debug)]
enum CampaignGeneration {
    RunHistory(RunHistoryCampaign),
    FoundSecrets(FoundSecretsCampaign),
    CharacterMap(CharacterMapCampaign),
    Flat(FlatCampaign),
    Unrecognized,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunHistoryCampaign {
    #[serde(default, deserialize_with = "lenient::string")]
    current_character_name: String,
    #[serde(default, deserialize_with = "lenient::characters")]
    characters: BTreeMap<String, CharacterState>,
    #[serde(default, deserialize_with = "lenient::names")]
    found_secrets: Vec<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    bookmark: Option<i64>,
    #[serde(default, deserialize_with = "lenient::runs")]
    completed_runs: Vec<CompletedRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoundSecretsCampaign {
    #[serde(default, deserialize_with = "lenient::string")]
    current_character_name: String,
    #[serde(default, deserialize_with = "lenient::characters")]
    characters: BTreeMap<String, CharacterState>,
    #[serde(default, deserialize_with = "lenient::names")]
    found_secrets: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterMapCampaign {
    #[serde(default, deserialize_with = "lenient::string")]
    current_character_name: String,
    #[serde(default, deserialize_with = "lenient::characters")]
    characters: BTreeMap<String, CharacterState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatCampaign {
    #[serde(default, deserialize_with = "lenient::string")]
    character_name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    dice_roll: Option<i64>,
    #[serde(flatten)]
    sheet: SheetRecord,
}

/// Character sheet fields as they appear in any generation.
#[derive(Debug, Default, Deserialize)]
struct SheetRecord {
    #[serde(default, deserialize_with = "lenient::attributes")]
    attributes: Attributes,
    #[serde(default, deserialize_with = "lenient::names")]
    abilities: Vec<String>,
    #[serde(default, deserialize_with = "lenient::names")]
    weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient::names")]
    items: Vec<String>,
    #[serde(default, deserialize_with = "lenient::names")]
    secrets: Vec<String>,
}

impl From<SheetRecord> for CharacterState {
    fn from(sheet: SheetRecord) -> Self {
        CharacterState {
            attributes: sheet.attributes,
            abilities: sheet.abilities,
            weaknesses: sheet.weaknesses,
            items: sheet.items,
            secrets: sheet.secrets,
        }
    }
}

impl CampaignGeneration {
    /// Probe for fields unique to each generation, newest first.
    fn detect(campaign: Campaign, value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return CampaignGeneration::Unrecognized;
        };
        let Some(map) = value.as_object() else {
            warn!(%campaign, "campaign entry is not an object, using defaults");
            return CampaignGeneration::Unrecognized;
        };

        let decoded = if has_any(map, &["bookmark", "completedRuns"]) {
            RunHistoryCampaign::deserialize(value).map(CampaignGeneration::RunHistory)
        } else if has_any(map, &["foundSecrets"]) {
            FoundSecretsCampaign::deserialize(value).map(CampaignGeneration::FoundSecrets)
        } else if has_any(map, &["characters"]) {
            CharacterMapCampaign::deserialize(value).map(CampaignGeneration::CharacterMap)
        } else if has_any(map, &["characterName", "diceRoll"]) {
            FlatCampaign::deserialize(value).map(CampaignGeneration::Flat)
        } else {
            Ok(CampaignGeneration::Unrecognized)
        };

        decoded.unwrap_or_else(|e| {
            warn!(%campaign, error = %e, "campaign entry could not be decoded, using defaults");
            CampaignGeneration::Unrecognized
        })
    }

    fn label(&self) -> &'static str {
        match self {
            CampaignGeneration::RunHistory(_) => "run-history",
            CampaignGeneration::FoundSecrets(_) => "found-secrets",
            CampaignGeneration::CharacterMap(_) => "character-map",
            CampaignGeneration::Flat(_) => "flat",
            CampaignGeneration::Unrecognized => "unrecognized",
        }
    }

    /// Convert into the current shape. The second value is the die face carried
    /// by the flat generation, which predates `shared.diceRoll`.
    fn normalize(self) -> (GameState, Option<u8>) {
        match self {
            CampaignGeneration::RunHistory(c) => {
                let bookmark = c
                    .bookmark
                    .and_then(|page| u32::try_from(page).ok())
                    .unwrap_or(0);
                let game = GameState {
                    current_character_name: c.current_character_name,
                    characters: c.characters,
                    found_secrets: c.found_secrets,
                    bookmark,
                    completed_runs: c.completed_runs,
                };
                (settle(game), None)
            }
            CampaignGeneration::FoundSecrets(c) => {
                let game = GameState {
                    current_character_name: c.current_character_name,
                    characters: c.characters,
                    found_secrets: c.found_secrets,
                    ..GameState::default()
                };
                (settle(game), None)
            }
            CampaignGeneration::CharacterMap(c) => {
                let game = GameState {
                    current_character_name: c.current_character_name,
                    characters: c.characters,
                    ..GameState::default()
                };
                (settle(game), None)
            }
            CampaignGeneration::Flat(c) => {
                let die = c.dice_roll.and_then(face_from_int);
                if c.character_name.is_empty() {
                    return (GameState::default(), die);
                }
                let mut game = GameState {
                    current_character_name: c.character_name.clone(),
                    ..GameState::default()
                };
                game.characters.insert(c.character_name, c.sheet.into());
                (game, die)
            }
            CampaignGeneration::Unrecognized => (GameState::default(), None),
        }
    }
}

/// Drop an active-character pointer that names no stored sheet.
fn settle(mut game: GameState) -> GameState {
    if !game.current_character_name.is_empty()
        && !game.characters.contains_key(&game.current_character_name)
    {
        debug!(
            name = %game.current_character_name,
            "active character has no sheet, clearing pointer"
        );
        game.current_character_name.clear();
    }
    game
}

fn has_any(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|k| map.contains_key(*k))
}

fn die_face(value: &Value) -> Option<u8> {
    lenient::int_from(value).and_then(face_from_int)
}

fn face_from_int(n: i64) -> Option<u8> {
    u8::try_from(n)
        .ok()
        .filter(|face| (1..=DIE_FACES).contains(face))
}

// ── Lenient field decoders ─────────────────────────────────────────

mod lenient {
    use super::*;
    use serde::Deserializer;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(int_from(&Value::deserialize(d)?))
    }

    pub fn names<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(names_from(&Value::deserialize(d)?))
    }

    pub fn attributes<'de, D: Deserializer<'de>>(d: D) -> Result<Attributes, D::Error> {
        Ok(attributes_from(&Value::deserialize(d)?))
    }

    pub fn characters<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, CharacterState>, D::Error> {
        let value = Value::deserialize(d)?;
        let Some(map) = value.as_object() else {
            return Ok(BTreeMap::new());
        };
        Ok(map
            .iter()
            .map(|(name, sheet)| (name.clone(), sheet_from(sheet)))
            .collect())
    }

    pub fn runs<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<CompletedRun>, D::Error> {
        let value = Value::deserialize(d)?;
        let Some(entries) = value.as_array() else {
            return Ok(Vec::new());
        };
        Ok(entries.iter().filter_map(run_from).collect())
    }

    /// Integers, finite floats (truncated) and numeric strings.
    pub fn int_from(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String entries of an array, first occurrence wins.
    pub fn names_from(value: &Value) -> Vec<String> {
        let Some(entries) = value.as_array() else {
            return Vec::new();
        };
        let mut out: Vec<String> = Vec::with_capacity(entries.len());
        for name in entries.iter().filter_map(Value::as_str) {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        out
    }

    /// `agility` was renamed to `resources`; it only counts when `resources` is absent.
    pub fn attributes_from(value: &Value) -> Attributes {
        let mut attrs = Attributes::default();
        let Some(map) = value.as_object() else {
            return attrs;
        };
        for attribute in Attribute::ALL {
            if let Some(n) = map.get(attribute.key()).and_then(int_from) {
                attrs.set(attribute, n);
            }
        }
        if !map.contains_key("resources") {
            if let Some(agility) = map.get("agility").and_then(int_from) {
                attrs.resources = agility;
            }
        }
        attrs
    }

    fn sheet_from(value: &Value) -> CharacterState {
        if !value.is_object() {
            return CharacterState::default();
        }
        SheetRecord::deserialize(value)
            .map(CharacterState::from)
            .unwrap_or_default()
    }

    fn run_from(value: &Value) -> Option<CompletedRun> {
        let map = value.as_object()?;
        let stars = map
            .get("stars")
            .and_then(int_from)
            .unwrap_or(0)
            .clamp(0, i64::from(MAX_STARS)) as u8;
        Some(CompletedRun {
            character_name: map
                .get("characterName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: map.get("timestamp").and_then(int_from).unwrap_or(0),
            secrets: map.get("secrets").map(names_from).unwrap_or_default(),
            stars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn migrate_json(value: Value) -> AppState {
        migrate(Some(&value.to_string()))
    }

    fn rich_state() -> AppState {
        let mut state = AppState::default();
        state.shared.dice_roll = 5;

        let sheet = CharacterState {
            attributes: Attributes {
                willpower: 3,
                intellect: 4,
                combat: 2,
                health: 6,
                sanity: 7,
                resources: 1,
                clues: 0,
                doom: -1,
            },
            abilities: vec!["Psychic Sensitivity".to_string()],
            weaknesses: vec!["Amnesia".to_string()],
            items: vec!["Arcane Tome".to_string(), "Flashlight".to_string()],
            secrets: vec!["The Witch House".to_string()],
        };
        state.tdoa.characters.insert("Agnes Baker".to_string(), sheet);
        state.tdoa.characters.insert("Roland Banks".to_string(), CharacterState::default());
        state.tdoa.current_character_name = "Agnes Baker".to_string();
        state.tdoa.found_secrets = vec!["The Silver Twilight Lodge".to_string()];
        state.tdoa.bookmark = 112;
        state.tdoa.completed_runs.push(CompletedRun {
            character_name: "Daisy Walker".to_string(),
            timestamp: 1_717_171_717_000,
            secrets: vec!["The Silver Twilight Lodge".to_string()],
            stars: 4,
        });
        state.ttoi.found_secrets = vec!["The Esoteric Order".to_string()];
        state
    }

    // ── Absent / malformed input ───────────────────────────────────

    #[test]
    fn absent_document_yields_defaults() {
        assert_eq!(migrate(None), AppState::default());
    }

    #[test]
    fn unparseable_document_yields_defaults() {
        assert_eq!(migrate(Some("not valid json {{{")), AppState::default());
        assert_eq!(migrate(Some("")), AppState::default());
    }

    #[test]
    fn non_object_document_yields_defaults() {
        assert_eq!(migrate(Some("null")), AppState::default());
        assert_eq!(migrate(Some("[1,2,3]")), AppState::default());
        assert_eq!(migrate(Some("\"TDOA\"")), AppState::default());
    }

    #[test]
    fn unrecognized_campaign_shapes_yield_defaults() {
        let state = migrate_json(json!({ "TDOA": { "something": 1 }, "TTOI": 7 }));
        assert_eq!(state, AppState::default());
    }

    // ── Agility ────────────────────────────────────────────────────

    #[test]
    fn agility_carries_into_resources() {
        let state = migrate_json(json!({
            "TDOA": { "characterName": "Zoey", "diceRoll": 2, "attributes": { "agility": 3 } }
        }));
        let sheet = &state.tdoa.characters["Zoey"];
        assert_eq!(sheet.attributes.resources, 3);
        assert!(!state.to_json().contains("agility"));
    }

    #[test]
    fn resources_wins_over_agility() {
        let state = migrate_json(json!({
            "TDOA": {
                "characters": { "Zoey": { "attributes": { "agility": 3, "resources": 5 } } },
                "currentCharacterName": "Zoey"
            }
        }));
        assert_eq!(state.tdoa.characters["Zoey"].attributes.resources, 5);
        assert!(!state.to_json().contains("agility"));
    }

    #[test]
    fn attributes_default_per_field() {
        let attrs = lenient::attributes_from(&json!({ "health": 4, "sanity": "x" }));
        assert_eq!(attrs.health, 4);
        assert_eq!(attrs.sanity, 0);
        assert_eq!(attrs.willpower, 0);
        assert_eq!(lenient::attributes_from(&json!("nope")), Attributes::default());
    }

    // ── Flat generation ────────────────────────────────────────────

    #[test]
    fn flat_campaign_becomes_character_map() {
        let state = migrate_json(json!({
            "TDOA": {
                "characterName": "Alice",
                "diceRoll": 4,
                "attributes": { "willpower": 2, "combat": 1, "agility": 1 },
                "items": ["Knife"]
            }
        }));

        assert_eq!(state.tdoa.current_character_name, "Alice");
        let sheet = &state.tdoa.characters["Alice"];
        assert_eq!(sheet.attributes.willpower, 2);
        assert_eq!(sheet.attributes.combat, 1);
        assert_eq!(sheet.attributes.resources, 1);
        assert_eq!(sheet.items, vec!["Knife".to_string()]);
        assert!(sheet.abilities.is_empty());
        assert!(sheet.secrets.is_empty());
        assert_eq!(state.shared.dice_roll, 4);
        assert_eq!(state.ttoi, GameState::default());
    }

    #[test]
    fn flat_campaign_with_empty_name_has_no_characters() {
        let state = migrate_json(json!({
            "TDOA": { "characterName": "", "diceRoll": 6, "attributes": {}, "items": ["Knife"] }
        }));
        assert!(state.tdoa.characters.is_empty());
        assert!(state.tdoa.current_character_name.is_empty());
        assert_eq!(state.shared.dice_roll, 6);
    }

    #[test]
    fn flat_campaign_keeps_abilities_weaknesses_and_secrets() {
        let state = migrate_json(json!({
            "TTOI": {
                "characterName": "Silas",
                "diceRoll": 1,
                "abilities": ["Sea Legs"],
                "weaknesses": ["Drowned Memories"],
                "secrets": ["The Devil Reef"]
            }
        }));
        let sheet = &state.ttoi.characters["Silas"];
        assert_eq!(sheet.abilities, vec!["Sea Legs".to_string()]);
        assert_eq!(sheet.weaknesses, vec!["Drowned Memories".to_string()]);
        assert_eq!(sheet.secrets, vec!["The Devil Reef".to_string()]);
    }

    #[test]
    fn flat_die_prefers_first_campaign_with_valid_face() {
        let state = migrate_json(json!({
            "TDOA": { "characterName": "", "diceRoll": 0 },
            "TTOI": { "characterName": "", "diceRoll": 3 }
        }));
        assert_eq!(state.shared.dice_roll, 3);
    }

    #[test]
    fn shared_die_wins_over_flat_die() {
        let state = migrate_json(json!({
            "TDOA": { "characterName": "", "diceRoll": 2 },
            "shared": { "diceRoll": 5 }
        }));
        assert_eq!(state.shared.dice_roll, 5);
    }

    #[test]
    fn out_of_range_die_resets_to_default() {
        let state = migrate_json(json!({ "shared": { "diceRoll": 9 } }));
        assert_eq!(state.shared.dice_roll, DEFAULT_DIE);
    }

    // ── Map generations ────────────────────────────────────────────

    #[test]
    fn character_map_generation_gets_empty_history() {
        let state = migrate_json(json!({
            "TDOA": {
                "currentCharacterName": "Roland",
                "characters": {
                    "Roland": { "attributes": { "combat": 4 }, "items": [".38 Special"] }
                }
            },
            "shared": { "diceRoll": 2 }
        }));
        assert_eq!(state.tdoa.current_character_name, "Roland");
        let sheet = &state.tdoa.characters["Roland"];
        assert_eq!(sheet.attributes.combat, 4);
        assert!(sheet.secrets.is_empty());
        assert!(state.tdoa.found_secrets.is_empty());
        assert_eq!(state.tdoa.bookmark, 0);
        assert!(state.tdoa.completed_runs.is_empty());
        assert_eq!(state.shared.dice_roll, 2);
    }

    #[test]
    fn found_secrets_generation_keeps_secrets() {
        let state = migrate_json(json!({
            "TTOI": {
                "currentCharacterName": "",
                "characters": {},
                "foundSecrets": ["The Esoteric Order", "The Esoteric Order", 7]
            }
        }));
        assert_eq!(state.ttoi.found_secrets, vec!["The Esoteric Order".to_string()]);
        assert!(state.ttoi.completed_runs.is_empty());
    }

    #[test]
    fn run_history_generation_normalizes_entries() {
        let state = migrate_json(json!({
            "TDOA": {
                "bookmark": -5,
                "completedRuns": [
                    { "characterName": "Daisy", "timestamp": 10, "secrets": ["A"], "stars": 9 },
                    "garbage",
                    { "characterName": "Roland", "stars": -1 }
                ]
            }
        }));
        assert_eq!(state.tdoa.bookmark, 0);
        assert_eq!(state.tdoa.completed_runs.len(), 2);
        assert_eq!(state.tdoa.completed_runs[0].stars, MAX_STARS);
        assert_eq!(state.tdoa.completed_runs[0].secrets, vec!["A".to_string()]);
        assert_eq!(state.tdoa.completed_runs[1].stars, 0);
        assert_eq!(state.tdoa.completed_runs[1].timestamp, 0);
    }

    #[test]
    fn bookmark_alone_marks_newest_generation() {
        let state = migrate_json(json!({ "TTOI": { "bookmark": 42 } }));
        assert_eq!(state.ttoi.bookmark, 42);
    }

    #[test]
    fn dangling_active_character_is_cleared() {
        let state = migrate_json(json!({
            "TDOA": { "currentCharacterName": "Nobody", "characters": {} }
        }));
        assert!(state.tdoa.current_character_name.is_empty());
    }

    #[test]
    fn wrong_typed_fields_fall_back_to_defaults() {
        let state = migrate_json(json!({
            "TDOA": {
                "currentCharacterName": 12,
                "characters": { "Agnes": { "items": "Tome", "abilities": null } },
                "foundSecrets": "all of them",
                "bookmark": "7",
                "completedRuns": {}
            }
        }));
        assert!(state.tdoa.current_character_name.is_empty());
        assert!(state.tdoa.characters["Agnes"].items.is_empty());
        assert!(state.tdoa.found_secrets.is_empty());
        assert_eq!(state.tdoa.bookmark, 7);
        assert!(state.tdoa.completed_runs.is_empty());
    }

    // ── Defaulting completeness ────────────────────────────────────

    #[test]
    fn output_always_carries_every_field() {
        let inputs = [
            json!({}),
            json!({ "TDOA": { "characterName": "Alice", "diceRoll": 4 } }),
            json!({ "TTOI": { "characters": { "Bob": {} } } }),
        ];
        for input in inputs {
            let out: Value = serde_json::from_str(&migrate_json(input).to_json()).unwrap();
            for campaign in ["TDOA", "TTOI"] {
                let game = &out[campaign];
                for key in [
                    "currentCharacterName",
                    "characters",
                    "foundSecrets",
                    "bookmark",
                    "completedRuns",
                ] {
                    assert!(
                        game.get(key).is_some_and(|v| !v.is_null()),
                        "{campaign}.{key} missing"
                    );
                }
                if let Some(characters) = game["characters"].as_object() {
                    for sheet in characters.values() {
                        for key in ["attributes", "abilities", "weaknesses", "items", "secrets"] {
                            assert!(sheet.get(key).is_some_and(|v| !v.is_null()));
                        }
                        for attribute in Attribute::ALL {
                            assert!(sheet["attributes"][attribute.key()].is_i64());
                        }
                    }
                }
            }
            assert!(out["shared"]["diceRoll"].is_u64());
        }
    }

    // ── Idempotence / round-trip ───────────────────────────────────

    #[test]
    fn migration_is_idempotent() {
        let inputs: Vec<Option<String>> = vec![
            None,
            Some("garbage".to_string()),
            Some(json!({}).to_string()),
            Some(
                json!({
                    "TDOA": {
                        "characterName": "Alice",
                        "diceRoll": 4,
                        "attributes": { "agility": 3 },
                        "items": ["Knife", "Knife"]
                    },
                    "TTOI": { "currentCharacterName": "Ghost", "characters": {} }
                })
                .to_string(),
            ),
            Some(rich_state().to_json()),
        ];

        for raw in inputs {
            let once = migrate(raw.as_deref());
            let twice = migrate(Some(&once.to_json()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn empty_list_entries_survive_round_trip() {
        let mut state = rich_state();
        state.tdoa.found_secrets.push(String::new());
        if let Some(sheet) = state.tdoa.characters.get_mut("Roland Banks") {
            sheet.items = vec![String::new(), "Knife".to_string()];
        }
        assert_eq!(migrate(Some(&state.to_json())), state);

        let collapsed = lenient::names_from(&json!(["", "A", "", "A"]));
        assert_eq!(collapsed, vec![String::new(), "A".to_string()]);
    }

    #[test]
    fn valid_state_round_trips() {
        let state = rich_state();
        assert_eq!(migrate(Some(&state.to_json())), state);
    }
    #[cfg(not(target_arch = "wasm32"))]
    mod properties {
        use super::*;
        use proptest::prelude::*;

        const KEYS: &[&str] = &[
            "characterName",
            "currentCharacterName",
            "diceRoll",
            "characters",
            "foundSecrets",
            "bookmark",
            "completedRuns",
            "attributes",
            "agility",
            "resources",
            "abilities",
            "weaknesses",
            "items",
            "secrets",
            "stars",
            "timestamp",
            "Alice",
            "",
        ];

        fn scalar() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                any::<i64>().prop_map(Value::from),
                (-1.0e6_f64..1.0e6).prop_map(Value::from),
                (0_i64..8).prop_map(Value::from),
                "[A-Za-z ]{0,6}".prop_map(Value::from),
                prop::sample::select(vec!["3", "-1", "4.5", "NaN"]).prop_map(Value::from),
            ]
        }

        fn key() -> impl Strategy<Value = String> {
            prop::sample::select(KEYS).prop_map(str::to_string)
        }

        /// Arbitrary JSON mixing the field names of every generation.
        fn tree() -> impl Strategy<Value = Value> {
            scalar().prop_recursive(4, 48, 6, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                    prop::collection::btree_map(key(), inner, 0..6)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        fn document() -> impl Strategy<Value = Value> {
            (
                prop::option::of(tree()),
                prop::option::of(tree()),
                prop::option::of(tree()),
            )
                .prop_map(|(tdoa, ttoi, shared)| {
                    let mut root = Map::new();
                    for (key, value) in [("TDOA", tdoa), ("TTOI", ttoi), ("shared", shared)] {
                        if let Some(value) = value {
                            root.insert(key.to_string(), value);
                        }
                    }
                    Value::Object(root)
                })
        }

        fn name() -> impl Strategy<Value = String> {
            "[A-Z][a-z]{0,7}( [A-Z][a-z]{0,7})?"
        }

        fn names() -> impl Strategy<Value = Vec<String>> {
            prop::collection::btree_set(name(), 0..4).prop_map(|set| set.into_iter().collect())
        }

        fn sheet() -> impl Strategy<Value = CharacterState> {
            (prop::array::uniform8(any::<i64>()), names(), names(), names(), names()).prop_map(
                |(a, abilities, weaknesses, items, secrets)| CharacterState {
                    attributes: Attributes {
                        willpower: a[0],
                        intellect: a[1],
                        combat: a[2],
                        health: a[3],
                        sanity: a[4],
                        resources: a[5],
                        clues: a[6],
                        doom: a[7],
                    },
                    abilities,
                    weaknesses,
                    items,
                    secrets,
                },
            )
        }

        fn run() -> impl Strategy<Value = CompletedRun> {
            (name(), any::<i64>(), names(), 0..=MAX_STARS).prop_map(
                |(character_name, timestamp, secrets, stars)| CompletedRun {
                    character_name,
                    timestamp,
                    secrets,
                    stars,
                },
            )
        }

        fn game() -> impl Strategy<Value = GameState> {
            (
                prop::collection::btree_map(name(), sheet(), 0..3),
                any::<bool>(),
                names(),
                any::<u32>(),
                prop::collection::vec(run(), 0..3),
            )
                .prop_map(|(characters, active, found_secrets, bookmark, completed_runs)| {
                    let current_character_name = characters
                        .keys()
                        .next()
                        .filter(|_| active)
                        .cloned()
                        .unwrap_or_default();
                    GameState {
                        current_character_name,
                        characters,
                        found_secrets,
                        bookmark,
                        completed_runs,
                    }
                })
        }

        fn valid_state() -> impl Strategy<Value = AppState> {
            (game(), game(), 1..=DIE_FACES).prop_map(|(tdoa, ttoi, dice_roll)| AppState {
                tdoa,
                ttoi,
                shared: crate::game::state::SharedState { dice_roll },
            })
        }

        proptest! {
            #[test]
            fn migrating_twice_changes_nothing(doc in document()) {
                let once = migrate(Some(&doc.to_string()));
                let twice = migrate(Some(&once.to_json()));
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn valid_states_round_trip(state in valid_state()) {
                prop_assert_eq!(migrate(Some(&state.to_json())), state);
            }
        }
    }
}
