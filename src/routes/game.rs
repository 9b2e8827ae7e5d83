//! Campaign-level routes: `/api/state`, `/api/campaign`, `/api/dice/roll`,
//! `/api/bookmark`, plus whole-document `/api/export` and `/api/import`.
//!
//! Every successful mutation answers with the same view `GET /api/state`
//! returns, so the page can re-render from one response.

use serde_json::{Value, json};

use crate::catalog::Entry;
use crate::game::state::{Attribute, Campaign, SheetList};
use crate::game::store::{Persist, Store};
use crate::routes::util::{
    get_param, json_error, parse_form_body, parse_int, read_store, respond, write_store,
};

/// JSON view of the active campaign.
pub fn state_view(store: &Store) -> Value {
    let campaign = store.active_campaign();
    let game = store.game();
    let catalog = store.catalog();

    let character = match game.active_character() {
        Some((name, sheet)) => {
            let attributes: serde_json::Map<String, Value> = Attribute::ALL
                .iter()
                .map(|a| (a.key().to_string(), json!(sheet.attributes.get(*a))))
                .collect();
            let entries = |list: SheetList| -> Vec<Value> {
                list.of(sheet)
                    .iter()
                    .map(|entry_name| {
                        let entry = catalog.entry(list, entry_name);
                        let mut value = json!({
                            "name": entry_name,
                            "description": entry.as_ref().and_then(Entry::description),
                        });
                        if let Some(Entry::Item(item)) = entry {
                            value["isEquipped"] = json!(item.is_equipped);
                        }
                        value
                    })
                    .collect()
            };
            json!({
                "name": name,
                "label": catalog.character_label(name),
                "attributes": attributes,
                "summary": sheet.attributes.summary(),
                "abilities": entries(SheetList::Abilities),
                "weaknesses": entries(SheetList::Weaknesses),
                "items": entries(SheetList::Items),
                "secrets": entries(SheetList::Secrets),
            })
        }
        None => Value::Null,
    };

    json!({
        "campaign": campaign.code(),
        "title": campaign.title(),
        "diceRoll": store.state().shared.dice_roll,
        "bookmark": game.bookmark,
        "characterLabel": catalog.character_label(&game.current_character_name),
        "character": character,
        "foundSecrets": game.found_secrets,
        "completedRuns": game.completed_runs,
    })
}

/// Answer a mutation with the refreshed view.
pub fn respond_with_state(store: &Store, persist: &Persist) -> String {
    respond(persist, state_view(store))
}

// ── GET /api/state ─────────────────────────────────────────────────

pub fn handle_state_get(_query: &str) -> String {
    read_store(|store| state_view(store).to_string())
}

// ── POST /api/campaign ─────────────────────────────────────────────

/// Body: `campaign=TDOA|TTOI`
pub fn handle_campaign_post(body: &str) -> String {
    let params = parse_form_body(body);
    let campaign: Campaign = match get_param(&params, "campaign").map(str::parse) {
        Some(Ok(c)) => c,
        Some(Err(e)) => return json_error(&e),
        None => return json_error("Missing campaign parameter"),
    };
    write_store(|store| {
        store.select_campaign(campaign);
        respond_with_state(store, &Persist::Unchanged)
    })
}

// ── POST /api/dice/roll ────────────────────────────────────────────

pub fn handle_roll_post(_body: &str) -> String {
    write_store(|store| {
        let persist = store.roll_die();
        respond_with_state(store, &persist)
    })
}

// ── POST /api/bookmark ─────────────────────────────────────────────

/// Body: `page={n}`. Negative or non-numeric pages keep the saved bookmark.
pub fn handle_bookmark_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(page) = get_param(&params, "page").and_then(parse_int) else {
        return json_error("Invalid page number");
    };
    write_store(|store| match store.set_bookmark(page) {
        Persist::Unchanged => json_error("Invalid page number"),
        persist => respond_with_state(store, &persist),
    })
}

// ── GET /api/export ────────────────────────────────────────────────

/// The whole persisted document, for backup files.
pub fn handle_export_get(_query: &str) -> String {
    read_store(|store| store.export_json())
}

// ── POST /api/import ───────────────────────────────────────────────

/// Body: raw document JSON, or a form body with `state={json}`.
/// Older document shapes are migrated on the way in.
pub fn handle_import_post(body: &str) -> String {
    let trimmed = body.trim();
    let raw = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        let params = parse_form_body(trimmed);
        get_param(&params, "state").unwrap_or(trimmed).to_string()
    };
    write_store(|store| match store.import_json(&raw) {
        Ok(persist) => respond_with_state(store, &persist),
        Err(e) => json_error(&format!("Import failed: {}", e)),
    })
}
