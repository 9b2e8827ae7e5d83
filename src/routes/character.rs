//! Character routes: the picker, attribute edits, the four name lists on the
//! sheet and their autocomplete.

use serde_json::{Value, json};

use crate::game::state::{Attribute, SheetList};
use crate::game::store::{Persist, SelectMode};
use crate::routes::game::respond_with_state;
use crate::routes::util::{
    get_param, json_error, parse_form_body, parse_int_or_zero, parse_query, read_store,
    write_store,
};

// ── GET /api/characters ────────────────────────────────────────────

/// Picker entries for the active campaign: every predefined investigator,
/// then any saved sheet the catalog does not know.
pub fn handle_characters_get(_query: &str) -> String {
    read_store(|store| {
        let catalog = store.catalog();
        let game = store.game();

        let mut entries: Vec<Value> = catalog
            .characters()
            .iter()
            .map(|profile| {
                json!({
                    "name": profile.name,
                    "label": catalog.character_label(&profile.name),
                    "saved": game.characters.contains_key(&profile.name),
                })
            })
            .collect();
        entries.extend(
            game.characters
                .keys()
                .filter(|name| catalog.character(name).is_none())
                .map(|name| json!({ "name": name, "label": name, "saved": true })),
        );

        json!({
            "current": game.current_character_name,
            "label": catalog.character_label(&game.current_character_name),
            "characters": entries,
        })
        .to_string()
    })
}

// ── POST /api/character/select ─────────────────────────────────────

/// Body: `name={name}&mode=restart|load`. Without `mode` a saved sheet is
/// loaded and an unsaved one starts fresh.
pub fn handle_select_post(body: &str) -> String {
    let params = parse_form_body(body);
    let name = match get_param(&params, "name").map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => return json_error("Missing name parameter"),
    };
    let mode = match get_param(&params, "mode").map(str::parse::<SelectMode>) {
        None => SelectMode::Load,
        Some(Ok(m)) => m,
        Some(Err(e)) => return json_error(&e),
    };
    write_store(|store| {
        let persist = store.select_character(&name, mode);
        respond_with_state(store, &persist)
    })
}

// ── POST /api/character/attribute ──────────────────────────────────

/// Body: `name={attribute}&value={n}`. Unparseable values read as 0.
pub fn handle_attribute_post(body: &str) -> String {
    let params = parse_form_body(body);
    let attribute: Attribute = match get_param(&params, "name").map(str::parse) {
        Some(Ok(a)) => a,
        Some(Err(e)) => return json_error(&e),
        None => return json_error("Missing name parameter"),
    };
    let value = parse_int_or_zero(get_param(&params, "value").unwrap_or(""));
    write_store(|store| {
        let persist = store.set_attribute(attribute, value);
        respond_with_state(store, &persist)
    })
}

// ── POST /api/sheet/{list} ─────────────────────────────────────────

/// Body: `action=add|remove&name={entry}`.
///
/// Lists stay free of duplicates: adding a name already present is an error.
/// Without an active character the view is returned unchanged.
pub fn handle_list_post(list: &str, body: &str) -> String {
    let list: SheetList = match list.parse() {
        Ok(l) => l,
        Err(e) => return json_error(&e),
    };
    let params = parse_form_body(body);
    let name = match get_param(&params, "name").map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => return json_error("Missing name parameter"),
    };
    let adding = match get_param(&params, "action") {
        Some("add") => true,
        Some("remove") => false,
        Some(other) => return json_error(&format!("Unknown action: {}", other)),
        None => return json_error("Missing action parameter"),
    };

    write_store(|store| {
        let Some((_, sheet)) = store.game().active_character() else {
            return respond_with_state(store, &Persist::Unchanged);
        };
        let mut names = list.of(sheet).to_vec();
        let present = names.contains(&name);

        if adding {
            if present {
                return json_error(&format!("{} is already on the sheet", name));
            }
            names.push(name);
        } else {
            if !present {
                return respond_with_state(store, &Persist::Unchanged);
            }
            names.retain(|n| *n != name);
        }

        let persist = store.set_list(list, names);
        respond_with_state(store, &persist)
    })
}

// ── GET /api/suggest ───────────────────────────────────────────────

/// Query: `kind={list}&q={prefix}`.
pub fn handle_suggest_get(query: &str) -> String {
    let params = parse_query(query);
    let list: SheetList = match get_param(&params, "kind").map(str::parse) {
        Some(Ok(l)) => l,
        Some(Err(e)) => return json_error(&e),
        None => return json_error("Missing kind parameter"),
    };
    let q = get_param(&params, "q").unwrap_or("");

    read_store(|store| {
        let selected = store
            .game()
            .active_character()
            .map(|(_, sheet)| list.of(sheet))
            .unwrap_or(&[]);
        let suggestions = store
            .catalog()
            .suggest(list, q, selected, store.active_campaign());
        json!({ "kind": list.key(), "suggestions": suggestions }).to_string()
    })
}
