//! Investigator character tracker for the Arkham gamebooks, compiled to WASM.
//!
//! Exports `boot()`, `init_logging()` and `handle_request(method, path, query, body)`
//! for the page's JavaScript bridge. Uses `matchit` for URL routing and answers
//! every request with a JSON string.
//!
//! All state lives in one [`game::store::Store`] installed by `boot()`. It is
//! migrated from localStorage on load and written back after every mutation.

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod game;
pub mod logging;
pub mod routes;

/// Open the persisted document and install the page's store.
///
/// Calling it again keeps the store that is already installed, so unsaved
/// in-memory changes survive a second call.
#[wasm_bindgen]
pub fn boot() {
    if game::session::is_installed() {
        tracing::debug!("boot called twice, keeping installed store");
        return;
    }
    if let Some(store) = open_browser_store() {
        game::session::install(store);
    }
}

#[cfg(target_arch = "wasm32")]
fn open_browser_store() -> Option<game::store::Store> {
    Some(game::store::Store::open(
        Box::new(game::storage::LocalStorage),
        Box::new(game::platform::BrowserPlatform),
        catalog::catalog(),
    ))
}

/// localStorage only exists in the browser.
#[cfg(not(target_arch = "wasm32"))]
fn open_browser_store() -> Option<game::store::Store> {
    None
}

/// Route `tracing` output to the browser console.
#[wasm_bindgen]
pub fn init_logging() {
    logging::init(tracing::Level::DEBUG);
}

/// Process an HTTP-like request and return a JSON body.
///
/// # Arguments
/// * `method`: HTTP method (`"GET"` or `"POST"`)
/// * `path`: URL path (e.g., `"/api/sheet/items"`)
/// * `query`: Query string (e.g., `"?kind=items&q=kni"`)
/// * `body`: Form-encoded body for POST. Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/state", "state").ok();
    router.insert("/api/campaign", "campaign").ok();
    router.insert("/api/dice/roll", "dice_roll").ok();
    router.insert("/api/bookmark", "bookmark").ok();
    router.insert("/api/export", "export").ok();
    router.insert("/api/import", "import").ok();

    router.insert("/api/characters", "characters").ok();
    router.insert("/api/character/select", "character_select").ok();
    router.insert("/api/character/attribute", "character_attribute").ok();
    router.insert("/api/sheet/{list}", "sheet_list").ok();
    router.insert("/api/suggest", "suggest").ok();

    router.insert("/api/run/finish", "run_finish").ok();
    router.insert("/api/secrets/clear", "secrets_clear").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("state", "GET") => routes::game::handle_state_get(query),
            ("export", "GET") => routes::game::handle_export_get(query),
            ("characters", "GET") => routes::character::handle_characters_get(query),
            ("suggest", "GET") => routes::character::handle_suggest_get(query),

            ("campaign", "POST") => routes::game::handle_campaign_post(body),
            ("dice_roll", "POST") => routes::game::handle_roll_post(body),
            ("bookmark", "POST") => routes::game::handle_bookmark_post(body),
            ("import", "POST") => routes::game::handle_import_post(body),
            ("character_select", "POST") => routes::character::handle_select_post(body),
            ("character_attribute", "POST") => routes::character::handle_attribute_post(body),
            ("sheet_list", "POST") => {
                let list = matched.params.get("list").unwrap_or_default();
                routes::character::handle_list_post(list, body)
            }
            ("run_finish", "POST") => routes::run::handle_finish_post(body),
            ("secrets_clear", "POST") => routes::run::handle_clear_secrets_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    routes::util::json_error("route not found")
}

fn method_not_allowed() -> String {
    routes::util::json_error("method not allowed")
}
