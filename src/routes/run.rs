//! `/api/run/finish` and `/api/secrets/clear`.

use crate::game::state::MAX_STARS;
use crate::routes::game::respond_with_state;
use crate::routes::util::{get_param, json_error, parse_form_body, parse_int, write_store};

/// Body: `stars={0..4}`. Out-of-range ratings are clamped.
pub fn handle_finish_post(body: &str) -> String {
    let params = parse_form_body(body);
    let stars = match get_param(&params, "stars") {
        None | Some("") => 0,
        Some(raw) => match parse_int(raw) {
            Some(n) => n.clamp(0, i64::from(MAX_STARS)) as u8,
            None => return json_error("Invalid star rating"),
        },
    };
    write_store(|store| {
        let persist = store.finish_run(stars);
        respond_with_state(store, &persist)
    })
}

pub fn handle_clear_secrets_post(_body: &str) -> String {
    write_store(|store| {
        let persist = store.clear_found_secrets();
        respond_with_state(store, &persist)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session;
    use crate::routes::character::{handle_list_post, handle_select_post};
    use serde_json::{Value, json};

    fn parse(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn finish_archives_run() {
        session::install_for_test();
        handle_select_post("name=Agnes+Baker&mode=restart");
        handle_list_post("secrets", "action=add&name=The+Witch+House");

        let body = parse(&handle_finish_post("stars=3"));
        assert!(body["character"].is_null());
        assert_eq!(body["foundSecrets"], json!(["The Witch House"]));
        assert_eq!(
            body["completedRuns"],
            json!([{
                "characterName": "Agnes Baker",
                "timestamp": 1_700_000_000_000_i64,
                "secrets": ["The Witch House"],
                "stars": 3,
            }])
        );
    }

    #[test]
    fn finish_clamps_and_validates_stars() {
        session::install_for_test();
        handle_select_post("name=Agnes+Baker&mode=restart");
        let body = parse(&handle_finish_post("stars=11"));
        assert_eq!(body["completedRuns"][0]["stars"], 4);

        handle_select_post("name=Wendy+Adams&mode=restart");
        let body = parse(&handle_finish_post("stars=-2"));
        assert_eq!(body["completedRuns"][1]["stars"], 0);

        assert!(handle_finish_post("stars=many").contains("Invalid star rating"));
    }

    #[test]
    fn finish_without_character_changes_nothing() {
        session::install_for_test();
        let body = parse(&handle_finish_post("stars=2"));
        assert_eq!(body["completedRuns"], json!([]));
    }

    #[test]
    fn clear_secrets_keeps_history() {
        session::install_for_test();
        handle_select_post("name=Agnes+Baker&mode=restart");
        handle_list_post("secrets", "action=add&name=The+Black+Book");
        handle_finish_post("stars=1");

        let body = parse(&handle_clear_secrets_post(""));
        assert_eq!(body["foundSecrets"], json!([]));
        assert_eq!(body["completedRuns"].as_array().unwrap().len(), 1);
    }
}
