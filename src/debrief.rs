//! Post-run mission debrief from an LLM
//!
//! Fire-and-forget: the host kicks this off after game over and fills the
//! debrief panel whenever the text arrives. The run never waits on it, and
//! every failure mode degrades to a canned line instead of an error.

/// Shown when no API key is configured
pub const OFFLINE_FALLBACK: &str = "Intelligence relay offline. Secure the sector, Pilot.";
/// Shown when the request or response parsing fails
pub const ERROR_FALLBACK: &str = "The stars are silent today. Keep fighting, Pilot.";

/// LocalStorage key holding the API key, if the player configured one
#[allow(dead_code)]
const API_KEY_STORAGE_KEY: &str = "astro_blitz_api_key";

#[allow(dead_code)]
const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// The stats a finished run hands to the debrief
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub score: u64,
    pub level: u32,
    pub best_combo: u32,
}

/// Build the debrief prompt for a finished run
fn build_prompt(summary: &RunSummary) -> String {
    format!(
        "You are a terse starfighter wing commander debriefing a pilot after a \
         sortie. Final score: {}. Level reached: {}. Best combo streak: {}. \
         Give a two-sentence in-character debrief. No preamble, no markdown.",
        summary.score, summary.level, summary.best_combo
    )
}

/// Fetch a debrief line for the run.
///
/// Resolves to [`OFFLINE_FALLBACK`] when no key is stored and
/// [`ERROR_FALLBACK`] on any network or parse failure.
#[cfg(target_arch = "wasm32")]
pub async fn mission_debrief(summary: RunSummary) -> String {
    let Some(key) = stored_api_key() else {
        return OFFLINE_FALLBACK.to_string();
    };
    match request_debrief(&key, &summary).await {
        Some(text) => text,
        None => {
            log::warn!("Debrief request failed, using fallback");
            ERROR_FALLBACK.to_string()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn stored_api_key() -> Option<String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .and_then(|s| s.get_item(API_KEY_STORAGE_KEY).ok())
        .flatten()
        .filter(|k| !k.is_empty())
}

#[cfg(target_arch = "wasm32")]
async fn request_debrief(key: &str, summary: &RunSummary) -> Option<String> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let body = serde_json::json!({
        "contents": [{
            "parts": [{ "text": build_prompt(summary) }]
        }]
    })
    .to_string();

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));

    let url = format!("{ENDPOINT}?key={key}");
    let request = Request::new_with_str_and_init(&url, &opts).ok()?;
    request.headers().set("Content-Type", "application/json").ok()?;

    let window = web_sys::window()?;
    let resp = JsFuture::from(window.fetch_with_request(&request)).await.ok()?;
    let resp: Response = resp.dyn_into().ok()?;
    if !resp.ok() {
        log::warn!("Debrief endpoint returned status {}", resp.status());
        return None;
    }

    let text = JsFuture::from(resp.text().ok()?).await.ok()?;
    parse_debrief(&text.as_string()?)
}

/// Pull the first candidate's text out of a generateContent response
fn parse_debrief(json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let text = value["candidates"][0]["content"]["parts"][0]["text"].as_str()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Native stub: no browser, no key store
#[cfg(not(target_arch = "wasm32"))]
pub async fn mission_debrief(_summary: RunSummary) -> String {
    OFFLINE_FALLBACK.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_run_stats() {
        let prompt = build_prompt(&RunSummary {
            score: 12_300,
            level: 13,
            best_combo: 7,
        });
        assert!(prompt.contains("12300"));
        assert!(prompt.contains("13"));
        assert!(prompt.contains("7"));
    }

    #[test]
    fn test_parse_debrief_extracts_candidate_text() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "  Clean sweep, Pilot.  " }] }
            }]
        }"#;
        assert_eq!(parse_debrief(json), Some("Clean sweep, Pilot.".to_string()));
    }

    #[test]
    fn test_parse_debrief_rejects_malformed() {
        assert_eq!(parse_debrief("not json"), None);
        assert_eq!(parse_debrief("{}"), None);
        assert_eq!(
            parse_debrief(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#),
            None
        );
    }

    #[test]
    fn test_fallback_lines_are_distinct() {
        assert_ne!(OFFLINE_FALLBACK, ERROR_FALLBACK);
    }
}
