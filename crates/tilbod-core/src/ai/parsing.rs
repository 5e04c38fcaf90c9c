//! JSON parsing helpers for completion responses
//!
//! Models wrap their JSON in prose or markdown fences; these helpers cut out
//! the outermost object or array and deserialize it.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Longest raw excerpt quoted in an error message
const RAW_EXCERPT_CHARS: usize = 200;

/// Deserialize the outermost `{...}` of a response
pub fn parse_json_object<T: DeserializeOwned>(response: &str) -> Result<T> {
    parse_between(response, '{', '}')
}

/// Deserialize the outermost `[...]` of a response
pub fn parse_json_array<T: DeserializeOwned>(response: &str) -> Result<T> {
    parse_between(response, '[', ']')
}

fn parse_between<T: DeserializeOwned>(response: &str, open: char, close: char) -> Result<T> {
    let response = strip_fences(response.trim());
    let start = response.find(open);
    let end = response.rfind(close);

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|e| {
                Error::MalformedResponse(format!(
                    "Invalid JSON from model: {} | Raw: {}",
                    e,
                    excerpt(json_str)
                ))
            })
        }
        _ => Err(Error::MalformedResponse(format!(
            "No JSON found in model response | Raw: {}",
            excerpt(response)
        ))),
    }
}

/// Drop a ```json ... ``` wrapper if present
fn strip_fences(response: &str) -> &str {
    let Some(rest) = response.strip_prefix("```") else {
        return response;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > RAW_EXCERPT_CHARS {
        let cut: String = text.chars().take(RAW_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_object_with_surrounding_text() {
        let response = "Here you go:\n{\"name\": \"Tilboð 1\"}\nAnything else?";
        let parsed: Named = parse_json_object(response).unwrap();
        assert_eq!(parsed.name, "Tilboð 1");
    }

    #[test]
    fn test_array_in_fences() {
        let response = "```json\n[{\"name\": \"a\"}, {\"name\": \"b\"}]\n```";
        let parsed: Vec<Named> = parse_json_array(response).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_no_json() {
        let result: Result<Named> = parse_json_object("Sorry, I cannot help with that.");
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_schema_violation_is_malformed() {
        let result: Result<Named> = parse_json_object("{\"title\": 3}");
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_long_raw_text_is_truncated_on_char_boundary() {
        let response = format!("{{{}", "þ".repeat(500));
        let err = parse_json_object::<Named>(&response).unwrap_err().to_string();
        assert!(err.ends_with("..."));
    }
}
