//! Webhook receipt: signature verification and tolerant body parsing.
//!
//! The HTTP-layer concerns (reading the raw body, returning 200 promptly,
//! detaching the persistence write) live in the API crate's route handler;
//! this module owns only the business logic that handler delegates to.

use chrono::Utc;
use recap_models::{GitHubEvent, GitHubEventType};

use crate::error::{EventsError, EventsResult};

/// Verifies the inbound webhook signature against the raw body.
pub fn verify_signature(secret: &[u8], body: &[u8], signature_header: &str) -> EventsResult<()> {
    recap_auth::verify_webhook_signature(secret, body, signature_header).map_err(EventsError::from)
}

/// Parses the event-type header into a [`GitHubEventType`], failing if the
/// header is absent.
pub fn parse_event_type(header: Option<&str>) -> EventsResult<GitHubEventType> {
    let raw = header.ok_or(EventsError::MissingEventType)?;
    let quoted = format!("\"{raw}\"");
    Ok(serde_json::from_str(&quoted).unwrap_or(GitHubEventType::Other))
}

/// Parses the body as JSON, or as `application/x-www-form-urlencoded` with
/// a `payload=` field (GitHub's legacy content type), into a generic value.
pub fn parse_payload(content_type: &str, body: &[u8]) -> EventsResult<serde_json::Value> {
    if content_type.contains("application/x-www-form-urlencoded") {
        let text = std::str::from_utf8(body)
            .map_err(|e| EventsError::MalformedBody(e.to_string()))?;
        let payload_field = text
            .split('&')
            .find_map(|pair| pair.strip_prefix("payload="))
            .ok_or_else(|| EventsError::MalformedBody("missing payload field".to_string()))?;
        let decoded = urlencoding::decode(payload_field)
            .map_err(|e| EventsError::MalformedBody(e.to_string()))?;
        Ok(serde_json::from_str(&decoded)?)
    } else {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Builds the persisted event record from the parsed pieces. `repository`
/// is read from the conventional `repository.full_name` field when present.
pub fn build_event(delivery_id: String, event_type: GitHubEventType, payload: serde_json::Value) -> GitHubEvent {
    let repository = payload
        .get("repository")
        .and_then(|r| r.get("full_name"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    GitHubEvent {
        delivery_id,
        event_type,
        timestamp: Utc::now(),
        repository,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_event_type() {
        assert_eq!(parse_event_type(Some("push")).unwrap(), GitHubEventType::Push);
        assert_eq!(parse_event_type(Some("pull_request")).unwrap(), GitHubEventType::PullRequest);
    }

    #[test]
    fn unknown_event_type_falls_back_to_other() {
        assert_eq!(parse_event_type(Some("deployment")).unwrap(), GitHubEventType::Other);
    }

    #[test]
    fn missing_event_type_errors() {
        assert!(matches!(parse_event_type(None), Err(EventsError::MissingEventType)));
    }

    #[test]
    fn parses_json_payload() {
        let body = br#"{"repository": {"full_name": "org/repo"}}"#;
        let value = parse_payload("application/json", body).unwrap();
        assert_eq!(value["repository"]["full_name"], "org/repo");
    }

    #[test]
    fn parses_form_encoded_payload() {
        let json = r#"{"repository":{"full_name":"org/repo"}}"#;
        let encoded = urlencoding::encode(json);
        let body = format!("payload={encoded}");
        let value = parse_payload("application/x-www-form-urlencoded", body.as_bytes()).unwrap();
        assert_eq!(value["repository"]["full_name"], "org/repo");
    }

    #[test]
    fn builds_event_with_repository_extracted() {
        let payload = serde_json::json!({"repository": {"full_name": "org/repo"}});
        let event = build_event("d1".to_string(), GitHubEventType::Push, payload);
        assert_eq!(event.repository, "org/repo");
        assert_eq!(event.delivery_id, "d1");
    }
}
