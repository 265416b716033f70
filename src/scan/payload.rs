use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::scan::validator::ScanError;

/// Decoded form of a scanned QR code. Session codes are JSON blobs minted by
/// the location/QR collaborator; anything else is treated as a bare location
/// code and resolved against the registered-location table.
#[derive(Debug, Clone, PartialEq)]
pub enum QrPayload {
    Session {
        session_token: String,
        location: String,
        expires_at: DateTime<Utc>,
    },
    LocationCode(String),
}

#[derive(Deserialize)]
struct SessionPayload {
    #[serde(rename = "type")]
    kind: String,
    session_token: String,
    location: String,
    expires_at: DateTime<Utc>,
}

const SESSION_KIND: &str = "attendance_session";

/// Anything that looks like JSON must fully parse as a session payload;
/// a half-formed session blob is rejected rather than demoted to a bare code.
pub fn parse(raw: &str) -> Result<QrPayload, ScanError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScanError::MalformedPayload);
    }

    if trimmed.starts_with('{') {
        let payload: SessionPayload =
            serde_json::from_str(trimmed).map_err(|_| ScanError::MalformedPayload)?;
        if payload.kind != SESSION_KIND {
            return Err(ScanError::MalformedPayload);
        }
        return Ok(QrPayload::Session {
            session_token: payload.session_token,
            location: payload.location,
            expires_at: payload.expires_at,
        });
    }

    Ok(QrPayload::LocationCode(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_payload_parses() {
        let raw = r#"{"type":"attendance_session","session_token":"tok-1","location":"lab-3f","expires_at":"2025-07-09T01:00:00Z"}"#;
        match parse(raw).unwrap() {
            QrPayload::Session {
                session_token,
                location,
                expires_at,
            } => {
                assert_eq!(session_token, "tok-1");
                assert_eq!(location, "lab-3f");
                assert_eq!(expires_at.to_rfc3339(), "2025-07-09T01:00:00+00:00");
            }
            other => panic!("expected session payload, got {other:?}"),
        }
    }

    #[test]
    fn bare_string_is_a_location_code() {
        assert_eq!(parse(" lab-3f \n").unwrap(), QrPayload::LocationCode("lab-3f".into()));
    }

    #[test]
    fn wrong_type_tag_is_malformed() {
        let raw = r#"{"type":"door_unlock","session_token":"t","location":"l","expires_at":"2025-07-09T01:00:00Z"}"#;
        assert_eq!(parse(raw).unwrap_err(), ScanError::MalformedPayload);
    }

    #[test]
    fn broken_json_is_malformed_not_a_location_code() {
        assert_eq!(parse(r#"{"type":"attendance_session""#).unwrap_err(), ScanError::MalformedPayload);
        assert_eq!(parse("").unwrap_err(), ScanError::MalformedPayload);
    }

    #[test]
    fn missing_fields_are_malformed() {
        let raw = r#"{"type":"attendance_session","location":"lab-3f"}"#;
        assert_eq!(parse(raw).unwrap_err(), ScanError::MalformedPayload);
    }
}
