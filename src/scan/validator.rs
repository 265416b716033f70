use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::model::location::Location;
use crate::scan::payload::QrPayload;

/// Why a scan was refused. Reported synchronously to the caller; no event
/// row is written on any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScanError {
    #[display(fmt = "QR payload is malformed")]
    MalformedPayload,
    #[display(fmt = "Attendance session has expired")]
    ExpiredSession,
    #[display(fmt = "Unknown location code")]
    UnknownLocation,
    #[display(fmt = "Geolocation unavailable, scan rejected")]
    GeolocationUnavailable,
}

impl ResponseError for ScanError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": self.to_string() }))
    }
}

/// Device geolocation reading. Capture failure on the device shows up here
/// as an absent reading and fails the whole scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// What gets written into the event row once a scan passes validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScan {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Validates a decoded payload and a geolocation reading against the clock
/// and the registered-location table.
///
/// Session payloads are valid while `now <= expires_at`; the server clock
/// governs, so an expired token cannot be replayed whatever the client
/// thinks the time is. Bare codes must resolve to a registered location.
/// The QR only proves presence, never which half of the shift it is, so the
/// checkin/checkout choice stays with the caller.
pub fn validate(
    payload: &QrPayload,
    now: DateTime<Utc>,
    geo: Option<GeoPoint>,
    registered: &[Location],
) -> Result<ValidatedScan, ScanError> {
    let geo = geo.ok_or(ScanError::GeolocationUnavailable)?;

    let location = match payload {
        QrPayload::Session {
            location,
            expires_at,
            ..
        } => {
            if now > *expires_at {
                return Err(ScanError::ExpiredSession);
            }
            location.clone()
        }
        QrPayload::LocationCode(code) => registered
            .iter()
            .find(|l| l.code == *code)
            .map(|l| l.name.clone())
            .ok_or(ScanError::UnknownLocation)?,
    };

    Ok(ValidatedScan {
        location,
        latitude: geo.latitude,
        longitude: geo.longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 9, 0, 30, 0).unwrap()
    }

    fn session(expires_at: DateTime<Utc>) -> QrPayload {
        QrPayload::Session {
            session_token: "tok-1".into(),
            location: "lab-3f".into(),
            expires_at,
        }
    }

    fn geo() -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: 37.5665,
            longitude: 126.978,
        })
    }

    fn registry() -> Vec<Location> {
        vec![Location {
            id: 1,
            code: "LOC-3F".into(),
            name: "lab-3f".into(),
            latitude: Some(37.5665),
            longitude: Some(126.978),
        }]
    }

    #[test]
    fn live_session_passes_and_carries_its_location() {
        let out = validate(&session(now() + Duration::minutes(5)), now(), geo(), &[]).unwrap();
        assert_eq!(out.location, "lab-3f");
        assert_eq!(out.latitude, 37.5665);
    }

    #[test]
    fn expiry_is_an_instant_comparison() {
        // Exactly at expiry still passes; one second past does not.
        assert!(validate(&session(now()), now(), geo(), &[]).is_ok());
        let expired = session(now() - Duration::seconds(1));
        assert_eq!(validate(&expired, now(), geo(), &[]).unwrap_err(), ScanError::ExpiredSession);
    }

    #[test]
    fn bare_code_resolves_against_the_registry() {
        let payload = QrPayload::LocationCode("LOC-3F".into());
        let out = validate(&payload, now(), geo(), &registry()).unwrap();
        assert_eq!(out.location, "lab-3f");
    }

    #[test]
    fn unregistered_code_is_rejected() {
        let payload = QrPayload::LocationCode("LOC-9Z".into());
        assert_eq!(
            validate(&payload, now(), geo(), &registry()).unwrap_err(),
            ScanError::UnknownLocation
        );
    }

    #[test]
    fn missing_geolocation_fails_the_whole_scan() {
        let live = session(now() + Duration::minutes(5));
        assert_eq!(validate(&live, now(), None, &[]).unwrap_err(), ScanError::GeolocationUnavailable);
    }
}
