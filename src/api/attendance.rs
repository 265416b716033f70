use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::location::Location;
use crate::model::scan_event::ScanType;
use crate::scan::{payload, validator, GeoPoint, QrPayload};
use crate::utils::db_utils::{build_update_sql, execute_update};

#[derive(Deserialize, ToSchema)]
pub struct SubmitScan {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub group_id: Option<u64>,
    /// The QR only proves presence; the caller still picks which half of
    /// the shift this is.
    #[schema(example = "checkin", value_type = String)]
    pub scan_type: ScanType,
    /// Raw decoded QR content: session JSON or a bare location code.
    #[schema(example = "LOC-3F")]
    pub payload: String,
    #[schema(example = 37.5665)]
    pub latitude: Option<f64>,
    #[schema(example = 126.978)]
    pub longitude: Option<f64>,
}

/// Scan submission endpoint: validate, then append exactly one event row.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/scan",
    request_body = SubmitScan,
    responses(
        (status = 200, description = "Scan recorded", body = Object, example = json!({
            "message": "Scan recorded", "location": "lab-3f", "scan_type": "checkin"
        })),
        (status = 400, description = "Malformed payload, expired session, unknown location, or missing geolocation"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn submit_scan(
    pool: web::Data<MySqlPool>,
    body: web::Json<SubmitScan>,
) -> actix_web::Result<impl Responder> {
    let decoded = payload::parse(&body.payload)?;

    // Bare codes resolve against the registered-location table; session
    // payloads carry their own location name.
    let registered: Vec<Location> = match &decoded {
        QrPayload::LocationCode(code) => sqlx::query_as::<_, Location>(
            "SELECT id, code, name, latitude, longitude FROM locations WHERE code = ?",
        )
        .bind(code)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to resolve location code");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?,
        QrPayload::Session { .. } => Vec::new(),
    };

    let geo = match (body.latitude, body.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let now = Utc::now();
    let scan = validator::validate(&decoded, now, geo, &registered).map_err(|e| {
        tracing::warn!(error = %e, user_id = body.user_id, "Scan rejected");
        e
    })?;

    sqlx::query(
        r#"
        INSERT INTO scan_events
            (user_id, group_id, scan_time, scan_type, location, latitude, longitude)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(body.user_id)
    .bind(body.group_id)
    .bind(now)
    .bind(body.scan_type)
    .bind(&scan.location)
    .bind(scan.latitude)
    .bind(scan.longitude)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = body.user_id, "Failed to record scan");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scan recorded",
        "location": scan.location,
        "scan_type": body.scan_type,
    })))
}

/// Columns an editor may touch. Identity and audit columns stay off-limits.
const EDITABLE_COLUMNS: &[&str] = &[
    "scan_time",
    "scan_type",
    "location",
    "latitude",
    "longitude",
    "absence_reason",
];

#[derive(Deserialize, ToSchema)]
pub struct EditScan {
    /// Editor performing the change, recorded in the audit columns.
    #[schema(example = 3)]
    pub edited_by: u64,
    /// Column/value pairs to apply; restricted to the editable set.
    #[schema(example = json!({"scan_time": "2025-07-09T09:05:00+09:00", "absence_reason": "missed bus"}))]
    pub changes: Value,
}

/// Explicit edit of a raw event row. Sets `is_edited` plus the audit
/// columns; classification later simply reads the edited values.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{id}",
    params(("id" = u64, Path, description = "Scan event id")),
    request_body = EditScan,
    responses(
        (status = 200, description = "Event updated"),
        (status = 400, description = "Bad column or value"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn edit_scan(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<EditScan>,
) -> actix_web::Result<impl Responder> {
    let event_id = path.into_inner();

    let mut changes = body
        .changes
        .as_object()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorBadRequest("changes must be a JSON object"))?;

    // Whitelist the caller's keys before stapling on the audit columns.
    for key in changes.keys() {
        if !EDITABLE_COLUMNS.contains(&key.as_str()) {
            return Err(actix_web::error::ErrorBadRequest(format!(
                "Column not editable: {key}"
            )));
        }
    }
    changes.insert("is_edited".into(), json!(true));
    changes.insert("edited_by".into(), json!(body.edited_by));
    changes.insert(
        "edited_at".into(),
        json!(Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
    );

    let mut allowed: Vec<&str> = EDITABLE_COLUMNS.to_vec();
    allowed.extend(["is_edited", "edited_by", "edited_at"]);

    let update = build_update_sql(
        "scan_events",
        &Value::Object(changes),
        &allowed,
        "id",
        event_id,
    )?;

    let rows = execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, event_id, "Failed to edit scan event");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if rows == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Scan event not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scan event updated"
    })))
}

/// Delete endpoint for an authorized editor.
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{id}",
    params(("id" = u64, Path, description = "Scan event id")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_scan(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let event_id = path.into_inner();

    let result = sqlx::query("DELETE FROM scan_events WHERE id = ?")
        .bind(event_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, event_id, "Failed to delete scan event");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Scan event not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scan event deleted"
    })))
}
