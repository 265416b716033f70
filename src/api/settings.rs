use actix_web::{web, HttpResponse, Responder};
use sqlx::MySqlPool;

use crate::model::group::GroupWorkSettings;

/// Current work-time window for a group; the `{10, 18}` default when the
/// group has never been configured.
#[utoipa::path(
    get,
    path = "/api/v1/group/{group_id}/settings",
    params(("group_id" = u64, Path, description = "Group id")),
    responses(
        (status = 200, description = "Work-time settings", body = GroupWorkSettings),
        (status = 500, description = "Internal server error")
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let group_id = path.into_inner();

    let settings = sqlx::query_as::<_, GroupWorkSettings>(
        r#"
        SELECT checkin_deadline_hour, checkout_start_hour
        FROM group_work_settings
        WHERE group_id = ?
        "#,
    )
    .bind(group_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, group_id, "Failed to fetch work settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    .unwrap_or_default();

    Ok(HttpResponse::Ok().json(settings))
}

/// Write-time guard for the window invariants; bad configs never reach the
/// classifier through this path.
#[utoipa::path(
    put,
    path = "/api/v1/group/{group_id}/settings",
    request_body = GroupWorkSettings,
    params(("group_id" = u64, Path, description = "Group id")),
    responses(
        (status = 200, description = "Settings saved"),
        (status = 400, description = "Hours out of range or deadline not before checkout start"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Settings"
)]
pub async fn put_settings(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<GroupWorkSettings>,
) -> actix_web::Result<impl Responder> {
    let group_id = path.into_inner();

    if let Err(reason) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": reason
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO group_work_settings (group_id, checkin_deadline_hour, checkout_start_hour)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE
            checkin_deadline_hour = VALUES(checkin_deadline_hour),
            checkout_start_hour = VALUES(checkout_start_hour)
        "#,
    )
    .bind(group_id)
    .bind(payload.checkin_deadline_hour)
    .bind(payload.checkout_start_hour)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, group_id, "Failed to save work settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Settings saved"
    })))
}
