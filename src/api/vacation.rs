use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::model::vacation::{VacationRequest, VacationType};

#[derive(Deserialize, ToSchema)]
pub struct CreateVacation {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub group_id: u64,
    #[schema(example = "annual", value_type = String)]
    pub vacation_type: VacationType,
    #[schema(example = "2025-07-09", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-07-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family trip")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewBody {
    /// Optional reviewer note stored alongside the decision.
    pub comment: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct VacationFilter {
    /// Filter by user ID
    pub user_id: Option<u64>,
    /// Filter by group ID
    pub group_id: Option<u64>,
    /// Filter by request status (pending/approved/rejected)
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct VacationListResponse {
    pub data: Vec<VacationRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Clamped `(page, per_page, offset)` from the raw query values. Both inputs
/// come straight off the URL, so the page is bounded before the offset
/// multiplication can overflow.
fn page_window(page: Option<u64>, per_page: Option<u64>) -> (u64, u64, u64) {
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let page = page.unwrap_or(1).clamp(1, u64::from(u32::MAX));
    (page, per_page, (page - 1) * per_page)
}

/* =========================
Create vacation request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/vacation",
    request_body = CreateVacation,
    responses(
        (status = 200, description = "Vacation request submitted", body = Object, example = json!({
            "message": "Vacation request submitted", "status": "pending"
        })),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn create_vacation(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateVacation>,
) -> actix_web::Result<impl Responder> {
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO vacation_requests
            (user_id, group_id, vacation_type, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.group_id)
    .bind(payload.vacation_type)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = payload.user_id, "Failed to create vacation request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Vacation request submitted",
        "status": "pending"
    })))
}

async fn review(
    pool: &MySqlPool,
    vacation_id: u64,
    decision: &str,
    comment: Option<&str>,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query(
        r#"
        UPDATE vacation_requests
        SET status = ?, reviewed_at = ?, review_comment = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(decision)
    .bind(Utc::now())
    .bind(comment)
    .bind(vacation_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, vacation_id, decision, "Vacation review failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Vacation request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Vacation {decision}")
    })))
}

/* =========================
Approve vacation (faculty)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/vacation/{vacation_id}/approve",
    params(("vacation_id" = u64, Path, description = "ID of the vacation request to approve")),
    request_body(content = ReviewBody, content_type = "application/json"),
    responses(
        (status = 200, description = "Vacation approved"),
        (status = 400, description = "Vacation request not found or already processed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn approve_vacation(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: Option<web::Json<ReviewBody>>,
) -> actix_web::Result<impl Responder> {
    let comment = body.as_ref().and_then(|b| b.comment.as_deref());
    review(pool.get_ref(), path.into_inner(), "approved", comment).await
}

/* =========================
Reject vacation (faculty)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/vacation/{vacation_id}/reject",
    params(("vacation_id" = u64, Path, description = "ID of the vacation request to reject")),
    request_body(content = ReviewBody, content_type = "application/json"),
    responses(
        (status = 200, description = "Vacation rejected"),
        (status = 400, description = "Vacation request not found or already processed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn reject_vacation(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: Option<web::Json<ReviewBody>>,
) -> actix_web::Result<impl Responder> {
    let comment = body.as_ref().and_then(|b| b.comment.as_deref());
    review(pool.get_ref(), path.into_inner(), "rejected", comment).await
}

/// Vacation request details
#[utoipa::path(
    get,
    path = "/api/v1/vacation/{vacation_id}",
    params(("vacation_id" = u64, Path, description = "ID of the vacation request to fetch")),
    responses(
        (status = 200, description = "Vacation request found", body = VacationRequest),
        (status = 404, description = "Vacation request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn get_vacation(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let vacation_id = path.into_inner();

    let vacation = sqlx::query_as::<_, VacationRequest>(
        r#"
        SELECT id, user_id, group_id, vacation_type, start_date, end_date,
               reason, status, reviewed_at, review_comment
        FROM vacation_requests
        WHERE id = ?
        "#,
    )
    .bind(vacation_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, vacation_id, "Failed to fetch vacation request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match vacation {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Vacation request not found"
        }))),
    }
}

/// Paginated vacation request listing
#[utoipa::path(
    get,
    path = "/api/v1/vacation",
    params(VacationFilter),
    responses(
        (status = 200, description = "Paginated vacation list", body = VacationListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Vacation"
)]
pub async fn vacation_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<VacationFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let (page, per_page, offset) = page_window(query.page, query.per_page);

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(user_id) = query.user_id {
        where_sql.push_str(" AND user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(group_id) = query.group_id {
        where_sql.push_str(" AND group_id = ?");
        args.push(FilterValue::U64(group_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM vacation_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count vacation requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, user_id, group_id, vacation_type, start_date, end_date,
               reason, status, reviewed_at, review_comment
        FROM vacation_requests
        {}
        ORDER BY start_date DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, VacationRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let requests = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch vacation list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = VacationListResponse {
        data: requests,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
