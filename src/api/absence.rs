use crate::auth::auth::AuthUser;
use crate::model::absence_request::AbsenceRequest;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateAbsence {
    #[schema(example = "2024-07-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-07-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family trip", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AbsenceFilter {
    #[schema(example = 7)]
    /// Filter by cleaner
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by status
    pub status: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AbsenceListResponse {
    pub data: Vec<AbsenceRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/* =========================
Create absence request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/absences",
    request_body(
        content = CreateAbsence,
        description = "Absence request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Absence request submitted", body = Object,
         example = json!({
            "message": "Absence request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absence"
)]
pub async fn create_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAbsence>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No cleaner profile"))?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO absence_requests
            (tenant_id, employee_id, start_date, end_date, status, reason)
        VALUES (?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(auth.tenant_id)
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create absence request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence request submitted",
        "status": "pending"
    })))
}

/* =========================
Approve absence (Office/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/absences/{absence_id}/approve",
    params(
        ("absence_id" = u64, Path, description = "ID of the absence request to approve")
    ),
    responses(
        (status = 200, description = "Absence approved", body = Object, example = json!({
            "message": "Absence approved"
        })),
        (status = 400, description = "Not found or already processed", body = Object, example = json!({
            "message": "Absence request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absence"
)]
pub async fn approve_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let absence_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE absence_requests
        SET status = 'approved'
        WHERE id = ?
        AND tenant_id = ?
        AND status = 'pending'
        "#,
    )
    .bind(absence_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, absence_id, "Approve absence failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Absence request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence approved"
    })))
}

/* =========================
Reject absence (Office/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/absences/{absence_id}/reject",
    params(
        ("absence_id" = u64, Path, description = "ID of the absence request to reject")
    ),
    responses(
        (status = 200, description = "Absence rejected", body = Object, example = json!({
            "message": "Absence rejected"
        })),
        (status = 400, description = "Not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absence"
)]
pub async fn reject_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let absence_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE absence_requests
        SET status = 'rejected'
        WHERE id = ?
        AND tenant_id = ?
        AND status = 'pending'
        "#,
    )
    .bind(absence_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, absence_id, "Reject absence failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Absence request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence rejected"
    })))
}

/// for getting an absence request's details
#[utoipa::path(
    get,
    path = "/api/v1/absences/{absence_id}",
    params(
        ("absence_id" = u64, Path, description = "ID of the absence request to fetch")
    ),
    responses(
        (status = 200, description = "Absence request found", body = AbsenceRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Absence request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Absence"
)]
pub async fn get_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let absence_id = path.into_inner();

    let absence = sqlx::query_as::<_, AbsenceRequest>(
        r#"SELECT * FROM absence_requests WHERE id = ? AND tenant_id = ?"#,
    )
    .bind(absence_id)
    .bind(auth.tenant_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, absence_id, "Failed to fetch absence request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match absence {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Absence request not found"
        }))),
    }
}

/// for listing absence requests
#[utoipa::path(
    get,
    path = "/api/v1/absences",
    params(AbsenceFilter),
    responses(
        (status = 200, description = "Paginated absence list", body = AbsenceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absence"
)]
pub async fn absence_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AbsenceFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE tenant_id = ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if auth.is_cleaner() {
        // Cleaners only ever see their own requests
        let own_id = auth
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No cleaner record linked"))?;
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(own_id));
    } else if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM absence_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.tenant_id);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count absence requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT * FROM absence_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AbsenceRequest>(&data_sql).bind(auth.tenant_id);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let absences = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch absence list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = AbsenceListResponse {
        data: absences,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
