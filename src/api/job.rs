use crate::api::cash::CashHandling;
use crate::api::schedule::{AssignmentRequest, run_validation};
use crate::auth::auth::AuthUser;
use crate::model::job::Job;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateJob {
    #[schema(example = 3)]
    pub client_id: u64,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "2024-07-01", format = "date", value_type = String)]
    pub scheduled_date: NaiveDate,
    #[schema(example = "10:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = 120)]
    pub duration_minutes: i32,
    #[schema(example = "bring ladder", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RescheduleJob {
    #[schema(example = 7)]
    pub employee_id: Option<u64>,
    #[schema(example = "2024-07-02", format = "date", value_type = String)]
    pub scheduled_date: Option<NaiveDate>,
    #[schema(example = "14:00:00", value_type = String)]
    pub start_time: Option<NaiveTime>,
    #[schema(example = 90)]
    pub duration_minutes: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteJob {
    /// Cash received on-site, if any. When present, `cash_handling` is
    /// mandatory so no cash goes unreconciled.
    #[schema(example = 50.0, nullable = true)]
    pub cash_amount: Option<f64>,

    #[schema(example = "kept_by_cleaner", nullable = true)]
    pub cash_handling: Option<CashHandling>,

    #[schema(example = "client paid in cash", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct JobFilter {
    #[schema(example = "2024-07-01", value_type = String, format = "date")]
    /// Filter by scheduled date
    pub date: Option<NaiveDate>,
    #[schema(example = 7)]
    /// Filter by cleaner
    pub employee_id: Option<u64>,
    #[schema(example = "scheduled")]
    /// Filter by status
    pub status: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct JobListResponse {
    pub data: Vec<Job>,
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
    Date(NaiveDate),
}

/* =========================
Create job (validated)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJob,
    responses(
        (status = 201, description = "Job scheduled", body = Object, example = json!({
            "message": "Job scheduled"
        })),
        (status = 400, description = "Schedule conflict", body = Object, example = json!({
            "message": "employee has an approved absence"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Job"
)]
pub async fn create_job(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateJob>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    if payload.duration_minutes <= 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "duration_minutes must be positive"
        })));
    }

    let request = AssignmentRequest {
        client_id: payload.client_id,
        employee_id: payload.employee_id,
        date: payload.scheduled_date,
        start_time: payload.start_time,
        duration_minutes: payload.duration_minutes,
        exclude_job_id: None,
    };

    let outcome = run_validation(pool.get_ref(), auth.tenant_id, &request).await;
    if !outcome.is_valid {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": outcome.message
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO jobs
        (tenant_id, client_id, employee_id, scheduled_date, start_time, duration_minutes, status, notes)
        VALUES (?, ?, ?, ?, ?, ?, 'scheduled', ?)
        "#,
    )
    .bind(auth.tenant_id)
    .bind(payload.client_id)
    .bind(payload.employee_id)
    .bind(payload.scheduled_date)
    .bind(payload.start_time)
    .bind(payload.duration_minutes)
    .bind(payload.notes.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create job");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Job scheduled"
    })))
}

/* =========================
List jobs
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(JobFilter),
    responses(
        (status = 200, description = "Paginated job list", body = JobListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Job"
)]
pub async fn list_jobs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<JobFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE tenant_id = ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(date) = query.date {
        where_sql.push_str(" AND scheduled_date = ?");
        args.push(FilterValue::Date(date));
    }

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    // Cleaners only ever see their own assignments
    if auth.is_cleaner() {
        if let Some(own_id) = auth.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(own_id));
        }
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM jobs{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.tenant_id);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count jobs");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT * FROM jobs
        {}
        ORDER BY scheduled_date DESC, start_time
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Job>(&data_sql).bind(auth.tenant_id);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let jobs = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch job list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(JobListResponse {
        data: jobs,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get job
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{job_id}",
    params(
        ("job_id" = u64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Job),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Job"
)]
pub async fn get_job(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let job_id = path.into_inner();

    let job = fetch_job(pool.get_ref(), auth.tenant_id, job_id).await?;

    match job {
        Some(j) => Ok(HttpResponse::Ok().json(j)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Job not found"
        }))),
    }
}

async fn fetch_job(
    pool: &MySqlPool,
    tenant_id: u64,
    job_id: u64,
) -> actix_web::Result<Option<Job>> {
    sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = ? AND tenant_id = ?"#)
        .bind(job_id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_id, "Failed to fetch job");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })
}

/* =========================
Reschedule job (re-validated)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{job_id}",
    params(
        ("job_id" = u64, Path, description = "Job ID")
    ),
    request_body = RescheduleJob,
    responses(
        (status = 200, description = "Job rescheduled", body = Object, example = json!({
            "message": "Job rescheduled"
        })),
        (status = 400, description = "Schedule conflict or job not reschedulable"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Job"
)]
pub async fn reschedule_job(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RescheduleJob>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let job_id = path.into_inner();

    let current = match fetch_job(pool.get_ref(), auth.tenant_id, job_id).await? {
        Some(j) => j,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Job not found"
            })));
        }
    };

    if current.status != "scheduled" {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Only scheduled jobs can be rescheduled"
        })));
    }

    let employee_id = payload.employee_id.unwrap_or(current.employee_id);
    let scheduled_date = payload.scheduled_date.unwrap_or(current.scheduled_date);
    let start_time = payload.start_time.unwrap_or(current.start_time);
    let duration_minutes = payload.duration_minutes.unwrap_or(current.duration_minutes);

    if duration_minutes <= 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "duration_minutes must be positive"
        })));
    }

    // Exclude the job's own row so it cannot conflict with itself.
    let request = AssignmentRequest {
        client_id: current.client_id,
        employee_id,
        date: scheduled_date,
        start_time,
        duration_minutes,
        exclude_job_id: Some(job_id),
    };

    let outcome = run_validation(pool.get_ref(), auth.tenant_id, &request).await;
    if !outcome.is_valid {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": outcome.message
        })));
    }

    sqlx::query(
        r#"
        UPDATE jobs
        SET employee_id = ?, scheduled_date = ?, start_time = ?, duration_minutes = ?
        WHERE id = ? AND tenant_id = ?
        "#,
    )
    .bind(employee_id)
    .bind(scheduled_date)
    .bind(start_time)
    .bind(duration_minutes)
    .bind(job_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, job_id, "Failed to reschedule job");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Job rescheduled"
    })))
}

/* =========================
Cancel job
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{job_id}/cancel",
    params(
        ("job_id" = u64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job cancelled", body = Object, example = json!({
            "message": "Job cancelled"
        })),
        (status = 400, description = "Job not found or not cancellable")
    ),
    security(("bearer_auth" = [])),
    tag = "Job"
)]
pub async fn cancel_job(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let job_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET status = 'cancelled'
        WHERE id = ?
        AND tenant_id = ?
        AND status = 'scheduled'
        "#,
    )
    .bind(job_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, job_id, "Cancel job failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Job not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Job cancelled"
    })))
}

/* =========================
Complete job (+ cash handling)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{job_id}/complete",
    params(
        ("job_id" = u64, Path, description = "Job ID")
    ),
    request_body = CompleteJob,
    responses(
        (status = 200, description = "Job completed", body = Object, example = json!({
            "message": "Job completed"
        })),
        (status = 400, description = "Missing cash handling choice or job not completable", body = Object, example = json!({
            "message": "cash_handling is required when cash was collected"
        })),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Job"
)]
pub async fn complete_job(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CompleteJob>,
) -> actix_web::Result<impl Responder> {
    let job_id = path.into_inner();

    // The disposition decision is blocking: cash recorded without a handling
    // choice would be unreconcilable.
    let cash = match (payload.cash_amount, payload.cash_handling) {
        (Some(amount), Some(handling)) => {
            if amount <= 0.0 {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "cash_amount must be positive"
                })));
            }
            Some((amount, handling))
        }
        (Some(_), None) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "cash_handling is required when cash was collected"
            })));
        }
        (None, _) => None,
    };

    let current = match fetch_job(pool.get_ref(), auth.tenant_id, job_id).await? {
        Some(j) => j,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Job not found"
            })));
        }
    };

    // Cleaners may only complete jobs assigned to them
    if auth.is_cleaner() && auth.employee_id != Some(current.employee_id) {
        return Err(actix_web::error::ErrorForbidden("Not your assignment"));
    }

    let mut tx = pool.get_ref().begin().await.map_err(|e| {
        tracing::error!(error = %e, job_id, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET status = 'completed'
        WHERE id = ?
        AND tenant_id = ?
        AND status = 'scheduled'
        "#,
    )
    .bind(job_id)
    .bind(auth.tenant_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, job_id, "Complete job failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Job not found or already processed"
        })));
    }

    if let Some((amount, handling)) = cash {
        sqlx::query(
            r#"
            INSERT INTO cash_collections
            (tenant_id, job_id, client_id, employee_id, amount, cash_handling,
             compensation_status, service_date, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(auth.tenant_id)
        .bind(job_id)
        .bind(current.client_id)
        .bind(current.employee_id)
        .bind(amount)
        .bind(handling.as_str())
        .bind(handling.initial_compensation_status())
        .bind(current.scheduled_date)
        .bind(payload.notes.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_id, "Failed to record cash collection");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, job_id, "Failed to commit job completion");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Job completed"
    })))
}
