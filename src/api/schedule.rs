use crate::auth::auth::AuthUser;
use crate::core::schedule::{
    BookedSlot, Candidate, ValidationOutcome, check_assignment, minutes_from_midnight,
    unavailable_employees,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignmentRequest {
    #[schema(example = 3)]
    pub client_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-07-01", format = "date", value_type = String)]
    pub date: NaiveDate,

    #[schema(example = "10:00:00", value_type = String)]
    pub start_time: NaiveTime,

    #[schema(example = 120)]
    pub duration_minutes: i32,

    /// Set when re-validating an edit so the job does not conflict with itself
    #[schema(example = 15, nullable = true)]
    pub exclude_job_id: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AvailableCleanersQuery {
    #[schema(example = "2024-07-01", format = "date", value_type = String)]
    pub date: NaiveDate,

    #[schema(example = "10:00:00", value_type = String)]
    pub start_time: NaiveTime,

    #[schema(example = 120)]
    pub duration_minutes: i32,

    #[schema(example = 15)]
    pub exclude_job_id: Option<u64>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct AvailableCleaner {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Lopez")]
    pub last_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct AvailableCleanersResponse {
    pub data: Vec<AvailableCleaner>,
}

async fn employee_absent(
    pool: &MySqlPool,
    tenant_id: u64,
    employee_id: u64,
    date: NaiveDate,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM absence_requests
            WHERE tenant_id = ?
              AND employee_id = ?
              AND status = 'approved'
              AND start_date <= ?
              AND end_date >= ?
        )
        "#,
    )
    .bind(tenant_id)
    .bind(employee_id)
    .bind(date)
    .bind(date)
    .fetch_one(pool)
    .await
}

async fn absent_employee_ids(
    pool: &MySqlPool,
    tenant_id: u64,
    date: NaiveDate,
) -> sqlx::Result<Vec<u64>> {
    let rows = sqlx::query_as::<_, (u64,)>(
        r#"
        SELECT DISTINCT employee_id FROM absence_requests
        WHERE tenant_id = ?
          AND status = 'approved'
          AND start_date <= ?
          AND end_date >= ?
        "#,
    )
    .bind(tenant_id)
    .bind(date)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// All non-cancelled bookings for the tenant on `date`, worker name included
/// so conflict messages can name the double-booked cleaner.
async fn booked_slots(
    pool: &MySqlPool,
    tenant_id: u64,
    date: NaiveDate,
) -> sqlx::Result<Vec<BookedSlot>> {
    let rows = sqlx::query_as::<_, (u64, u64, u64, NaiveTime, i32, String, String)>(
        r#"
        SELECT j.id, j.client_id, j.employee_id, j.start_time, j.duration_minutes,
               e.first_name, e.last_name
        FROM jobs j
        JOIN employees e ON e.id = j.employee_id
        WHERE j.tenant_id = ?
          AND j.scheduled_date = ?
          AND j.status <> 'cancelled'
        "#,
    )
    .bind(tenant_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(job_id, client_id, employee_id, start_time, duration_minutes, first, last)| {
                BookedSlot {
                    job_id,
                    client_id,
                    employee_id,
                    employee_name: format!("{} {}", first, last),
                    start_minutes: minutes_from_midnight(start_time),
                    duration_minutes,
                }
            },
        )
        .collect())
}

/// Runs the full admissibility check for a proposed assignment.
///
/// Fail-open on read errors: a transient DB failure must never block
/// scheduling, so any fetch error is logged and the assignment is reported as
/// valid. Do not tighten this without a product decision.
pub async fn run_validation(
    pool: &MySqlPool,
    tenant_id: u64,
    request: &AssignmentRequest,
) -> ValidationOutcome {
    let absent = match employee_absent(pool, tenant_id, request.employee_id, request.date).await {
        Ok(absent) => absent,
        Err(e) => {
            tracing::warn!(error = %e, tenant_id, "Absence check failed, treating as available");
            return ValidationOutcome::valid();
        }
    };

    let mut booked = match booked_slots(pool, tenant_id, request.date).await {
        Ok(slots) => slots,
        Err(e) => {
            tracing::warn!(error = %e, tenant_id, "Booked slot fetch failed, skipping conflict check");
            return ValidationOutcome::valid();
        }
    };

    if let Some(exclude) = request.exclude_job_id {
        booked.retain(|slot| slot.job_id != exclude);
    }

    let candidate = Candidate {
        client_id: request.client_id,
        employee_id: request.employee_id,
        start_minutes: minutes_from_midnight(request.start_time),
        duration_minutes: request.duration_minutes,
    };

    check_assignment(&candidate, absent, &booked)
}

/// Pre-check a proposed assignment
#[utoipa::path(
    post,
    path = "/api/v1/schedule/validate",
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Validation outcome (never an HTTP error)", body = ValidationOutcome),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn validate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignmentRequest>,
) -> actix_web::Result<impl Responder> {
    let outcome = run_validation(pool.get_ref(), auth.tenant_id, &payload).await;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Cleaners free to take a slot
#[utoipa::path(
    get,
    path = "/api/v1/schedule/available-cleaners",
    params(AvailableCleanersQuery),
    responses(
        (status = 200, description = "Active cleaners minus absent and double-booked ones", body = AvailableCleanersResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn available_cleaners(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AvailableCleanersQuery>,
) -> actix_web::Result<impl Responder> {
    let tenant_id = auth.tenant_id;

    let cleaners = sqlx::query_as::<_, AvailableCleaner>(
        r#"
        SELECT id, first_name, last_name
        FROM employees
        WHERE tenant_id = ? AND status = 'active'
        ORDER BY first_name, last_name
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, tenant_id, "Failed to fetch cleaners");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Same fail-open stance as validation: a failed availability read must not
    // empty the picker, so errors degrade to "nobody is unavailable".
    let absent = absent_employee_ids(pool.get_ref(), tenant_id, query.date)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, tenant_id, "Absence fetch failed for availability");
            Vec::new()
        });

    let mut booked = booked_slots(pool.get_ref(), tenant_id, query.date)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, tenant_id, "Booking fetch failed for availability");
            Vec::new()
        });

    if let Some(exclude) = query.exclude_job_id {
        booked.retain(|slot| slot.job_id != exclude);
    }

    let unavailable = unavailable_employees(
        minutes_from_midnight(query.start_time),
        query.duration_minutes,
        &absent,
        &booked,
    );

    let data: Vec<AvailableCleaner> = cleaners
        .into_iter()
        .filter(|c| !unavailable.contains(&c.id))
        .collect();

    Ok(HttpResponse::Ok().json(AvailableCleanersResponse { data }))
}
