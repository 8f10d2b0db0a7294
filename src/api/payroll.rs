use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::wages::{aggregate_hours, compute_wages, round2};
use crate::model::payroll::{PayrollEntry, PayrollPeriod};
use crate::utils::tax_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[schema(example = "2024-06-14", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkPaid {
    /// Defaults to today when omitted
    #[schema(example = "2024-06-20", format = "date", value_type = String, nullable = true)]
    pub pay_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct PeriodListResponse {
    pub data: Vec<PayrollPeriod>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct PeriodDetailResponse {
    pub period: PayrollPeriod,
    pub entries: Vec<PayrollEntry>,
}

/// Read-only reminder state derived from the period's dates.
#[derive(Serialize, ToSchema)]
pub struct PeriodReminder {
    #[schema(example = true)]
    pub period_ended: bool,
    #[schema(example = true)]
    pub needs_action: bool,
    #[schema(example = 3)]
    pub days_overdue: i64,
}

/* =========================
Generate payroll period (Admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Period generated", body = Object, example = json!({
            "message": "Payroll period generated",
            "period_id": 12,
            "workers": 5
        })),
        (status = 400, description = "Bad date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let tenant_id = auth.tenant_id;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    // Tax configuration for the year the period ends in, defaults when unset.
    let rates = tax_cache::rates_for(pool.get_ref(), tenant_id, payload.end_date.year())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, tenant_id, "Failed to load tax configuration");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // The whole create-aggregate-insert-update sequence is one transaction so
    // a failure never leaves a pending period with wrong totals.
    let mut tx = pool.get_ref().begin().await.map_err(|e| {
        tracing::error!(error = %e, tenant_id, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let period_name = format!("{} - {}", payload.start_date, payload.end_date);

    let inserted = sqlx::query(
        r#"
        INSERT INTO payroll_periods
        (tenant_id, period_name, start_date, end_date, status,
         total_hours, total_gross, total_deductions, total_net)
        VALUES (?, ?, ?, ?, 'pending', 0, 0, 0, 0)
        "#,
    )
    .bind(tenant_id)
    .bind(period_name.as_str())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, tenant_id, "Failed to create payroll period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let period_id = inserted.last_insert_id();

    let completed: Vec<(u64, i32)> = sqlx::query_as(
        r#"
        SELECT employee_id, duration_minutes
        FROM jobs
        WHERE tenant_id = ?
          AND status = 'completed'
          AND scheduled_date BETWEEN ? AND ?
        "#,
    )
    .bind(tenant_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, tenant_id, "Failed to fetch completed jobs");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let minutes: Vec<(u64, i64)> = completed
        .into_iter()
        .map(|(id, mins)| (id, mins as i64))
        .collect();
    let hours_by_employee = aggregate_hours(&minutes);

    let mut total_hours = 0.0;
    let mut total_gross = 0.0;
    let mut total_deductions = 0.0;
    let mut total_net = 0.0;

    for (employee_id, hours) in &hours_by_employee {
        let hourly_rate: Option<f64> = sqlx::query_scalar::<_, Option<f64>>(
            r#"SELECT hourly_rate FROM employees WHERE id = ? AND tenant_id = ?"#,
        )
        .bind(*employee_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch hourly rate");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .flatten();

        let hourly_rate = hourly_rate.unwrap_or(config.default_hourly_rate);

        let breakdown = compute_wages(*hours, hourly_rate, &rates);

        // Overtime is recorded but never split out here; computing it from
        // provincial rules is a separate extension point.
        sqlx::query(
            r#"
            INSERT INTO payroll_entries
            (period_id, employee_id, regular_hours, overtime_hours, hourly_rate,
             gross_pay, pension_deduction, insurance_deduction, tax_deduction, net_pay)
            VALUES (?, ?, ?, 0, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(period_id)
        .bind(*employee_id)
        .bind(breakdown.regular_hours)
        .bind(breakdown.hourly_rate)
        .bind(breakdown.gross_pay)
        .bind(breakdown.pension_deduction)
        .bind(breakdown.insurance_deduction)
        .bind(breakdown.tax_deduction)
        .bind(breakdown.net_pay)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to insert payroll entry");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        total_hours += breakdown.regular_hours;
        total_gross += breakdown.gross_pay;
        total_deductions += breakdown.total_deductions();
        total_net += breakdown.net_pay;
    }

    sqlx::query(
        r#"
        UPDATE payroll_periods
        SET total_hours = ?, total_gross = ?, total_deductions = ?, total_net = ?
        WHERE id = ?
        "#,
    )
    .bind(round2(total_hours))
    .bind(round2(total_gross))
    .bind(round2(total_deductions))
    .bind(round2(total_net))
    .bind(period_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to update period totals");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to commit payroll generation");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tracing::info!(
        tenant_id,
        period_id,
        workers = hours_by_employee.len(),
        generated_by = %auth.username,
        "Payroll period generated"
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Payroll period generated",
        "period_id": period_id,
        "workers": hours_by_employee.len()
    })))
}

/* =========================
List periods
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Paginated period list", body = PeriodListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_periods(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE tenant_id = ?");
    if query.status.is_some() {
        where_sql.push_str(" AND status = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM payroll_periods{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.tenant_id);
    if let Some(status) = query.status.as_deref() {
        count_q = count_q.bind(status);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count payroll periods");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT * FROM payroll_periods
        {}
        ORDER BY start_date DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, PayrollPeriod>(&data_sql).bind(auth.tenant_id);
    if let Some(status) = query.status.as_deref() {
        data_q = data_q.bind(status);
    }

    let periods = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch payroll periods");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PeriodListResponse {
        data: periods,
        page,
        per_page,
        total,
    }))
}

async fn fetch_period(
    pool: &MySqlPool,
    tenant_id: u64,
    period_id: u64,
) -> actix_web::Result<Option<PayrollPeriod>> {
    sqlx::query_as::<_, PayrollPeriod>(
        r#"SELECT * FROM payroll_periods WHERE id = ? AND tenant_id = ?"#,
    )
    .bind(period_id)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to fetch payroll period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

/* =========================
Get period with entries
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{period_id}",
    params(
        ("period_id" = u64, Path, description = "Payroll period ID")
    ),
    responses(
        (status = 200, description = "Period with entries", body = PeriodDetailResponse),
        (status = 404, description = "Period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let period_id = path.into_inner();

    let period = match fetch_period(pool.get_ref(), auth.tenant_id, period_id).await? {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll period not found"
            })));
        }
    };

    let entries = sqlx::query_as::<_, PayrollEntry>(
        r#"SELECT * FROM payroll_entries WHERE period_id = ? ORDER BY employee_id"#,
    )
    .bind(period_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to fetch payroll entries");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(PeriodDetailResponse { period, entries }))
}

/* =========================
Approve period (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{period_id}/approve",
    params(
        ("period_id" = u64, Path, description = "Payroll period ID")
    ),
    responses(
        (status = 200, description = "Period approved", body = Object, example = json!({
            "message": "Payroll period approved"
        })),
        (status = 400, description = "Not found or not pending", body = Object, example = json!({
            "message": "Payroll period not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn approve_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let period_id = path.into_inner();

    // No recomputation at approval; totals were fixed at generation.
    let result = sqlx::query(
        r#"
        UPDATE payroll_periods
        SET status = 'approved', approved_by = ?, approved_at = NOW()
        WHERE id = ?
        AND tenant_id = ?
        AND status = 'pending'
        "#,
    )
    .bind(auth.user_id)
    .bind(period_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Approve period failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Payroll period not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll period approved"
    })))
}

/* =========================
Mark period paid (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{period_id}/pay",
    params(
        ("period_id" = u64, Path, description = "Payroll period ID")
    ),
    request_body = MarkPaid,
    responses(
        (status = 200, description = "Period marked paid", body = Object, example = json!({
            "message": "Payroll period marked as paid"
        })),
        (status = 400, description = "Not found or not approved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn mark_paid(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<MarkPaid>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let period_id = path.into_inner();
    let pay_date = payload.pay_date.unwrap_or_else(|| Utc::now().date_naive());

    let result = sqlx::query(
        r#"
        UPDATE payroll_periods
        SET status = 'paid', pay_date = ?
        WHERE id = ?
        AND tenant_id = ?
        AND status = 'approved'
        "#,
    )
    .bind(pay_date)
    .bind(period_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Mark paid failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Payroll period not found or not approved"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll period marked as paid"
    })))
}

/// Derives the reminder flags for a period as of `today`.
pub fn reminder_state(end_date: NaiveDate, status: &str, today: NaiveDate) -> PeriodReminder {
    let period_ended = today > end_date;
    PeriodReminder {
        period_ended,
        needs_action: period_ended && status == "pending",
        days_overdue: if period_ended {
            (today - end_date).num_days()
        } else {
            0
        },
    }
}

/* =========================
Reminder state (read-only)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{period_id}/reminder",
    params(
        ("period_id" = u64, Path, description = "Payroll period ID")
    ),
    responses(
        (status = 200, description = "Reminder flags", body = PeriodReminder),
        (status = 404, description = "Period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn period_reminder(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let period_id = path.into_inner();

    let period = match fetch_period(pool.get_ref(), auth.tenant_id, period_id).await? {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll period not found"
            })));
        }
    };

    let reminder = reminder_state(period.end_date, &period.status, Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(reminder))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn reminder_before_period_end() {
        let r = reminder_state(date("2024-06-14"), "pending", date("2024-06-10"));
        assert!(!r.period_ended);
        assert!(!r.needs_action);
        assert_eq!(r.days_overdue, 0);
    }

    #[test]
    fn reminder_on_end_date_is_not_overdue() {
        let r = reminder_state(date("2024-06-14"), "pending", date("2024-06-14"));
        assert!(!r.period_ended);
        assert_eq!(r.days_overdue, 0);
    }

    #[test]
    fn reminder_after_end_needs_action_while_pending() {
        let r = reminder_state(date("2024-06-14"), "pending", date("2024-06-17"));
        assert!(r.period_ended);
        assert!(r.needs_action);
        assert_eq!(r.days_overdue, 3);
    }

    #[test]
    fn approved_period_needs_no_action() {
        let r = reminder_state(date("2024-06-14"), "approved", date("2024-06-17"));
        assert!(r.period_ended);
        assert!(!r.needs_action);
        assert_eq!(r.days_overdue, 3);
    }
}
