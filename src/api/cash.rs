use crate::auth::auth::AuthUser;
use crate::model::cash_collection::CashCollection;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CashHandling {
    KeptByCleaner,
    DeliveredToOffice,
}

impl CashHandling {
    pub fn as_str(&self) -> &str {
        match self {
            CashHandling::KeptByCleaner => "kept_by_cleaner",
            CashHandling::DeliveredToOffice => "delivered_to_office",
        }
    }

    /// Cash kept by the cleaner enters the compensation workflow; cash handed
    /// to the office needs no tracking.
    pub fn initial_compensation_status(&self) -> &str {
        match self {
            CashHandling::KeptByCleaner => "pending",
            CashHandling::DeliveredToOffice => "not_applicable",
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CashFilter {
    #[schema(example = "pending")]
    /// Filter by compensation status
    pub status: Option<String>,
    #[schema(example = 7)]
    /// Filter by cleaner
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct CashListResponse {
    pub data: Vec<CashCollection>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct DisputeCash {
    #[schema(example = "amount does not match invoice")]
    pub reason: String,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/* =========================
List cash collections
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/cash",
    params(CashFilter),
    responses(
        (status = 200, description = "Paginated cash collection list", body = CashListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Cash"
)]
pub async fn cash_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CashFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE tenant_id = ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND compensation_status = ?");
        args.push(FilterValue::Str(status));
    }

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    let count_sql = format!("SELECT COUNT(*) FROM cash_collections{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.tenant_id);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count cash collections");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT * FROM cash_collections
        {}
        ORDER BY service_date DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, CashCollection>(&data_sql).bind(auth.tenant_id);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let collections = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch cash collections");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(CashListResponse {
        data: collections,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get one cash collection
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/cash/{cash_id}",
    params(
        ("cash_id" = u64, Path, description = "Cash collection ID")
    ),
    responses(
        (status = 200, description = "Cash collection found", body = CashCollection),
        (status = 404, description = "Cash collection not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cash"
)]
pub async fn get_cash(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let cash_id = path.into_inner();

    let collection = sqlx::query_as::<_, CashCollection>(
        r#"SELECT * FROM cash_collections WHERE id = ? AND tenant_id = ?"#,
    )
    .bind(cash_id)
    .bind(auth.tenant_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, cash_id, "Failed to fetch cash collection");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match collection {
        Some(c) => Ok(HttpResponse::Ok().json(c)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Cash collection not found"
        }))),
    }
}

/* =========================
Approve compensation (Office/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/cash/{cash_id}/approve",
    params(
        ("cash_id" = u64, Path, description = "Cash collection ID")
    ),
    responses(
        (status = 200, description = "Compensation approved", body = Object, example = json!({
            "message": "Cash collection approved"
        })),
        (status = 400, description = "Not found or not pending", body = Object, example = json!({
            "message": "Cash collection not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Cash"
)]
pub async fn approve_cash(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let cash_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE cash_collections
        SET compensation_status = 'approved', approved_by = ?, approved_at = NOW()
        WHERE id = ?
        AND tenant_id = ?
        AND compensation_status = 'pending'
        "#,
    )
    .bind(auth.user_id)
    .bind(cash_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, cash_id, "Approve cash collection failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Cash collection not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Cash collection approved"
    })))
}

/// Trimmed dispute reason, or None when blank.
fn dispute_reason(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/* =========================
Dispute compensation (Office/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/cash/{cash_id}/dispute",
    params(
        ("cash_id" = u64, Path, description = "Cash collection ID")
    ),
    request_body = DisputeCash,
    responses(
        (status = 200, description = "Compensation disputed", body = Object, example = json!({
            "message": "Cash collection disputed"
        })),
        (status = 400, description = "Blank reason, not found, or not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Cash"
)]
pub async fn dispute_cash(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DisputeCash>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let cash_id = path.into_inner();

    // Refused before any DB work; a dispute without a reason is meaningless.
    let Some(reason) = dispute_reason(&payload.reason) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "A dispute reason is required"
        })));
    };

    let result = sqlx::query(
        r#"
        UPDATE cash_collections
        SET compensation_status = 'disputed', dispute_reason = ?
        WHERE id = ?
        AND tenant_id = ?
        AND compensation_status = 'pending'
        "#,
    )
    .bind(reason)
    .bind(cash_id)
    .bind(auth.tenant_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, cash_id, "Dispute cash collection failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Cash collection not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Cash collection disputed"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kept_cash_enters_compensation_workflow() {
        assert_eq!(
            CashHandling::KeptByCleaner.initial_compensation_status(),
            "pending"
        );
        assert_eq!(
            CashHandling::DeliveredToOffice.initial_compensation_status(),
            "not_applicable"
        );
    }

    #[test]
    fn blank_dispute_reason_is_refused() {
        assert_eq!(dispute_reason(""), None);
        assert_eq!(dispute_reason("   "), None);
        assert_eq!(dispute_reason("\t\n"), None);
        assert_eq!(dispute_reason("  short change  "), Some("short change"));
    }

    #[test]
    fn handling_serializes_snake_case() {
        let parsed: CashHandling = serde_json::from_str("\"kept_by_cleaner\"").unwrap();
        assert_eq!(parsed.as_str(), "kept_by_cleaner");
        let parsed: CashHandling = serde_json::from_str("\"delivered_to_office\"").unwrap();
        assert_eq!(parsed.as_str(), "delivered_to_office");
    }
}
