use crate::{
    auth::auth::AuthUser,
    model::client::Client,
    utils::client_name_cache,
    utils::client_name_filter,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

const UPDATABLE_COLUMNS: &[&str] = &["address", "phone", "status"];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateClient {
    #[schema(example = "Lakeside Dental Office")]
    pub name: String,
    #[schema(example = "200 Lakeshore Blvd W", nullable = true)]
    pub address: Option<String>,
    #[schema(example = "+14165550178", nullable = true)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClientListResponse {
    pub data: Vec<Client>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

// Helper enum for typed SQLx binding; owned because LIKE patterns are built locally
enum FilterValue {
    U64(u64),
    Str(String),
}

/// true  => name AVAILABLE for this tenant
/// false => name TAKEN
pub async fn is_client_name_available(tenant_id: u64, name: &str, pool: &MySqlPool) -> bool {
    // 1. Cuckoo filter, fast negative
    if !client_name_filter::might_exist(tenant_id, name) {
        return true;
    }

    // 2. Moka cache, fast positive
    if client_name_cache::is_taken(tenant_id, name).await {
        return false;
    }

    // 3. Database fallback
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM clients WHERE tenant_id = ? AND LOWER(name) = ? LIMIT 1)",
    )
    .bind(tenant_id)
    .bind(name.trim().to_lowercase())
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe: treat errors as taken

    !exists
}

async fn insert_client(
    tenant_id: u64,
    payload: &CreateClient,
    pool: &MySqlPool,
) -> Result<(), HttpResponse> {
    let result = sqlx::query(
        r#"
        INSERT INTO clients (tenant_id, name, address, phone, status)
        VALUES (?, ?, ?, ?, 'active')
        "#,
    )
    .bind(tenant_id)
    .bind(payload.name.trim())
    .bind(payload.address.as_deref())
    .bind(payload.phone.as_deref())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            // keep the filter and cache in sync with the insert
            client_name_filter::insert(tenant_id, &payload.name);
            client_name_cache::mark_taken(tenant_id, &payload.name).await;
            Ok(())
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(HttpResponse::Conflict().json(json!({
                        "message": "A client with this name already exists"
                    })));
                }
            }

            error!(error = %e, tenant_id, "Failed to create client");
            Err(HttpResponse::InternalServerError().json(json!({
                "message": "Failed to create client"
            })))
        }
    }
}

/// Create client
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client created", body = Object, example = json!({
            "message": "Client created"
        })),
        (status = 409, description = "Duplicate client name", body = Object, example = json!({
            "message": "A client with this name already exists"
        })),
        (status = 400, description = "Bad request")
    ),
    tag = "Client",
    security(("bearer_auth" = []))
)]
pub async fn create_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateClient>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Client name must not be empty"
        })));
    }

    if !is_client_name_available(auth.tenant_id, name, pool.get_ref()).await {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "A client with this name already exists"
        })));
    }

    match insert_client(auth.tenant_id, &payload, pool.get_ref()).await {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Client created"
        }))),
        Err(err_resp) => Ok(err_resp),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("status", Query, description = "Filter by status"),
        ("search", Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Paginated client list", body = ClientListResponse)
    ),
    tag = "Client",
    security(("bearer_auth" = []))
)]
pub async fn list_clients(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ClientQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = vec!["tenant_id = ?"];
    let mut bindings: Vec<FilterValue> = vec![FilterValue::U64(auth.tenant_id)];

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(FilterValue::Str(status.clone()));
    }

    if let Some(search) = &query.search {
        conditions.push("name LIKE ?");
        bindings.push(FilterValue::Str(format!("%{}%", search)));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) as total FROM clients {}", where_clause);
    debug!(sql = %count_sql, "Counting clients");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.as_str()),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count clients");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT * FROM clients {} ORDER BY name LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, Client>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::U64(v) => data_query.bind(*v),
            FilterValue::Str(s) => data_query.bind(s.as_str()),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let clients = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch clients");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(ClientListResponse {
        data: clients,
        page,
        per_page,
        total,
    }))
}

/// Get client by ID
#[utoipa::path(
    get,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id", Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client found", body = Client),
        (status = 404, description = "Client not found")
    ),
    tag = "Client",
    security(("bearer_auth" = []))
)]
pub async fn get_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let client_id = path.into_inner();

    let client =
        sqlx::query_as::<_, Client>(r#"SELECT * FROM clients WHERE id = ? AND tenant_id = ?"#)
            .bind(client_id)
            .bind(auth.tenant_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, client_id, "Failed to fetch client");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    match client {
        Some(c) => Ok(HttpResponse::Ok().json(c)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Client not found"
        }))),
    }
}

/// Update client (name changes go through delete/create to keep the
/// duplicate filter coherent)
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id", Path, description = "Client ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Client updated"),
        (status = 404, description = "Client not found")
    ),
    tag = "Client",
    security(("bearer_auth" = []))
)]
pub async fn update_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let client_id = path.into_inner();

    let update = build_update_sql(
        "clients",
        &body,
        UPDATABLE_COLUMNS,
        client_id,
        auth.tenant_id,
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Client not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Client updated"
    })))
}

/// Delete client
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id", Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Client not found")
    ),
    tag = "Client",
    security(("bearer_auth" = []))
)]
pub async fn delete_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_office_or_admin()?;

    let client_id = path.into_inner();

    // fetch the name first so the filter entry can be removed
    let name: Option<String> =
        sqlx::query_scalar(r#"SELECT name FROM clients WHERE id = ? AND tenant_id = ?"#)
            .bind(client_id)
            .bind(auth.tenant_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, client_id, "Failed to fetch client for delete");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let name = match name {
        Some(n) => n,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Client not found"
            })));
        }
    };

    sqlx::query(r#"DELETE FROM clients WHERE id = ? AND tenant_id = ?"#)
        .bind(client_id)
        .bind(auth.tenant_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, client_id, "Failed to delete client");
            ErrorInternalServerError("Internal Server Error")
        })?;

    client_name_filter::remove(auth.tenant_id, &name);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
