use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::schema::clientes;

use super::orders::{load_order_responses, OrderResponse};
use super::{require_id, require_nome};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerPayload {
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i32,
    pub nome: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub criado_em: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        CustomerResponse {
            id: c.id,
            nome: c.nome,
            telefone: c.telefone,
            endereco: c.endereco,
            criado_em: c.criado_em,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/clientes
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/clientes",
    responses(
        (status = 200, description = "All customers ordered by name", body = [CustomerResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "clientes"
)]
pub async fn list_customers(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows = clientes::table
            .select(Customer::as_select())
            .order(clientes::nome.asc())
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<CustomerResponse> = rows.into_iter().map(CustomerResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/clientes
#[utoipa::path(
    post,
    context_path = "/api",
    path = "/clientes",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Missing name"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "clientes"
)]
pub async fn create_customer(
    pool: web::Data<DbPool>,
    body: web::Json<CustomerPayload>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let nome = require_nome(body.nome.as_deref())?;

    let created = web::block(move || {
        let mut conn = pool.get()?;
        let new_customer = NewCustomer {
            nome,
            telefone: body.telefone,
            endereco: body.endereco,
        };
        let created = diesel::insert_into(clientes::table)
            .values(&new_customer)
            .returning(Customer::as_returning())
            .get_result(&mut conn)?;
        Ok::<_, AppError>(created)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CustomerResponse::from(created)))
}

/// PUT /api/clientes/{id}
///
/// Full replacement: omitted `telefone`/`endereco` are cleared, matching the
/// form-driven client that always sends every field.
#[utoipa::path(
    put,
    context_path = "/api",
    path = "/clientes/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid id or missing name"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "clientes"
)]
pub async fn update_customer(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<CustomerPayload>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;
    let body = body.into_inner();
    let nome = require_nome(body.nome.as_deref())?;

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        let changes = CustomerChanges {
            nome,
            telefone: body.telefone,
            endereco: body.endereco,
        };
        let updated = diesel::update(clientes::table.find(id))
            .set(&changes)
            .returning(Customer::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(updated)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match updated {
        Some(cliente) => Ok(HttpResponse::Ok().json(CustomerResponse::from(cliente))),
        None => Err(AppError::NotFound("Cliente não encontrado.".to_string())),
    }
}

/// DELETE /api/clientes/{id}
///
/// Removes the customer and, by cascade, every order they placed.
#[utoipa::path(
    delete,
    context_path = "/api",
    path = "/clientes/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "clientes"
)]
pub async fn delete_customer(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let deleted = diesel::delete(clientes::table.find(id)).execute(&mut conn)?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("Cliente não encontrado.".to_string()));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/clientes/{id}/pedidos
///
/// The customer's order history, newest first.
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/clientes/{id}/pedidos",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Orders of the customer, newest first", body = [OrderResponse]),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "clientes"
)]
pub async fn customer_orders(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;

    let pedidos = web::block(move || {
        let mut conn = pool.get()?;
        let exists = clientes::table
            .find(id)
            .select(clientes::id)
            .first::<i32>(&mut conn)
            .optional()?;
        if exists.is_none() {
            return Err(AppError::NotFound("Cliente não encontrado.".to_string()));
        }
        load_order_responses(&mut conn, Some(id))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(pedidos))
}
