use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::domain::pricing::round_money;
use crate::errors::AppError;
use crate::models::product::{NewProduct, Product, ProductChanges};
use crate::schema::produtos;

use super::{money, require_id, require_nome};

const DEFAULT_CATEGORY: &str = "Outro";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductPayload {
    pub nome: Option<String>,
    pub categoria: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "45.90"
    pub preco: Option<String>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub nome: String,
    pub categoria: String,
    pub preco: String,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            nome: p.nome,
            categoria: p.categoria,
            preco: money(&p.preco),
            ativo: p.ativo,
            criado_em: p.criado_em,
        }
    }
}

fn parse_preco(preco: Option<&str>) -> Result<BigDecimal, AppError> {
    let valor = preco.and_then(|p| BigDecimal::from_str(p.trim()).ok());
    match valor {
        Some(v) if v >= BigDecimal::zero() => Ok(round_money(&v)),
        _ => Err(AppError::Validation("Preço inválido.".to_string())),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/produtos
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/produtos",
    responses(
        (status = 200, description = "All products ordered by name", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "produtos"
)]
pub async fn list_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows = produtos::table
            .select(Product::as_select())
            .order(produtos::nome.asc())
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<ProductResponse> = rows.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/produtos
#[utoipa::path(
    post,
    context_path = "/api",
    path = "/produtos",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing name or invalid price"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "produtos"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    body: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let nome = require_nome(body.nome.as_deref())?;
    let preco = parse_preco(body.preco.as_deref())?;

    let created = web::block(move || {
        let mut conn = pool.get()?;
        let new_product = NewProduct {
            nome,
            categoria: body.categoria.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            preco,
            ativo: body.ativo.unwrap_or(true),
        };
        let created = diesel::insert_into(produtos::table)
            .values(&new_product)
            .returning(Product::as_returning())
            .get_result(&mut conn)?;
        Ok::<_, AppError>(created)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// PUT /api/produtos/{id}
#[utoipa::path(
    put,
    context_path = "/api",
    path = "/produtos/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid id, missing name or invalid price"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "produtos"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;
    let body = body.into_inner();
    let nome = require_nome(body.nome.as_deref())?;
    let preco = parse_preco(body.preco.as_deref())?;

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        let changes = ProductChanges {
            nome,
            categoria: body.categoria.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            preco,
            ativo: body.ativo.unwrap_or(true),
        };
        let updated = diesel::update(produtos::table.find(id))
            .set(&changes)
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(updated)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match updated {
        Some(produto) => Ok(HttpResponse::Ok().json(ProductResponse::from(produto))),
        None => Err(AppError::NotFound("Produto não encontrado.".to_string())),
    }
}

/// DELETE /api/produtos/{id}
///
/// Committed order items keep their recorded price; their `produto_id` is
/// nulled by the database.
#[utoipa::path(
    delete,
    context_path = "/api",
    path = "/produtos/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "produtos"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let deleted = diesel::delete(produtos::table.find(id)).execute(&mut conn)?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("Produto não encontrado.".to_string()));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preco_accepts_decimal_strings() {
        assert_eq!(parse_preco(Some("45.90")).unwrap().to_string(), "45.90");
        assert_eq!(parse_preco(Some(" 10 ")).unwrap().to_string(), "10.00");
        assert_eq!(parse_preco(Some("0")).unwrap().to_string(), "0.00");
    }

    #[test]
    fn preco_rejects_missing_garbage_and_negatives() {
        assert!(parse_preco(None).is_err());
        assert!(parse_preco(Some("abc")).is_err());
        assert!(parse_preco(Some("")).is_err());
        assert!(parse_preco(Some("-1.00")).is_err());
    }
}
