use std::collections::{BTreeMap, HashMap};

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Local, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::domain::pricing::PIZZA_CATEGORY;
use crate::errors::AppError;
use crate::schema::{itens_pedido, pedidos, produtos};

#[derive(Debug, Serialize, ToSchema)]
pub struct PizzasPorDia {
    /// ISO calendar date, e.g. "2025-08-20".
    pub data: String,
    pub quantidade: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PizzasPorMes {
    /// Year and month, e.g. "2025-08".
    pub mes: String,
    pub quantidade: i64,
}

/// Pizza quantity per order, tagged with the order timestamp. Orders with no
/// pizza items still appear (quantity 0) so slow days show up in the report.
fn pizza_sales(conn: &mut PgConnection) -> Result<Vec<(DateTime<Utc>, i64)>, AppError> {
    let orders: Vec<(i32, DateTime<Utc>)> = pedidos::table
        .select((pedidos::id, pedidos::data_pedido))
        .load(conn)?;

    let pizza_rows: Vec<(i32, i32)> = itens_pedido::table
        .inner_join(produtos::table)
        .filter(produtos::categoria.eq(PIZZA_CATEGORY))
        .select((itens_pedido::pedido_id, itens_pedido::quantidade))
        .load(conn)?;

    let mut por_pedido: HashMap<i32, i64> = HashMap::new();
    for (pedido_id, quantidade) in pizza_rows {
        *por_pedido.entry(pedido_id).or_insert(0) += i64::from(quantidade);
    }

    Ok(orders
        .into_iter()
        .map(|(id, data)| (data, por_pedido.get(&id).copied().unwrap_or(0)))
        .collect())
}

fn aggregate_por_dia(vendas: &[(DateTime<Utc>, i64)]) -> Vec<(NaiveDate, i64)> {
    let mut por_dia: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (data, pizzas) in vendas {
        *por_dia
            .entry(data.with_timezone(&Local).date_naive())
            .or_insert(0) += pizzas;
    }
    por_dia.into_iter().rev().collect()
}

fn aggregate_por_mes(vendas: &[(DateTime<Utc>, i64)]) -> Vec<(String, i64)> {
    let mut por_mes: BTreeMap<String, i64> = BTreeMap::new();
    for (data, pizzas) in vendas {
        let mes = data.with_timezone(&Local).format("%Y-%m").to_string();
        *por_mes.entry(mes).or_insert(0) += pizzas;
    }
    por_mes.into_iter().rev().collect()
}

/// GET /api/relatorios/pizzas-por-dia
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/relatorios/pizzas-por-dia",
    responses(
        (status = 200, description = "Pizzas sold per calendar day, newest first", body = [PizzasPorDia]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "relatorios"
)]
pub async fn pizzas_por_dia(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let vendas = web::block(move || {
        let mut conn = pool.get()?;
        pizza_sales(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<PizzasPorDia> = aggregate_por_dia(&vendas)
        .into_iter()
        .map(|(data, quantidade)| PizzasPorDia {
            data: data.to_string(),
            quantidade,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/relatorios/pizzas-por-mes
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/relatorios/pizzas-por-mes",
    responses(
        (status = 200, description = "Pizzas sold per month, newest first", body = [PizzasPorMes]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "relatorios"
)]
pub async fn pizzas_por_mes(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let vendas = web::block(move || {
        let mut conn = pool.get()?;
        pizza_sales(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<PizzasPorMes> = aggregate_por_mes(&vendas)
        .into_iter()
        .map(|(mes, quantidade)| PizzasPorMes { mes, quantidade })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
