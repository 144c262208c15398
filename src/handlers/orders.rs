use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Local, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::domain::catalog::{ProductLookup, ProductSnapshot};
use crate::domain::pricing::{compute_summary, DiscountPolicy, LineItem, PricingSummary};
use crate::errors::AppError;
use crate::models::customer::Customer;
use crate::models::order::{NewOrder, Order};
use crate::models::order_item::{NewOrderItem, OrderItem};
use crate::models::product::Product;
use crate::receipt::{render_receipt, ReceiptData, ReceiptLine};
use crate::schema::{clientes, itens_pedido, pedidos, produtos};

use super::{money, require_id};

const DEFAULT_PAYMENT: &str = "Dinheiro";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemPayload {
    pub produto_id: Option<i32>,
    pub quantidade: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutPayload {
    pub cliente_id: Option<i32>,
    pub forma_pagamento: Option<String>,
    #[serde(default)]
    pub itens: Vec<OrderItemPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummaryPayload {
    pub forma_pagamento: Option<String>,
    #[serde(default)]
    pub itens: Vec<OrderItemPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub pedido_id: i32,
    pub produto_id: Option<i32>,
    pub quantidade: i32,
    pub preco_unitario: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub cliente_id: i32,
    pub data_pedido: DateTime<Utc>,
    pub forma_pagamento: String,
    pub total_bruto: String,
    pub desconto: String,
    pub total_liquido: String,
    pub observacao: Option<String>,
    pub codigo_fiscal: String,
    pub itens: Vec<OrderItemResponse>,
}

impl OrderResponse {
    fn from_parts(order: Order, itens: Vec<OrderItem>) -> Self {
        OrderResponse {
            id: order.id,
            cliente_id: order.cliente_id,
            data_pedido: order.data_pedido,
            forma_pagamento: order.forma_pagamento,
            total_bruto: money(&order.total_bruto),
            desconto: money(&order.desconto),
            total_liquido: money(&order.total_liquido),
            observacao: order.observacao,
            codigo_fiscal: order.codigo_fiscal,
            itens: itens
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    pedido_id: item.pedido_id,
                    produto_id: item.produto_id,
                    quantidade: item.quantidade,
                    preco_unitario: money(&item.preco_unitario),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub total_bruto: String,
    pub desconto: String,
    pub total_liquido: String,
    pub observacoes: Vec<String>,
    /// The notes joined with `" | "`, as stored on a committed order.
    pub observacao: Option<String>,
}

impl From<PricingSummary> for SummaryResponse {
    fn from(resumo: PricingSummary) -> Self {
        SummaryResponse {
            total_bruto: money(&resumo.total_bruto),
            desconto: money(&resumo.desconto),
            total_liquido: money(&resumo.total_liquido),
            observacao: resumo.observacao(),
            observacoes: resumo.observacoes,
        }
    }
}

// ── Shared query helpers ─────────────────────────────────────────────────────

/// Orders newest first, each with its items in insertion order, optionally
/// restricted to one customer.
pub(crate) fn load_order_responses(
    conn: &mut PgConnection,
    cliente: Option<i32>,
) -> Result<Vec<OrderResponse>, AppError> {
    let mut query = pedidos::table
        .select(Order::as_select())
        .order(pedidos::data_pedido.desc())
        .into_boxed();
    if let Some(cliente_id) = cliente {
        query = query.filter(pedidos::cliente_id.eq(cliente_id));
    }
    let orders = query.load::<Order>(conn)?;

    let itens = OrderItem::belonging_to(&orders)
        .select(OrderItem::as_select())
        .order(itens_pedido::id.asc())
        .load::<OrderItem>(conn)?
        .grouped_by(&orders);

    Ok(orders
        .into_iter()
        .zip(itens)
        .map(|(order, itens)| OrderResponse::from_parts(order, itens))
        .collect())
}

fn load_catalog(
    conn: &mut PgConnection,
    itens: &[LineItem],
) -> Result<HashMap<i32, ProductSnapshot>, AppError> {
    let ids: Vec<i32> = itens.iter().map(|item| item.produto_id).collect();
    let rows = produtos::table
        .filter(produtos::id.eq_any(ids))
        .select(Product::as_select())
        .load::<Product>(conn)?;
    Ok(rows
        .into_iter()
        .map(|p| {
            (
                p.id,
                ProductSnapshot {
                    categoria: p.categoria,
                    preco: p.preco,
                },
            )
        })
        .collect())
}

/// Checkout is the strict caller of the engine: every line must reference an
/// existing product with a positive quantity.
fn validated_line_items(payload: &[OrderItemPayload]) -> Result<Vec<LineItem>, AppError> {
    payload
        .iter()
        .map(|item| match (item.produto_id, item.quantidade) {
            (Some(produto_id), Some(quantidade)) if produto_id > 0 && quantidade > 0 => {
                Ok(LineItem {
                    produto_id,
                    quantidade,
                })
            }
            _ => Err(AppError::Validation("Item de pedido inválido.".to_string())),
        })
        .collect()
}

fn next_codigo_fiscal() -> String {
    format!("NF-{}", Utc::now().timestamp_millis())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/pedidos
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/pedidos",
    responses(
        (status = 200, description = "All orders, newest first, with their items", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pedidos"
)]
pub async fn list_orders(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let pedidos = web::block(move || {
        let mut conn = pool.get()?;
        load_order_responses(&mut conn, None)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(pedidos))
}

/// GET /api/pedidos/{id}
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/pedidos/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pedidos"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;

    let result = web::block(move || {
        let mut conn = pool.get()?;
        let order = pedidos::table
            .find(id)
            .select(Order::as_select())
            .first::<Order>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok::<_, AppError>(None);
        };

        let itens = OrderItem::belonging_to(&order)
            .select(OrderItem::as_select())
            .order(itens_pedido::id.asc())
            .load(&mut conn)?;

        Ok(Some(OrderResponse::from_parts(order, itens)))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(pedido) => Ok(HttpResponse::Ok().json(pedido)),
        None => Err(AppError::NotFound("Pedido não encontrado.".to_string())),
    }
}

/// POST /api/pedidos
///
/// Checkout. The server is the pricing authority: it resolves the referenced
/// products, runs the discount rules and records the resulting totals; any
/// totals sent by a client are ignored. The order header and all of its
/// items are inserted inside a single transaction so a priced order can
/// never exist without its items.
#[utoipa::path(
    post,
    context_path = "/api",
    path = "/pedidos",
    request_body = CheckoutPayload,
    responses(
        (status = 201, description = "Order created with computed totals", body = OrderResponse),
        (status = 400, description = "Missing customer/items or invalid item"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pedidos"
)]
pub async fn create_order(
    pool: web::Data<DbPool>,
    policy: web::Data<DiscountPolicy>,
    body: web::Json<CheckoutPayload>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let policy = *policy.get_ref();

    let cliente_id = match body.cliente_id {
        Some(id) if id > 0 => id,
        _ => {
            return Err(AppError::Validation(
                "Cliente e itens são obrigatórios.".to_string(),
            ))
        }
    };
    if body.itens.is_empty() {
        return Err(AppError::Validation(
            "Cliente e itens são obrigatórios.".to_string(),
        ));
    }
    let itens = validated_line_items(&body.itens)?;
    let forma_pagamento = body
        .forma_pagamento
        .unwrap_or_else(|| DEFAULT_PAYMENT.to_string());

    let response = web::block(move || {
        let mut conn = pool.get()?;

        conn.transaction::<_, AppError, _>(|conn| {
            let cliente = clientes::table
                .find(cliente_id)
                .select(clientes::id)
                .first::<i32>(conn)
                .optional()?;
            if cliente.is_none() {
                return Err(AppError::NotFound("Cliente não encontrado.".to_string()));
            }

            let catalog = load_catalog(conn, &itens)?;
            let mut precos = Vec::with_capacity(itens.len());
            for item in &itens {
                let Some(produto) = catalog.find_by_id(item.produto_id) else {
                    return Err(AppError::Validation("Item de pedido inválido.".to_string()));
                };
                precos.push(produto.preco.clone());
            }

            let hoje = Local::now().date_naive();
            let resumo = compute_summary(&itens, &forma_pagamento, &catalog, hoje, policy)
                .rounded();
            let observacao = resumo.observacao();

            let new_order = NewOrder {
                cliente_id,
                forma_pagamento,
                total_bruto: resumo.total_bruto,
                desconto: resumo.desconto,
                total_liquido: resumo.total_liquido,
                observacao,
                codigo_fiscal: next_codigo_fiscal(),
            };
            let order: Order = diesel::insert_into(pedidos::table)
                .values(&new_order)
                .returning(Order::as_returning())
                .get_result(conn)?;

            let rows: Vec<NewOrderItem> = itens
                .iter()
                .zip(precos)
                .map(|(item, preco_unitario)| NewOrderItem {
                    pedido_id: order.id,
                    produto_id: Some(item.produto_id),
                    quantidade: item.quantidade,
                    preco_unitario,
                })
                .collect();
            let itens_salvos = diesel::insert_into(itens_pedido::table)
                .values(&rows)
                .returning(OrderItem::as_returning())
                .get_results(conn)?;

            Ok(OrderResponse::from_parts(order, itens_salvos))
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(response))
}

/// POST /api/pedidos/resumo
///
/// Prices a cart without persisting anything. This is the tolerant caller:
/// lines that are incomplete or reference unknown products contribute zero
/// instead of failing, so the preview always answers.
#[utoipa::path(
    post,
    context_path = "/api",
    path = "/pedidos/resumo",
    request_body = SummaryPayload,
    responses(
        (status = 200, description = "Computed totals for the candidate cart", body = SummaryResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pedidos"
)]
pub async fn order_summary(
    pool: web::Data<DbPool>,
    policy: web::Data<DiscountPolicy>,
    body: web::Json<SummaryPayload>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let policy = *policy.get_ref();

    let resumo = web::block(move || {
        let mut conn = pool.get()?;
        let itens: Vec<LineItem> = body
            .itens
            .iter()
            .filter_map(|item| match (item.produto_id, item.quantidade) {
                (Some(produto_id), Some(quantidade)) if produto_id > 0 && quantidade > 0 => {
                    Some(LineItem {
                        produto_id,
                        quantidade,
                    })
                }
                _ => None,
            })
            .collect();
        let catalog = load_catalog(&mut conn, &itens)?;
        let forma_pagamento = body.forma_pagamento.as_deref().unwrap_or(DEFAULT_PAYMENT);
        let hoje = Local::now().date_naive();
        Ok::<_, AppError>(
            compute_summary(&itens, forma_pagamento, &catalog, hoje, policy).rounded(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(SummaryResponse::from(resumo)))
}

/// DELETE /api/pedidos/{id}
#[utoipa::path(
    delete,
    context_path = "/api",
    path = "/pedidos/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pedidos"
)]
pub async fn delete_order(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let deleted = diesel::delete(pedidos::table.find(id)).execute(&mut conn)?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("Pedido não encontrado.".to_string()));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/pedidos/{id}/comprovante
///
/// Renders the order's receipt as a downloadable PDF. Item rows use the
/// unit price recorded at checkout; a product deleted since then shows as
/// `Produto removido`.
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/pedidos/{id}/comprovante",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "PDF receipt", content_type = "application/pdf"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pedidos"
)]
pub async fn order_receipt(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = require_id(path.into_inner())?;

    let (pedido_id, bytes) = web::block(move || {
        let mut conn = pool.get()?;

        let order = pedidos::table
            .find(id)
            .select(Order::as_select())
            .first::<Order>(&mut conn)
            .optional()?;
        let Some(order) = order else {
            return Err(AppError::NotFound("Pedido não encontrado.".to_string()));
        };

        let cliente = clientes::table
            .find(order.cliente_id)
            .select(Customer::as_select())
            .first::<Customer>(&mut conn)?;

        let itens: Vec<(OrderItem, Option<String>)> = itens_pedido::table
            .left_join(produtos::table)
            .filter(itens_pedido::pedido_id.eq(order.id))
            .select((OrderItem::as_select(), produtos::nome.nullable()))
            .order(itens_pedido::id.asc())
            .load(&mut conn)?;

        let data = receipt_data(order, cliente, itens);
        let bytes = render_receipt(&data)?;
        Ok((data.pedido_id, bytes))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"pedido-{pedido_id}.pdf\""),
        ))
        .body(bytes))
}

fn receipt_data(
    order: Order,
    cliente: Customer,
    itens: Vec<(OrderItem, Option<String>)>,
) -> ReceiptData {
    let linhas = itens
        .into_iter()
        .map(|(item, nome)| ReceiptLine {
            descricao: nome.unwrap_or_else(|| "Produto removido".to_string()),
            quantidade: item.quantidade,
            subtotal: &item.preco_unitario * BigDecimal::from(item.quantidade),
        })
        .collect();

    ReceiptData {
        pedido_id: order.id,
        codigo_fiscal: order.codigo_fiscal,
        cliente_nome: cliente.nome,
        cliente_telefone: cliente.telefone,
        cliente_endereco: cliente.endereco,
        data_pedido: order.data_pedido,
        forma_pagamento: order.forma_pagamento,
        itens: linhas,
        total_bruto: order.total_bruto,
        desconto: order.desconto,
        total_liquido: order.total_liquido,
        observacao: order.observacao,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(produto_id: Option<i32>, quantidade: Option<i32>) -> OrderItemPayload {
        OrderItemPayload {
            produto_id,
            quantidade,
        }
    }

    #[test]
    fn accepts_well_formed_line_items() {
        let itens = validated_line_items(&[item(Some(1), Some(2)), item(Some(7), Some(1))])
            .unwrap();

        assert_eq!(itens.len(), 2);
        assert_eq!(itens[0].produto_id, 1);
        assert_eq!(itens[0].quantidade, 2);
    }

    #[test]
    fn rejects_incomplete_or_non_positive_lines() {
        assert!(validated_line_items(&[item(None, Some(1))]).is_err());
        assert!(validated_line_items(&[item(Some(1), None)]).is_err());
        assert!(validated_line_items(&[item(Some(0), Some(1))]).is_err());
        assert!(validated_line_items(&[item(Some(1), Some(0))]).is_err());
        assert!(validated_line_items(&[item(Some(1), Some(-2))]).is_err());
    }

    #[test]
    fn fiscal_codes_carry_the_nf_prefix() {
        let codigo = next_codigo_fiscal();
        assert!(codigo.starts_with("NF-"));
        assert!(codigo[3..].chars().all(|c| c.is_ascii_digit()));
    }
}
