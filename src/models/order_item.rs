use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::order::Order;
use crate::schema::itens_pedido;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = itens_pedido)]
#[diesel(belongs_to(Order, foreign_key = pedido_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItem {
    pub id: i32,
    pub pedido_id: i32,
    // Nulled when the product is later deleted; the recorded price stays.
    pub produto_id: Option<i32>,
    pub quantidade: i32,
    pub preco_unitario: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = itens_pedido)]
pub struct NewOrderItem {
    pub pedido_id: i32,
    pub produto_id: Option<i32>,
    pub quantidade: i32,
    pub preco_unitario: BigDecimal,
}
