use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::pedidos;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = pedidos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: i32,
    pub cliente_id: i32,
    pub data_pedido: DateTime<Utc>,
    pub forma_pagamento: String,
    pub total_bruto: BigDecimal,
    pub desconto: BigDecimal,
    pub total_liquido: BigDecimal,
    pub observacao: Option<String>,
    pub codigo_fiscal: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pedidos)]
pub struct NewOrder {
    pub cliente_id: i32,
    pub forma_pagamento: String,
    pub total_bruto: BigDecimal,
    pub desconto: BigDecimal,
    pub total_liquido: BigDecimal,
    pub observacao: Option<String>,
    pub codigo_fiscal: String,
}
