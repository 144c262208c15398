use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::produtos;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = produtos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: i32,
    pub nome: String,
    pub categoria: String,
    pub preco: BigDecimal,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = produtos)]
pub struct NewProduct {
    pub nome: String,
    pub categoria: String,
    pub preco: BigDecimal,
    pub ativo: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = produtos)]
pub struct ProductChanges {
    pub nome: String,
    pub categoria: String,
    pub preco: BigDecimal,
    pub ativo: bool,
}
