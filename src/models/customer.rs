use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::clientes;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = clientes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Customer {
    pub id: i32,
    pub nome: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clientes)]
pub struct NewCustomer {
    pub nome: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = clientes)]
#[diesel(treat_none_as_null = true)]
pub struct CustomerChanges {
    pub nome: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
}
