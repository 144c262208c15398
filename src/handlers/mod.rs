use bigdecimal::BigDecimal;

use crate::domain::pricing::round_money;
use crate::errors::AppError;

pub mod customers;
pub mod health;
pub mod orders;
pub mod products;
pub mod reports;

/// Path ids must be positive, mirroring the API's historical `ID inválido.`
/// rejection of zero.
pub(crate) fn require_id(id: i32) -> Result<i32, AppError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(AppError::Validation("ID inválido.".to_string()))
    }
}

pub(crate) fn require_nome(nome: Option<&str>) -> Result<String, AppError> {
    match nome.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(n.to_string()),
        _ => Err(AppError::Validation("Campo nome é obrigatório.".to_string())),
    }
}

/// Money travels on the wire as a string with two decimals.
pub(crate) fn money(valor: &BigDecimal) -> String {
    round_money(valor).to_string()
}
