use actix_web::HttpResponse;
use thiserror::Error;

/// Application-level error, rendered as the `{"mensagem": "..."}` envelope
/// the API has always spoken.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Erro interno do servidor.")]
    Internal(String),
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "mensagem": self.to_string()
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "mensagem": self.to_string()
            })),
            AppError::Internal(cause) => {
                log::error!("Erro inesperado: {}", cause);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "mensagem": self.to_string()
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn validation_returns_400() {
        let resp = AppError::Validation("Campo nome é obrigatório.".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Pedido não encontrado.".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_hides_the_cause() {
        let err = AppError::Internal("secret detail".to_string());
        assert_eq!(err.to_string(), "Erro interno do servidor.");
    }

    #[test]
    fn validation_displays_its_message() {
        let err = AppError::Validation("Preço inválido.".to_string());
        assert_eq!(err.to_string(), "Preço inválido.");
    }

    #[test]
    fn diesel_not_found_maps_to_internal() {
        // Lookups that may legitimately miss go through `.optional()`; a bare
        // NotFound bubbling up is a programming error, not a 404.
        let err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
