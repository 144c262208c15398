use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub now: DateTime<Utc>,
}

/// GET /api/health
///
/// Round-trips `now()` through the database so a green health check means
/// the pool and the server are both alive.
#[utoipa::path(
    get,
    context_path = "/api",
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 500, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn health(pool: web::Data<DbPool>) -> HttpResponse {
    let result = web::block(move || {
        let mut conn = pool.get()?;
        let now: NaiveDateTime = diesel::select(diesel::dsl::now).get_result(&mut conn)?;
        Ok::<_, AppError>(now)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))
    .and_then(|inner| inner);

    match result {
        Ok(now) => HttpResponse::Ok().json(HealthResponse {
            status: "ok".to_string(),
            now: DateTime::<Utc>::from_naive_utc_and_offset(now, Utc),
        }),
        Err(erro) => {
            log::error!("Falha na verificação de saúde: {:?}", erro);
            HttpResponse::InternalServerError().json(json!({
                "status": "erro",
                "detalhe": "Falha ao acessar o banco."
            }))
        }
    }
}
