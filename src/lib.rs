pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod receipt;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use domain::pricing::DiscountPolicy;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pizzaria Sabor & Arte API",
        description = "Customers, products, orders with automatic discounts, sales reports and PDF receipts."
    ),
    paths(
        handlers::health::health,
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::customer_orders,
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::create_order,
        handlers::orders::order_summary,
        handlers::orders::delete_order,
        handlers::orders::order_receipt,
        handlers::reports::pizzas_por_dia,
        handlers::reports::pizzas_por_mes,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        handlers::customers::CustomerPayload,
        handlers::customers::CustomerResponse,
        handlers::products::ProductPayload,
        handlers::products::ProductResponse,
        handlers::orders::OrderItemPayload,
        handlers::orders::CheckoutPayload,
        handlers::orders::SummaryPayload,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderResponse,
        handlers::orders::SummaryResponse,
        handlers::reports::PizzasPorDia,
        handlers::reports::PizzasPorMes,
    ))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. `policy` selects the discount scheme applied by the
/// pricing endpoints.
pub fn build_server(
    pool: DbPool,
    policy: DiscountPolicy,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(policy))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health::health))
                    .route("/clientes", web::get().to(handlers::customers::list_customers))
                    .route("/clientes", web::post().to(handlers::customers::create_customer))
                    .route("/clientes/{id}", web::put().to(handlers::customers::update_customer))
                    .route("/clientes/{id}", web::delete().to(handlers::customers::delete_customer))
                    .route(
                        "/clientes/{id}/pedidos",
                        web::get().to(handlers::customers::customer_orders),
                    )
                    .route("/produtos", web::get().to(handlers::products::list_products))
                    .route("/produtos", web::post().to(handlers::products::create_product))
                    .route("/produtos/{id}", web::put().to(handlers::products::update_product))
                    .route("/produtos/{id}", web::delete().to(handlers::products::delete_product))
                    // Registered ahead of /pedidos/{id} so the literal segment wins.
                    .route("/pedidos/resumo", web::post().to(handlers::orders::order_summary))
                    .route("/pedidos", web::get().to(handlers::orders::list_orders))
                    .route("/pedidos", web::post().to(handlers::orders::create_order))
                    .route("/pedidos/{id}", web::get().to(handlers::orders::get_order))
                    .route("/pedidos/{id}", web::delete().to(handlers::orders::delete_order))
                    .route(
                        "/pedidos/{id}/comprovante",
                        web::get().to(handlers::orders::order_receipt),
                    )
                    .route(
                        "/relatorios/pizzas-por-dia",
                        web::get().to(handlers::reports::pizzas_por_dia),
                    )
                    .route(
                        "/relatorios/pizzas-por-mes",
                        web::get().to(handlers::reports::pizzas_por_mes),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
