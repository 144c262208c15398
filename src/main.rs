use dotenvy::dotenv;
use pizzaria_api::{build_server, create_pool, run_migrations, DiscountPolicy};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let policy: DiscountPolicy = match env::var("DISCOUNT_POLICY") {
        Ok(raw) => raw
            .parse()
            .expect("DISCOUNT_POLICY must be 'itemized' or 'flat-total'"),
        Err(_) => DiscountPolicy::default(),
    };

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    log::info!("API da Pizzaria ouvindo em http://{}:{}", host, port);
    log::info!("Política de desconto: {:?}", policy);

    build_server(pool, policy, &host, port)?.await
}
