//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{App, HttpServer};
use log::info;

use teamline_service::routes::{auth_routes, friend_routes, project_routes, team_routes};
use teamline_service::utils::storage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    storage::ensure_storage_dirs()?;

    info!("🚀 Server started at {}", address);

    HttpServer::new(|| {
        App::new()
            .wrap(Cors::permissive())
            .configure(auth_routes::init_routes)
            .configure(team_routes::init_routes)
            .configure(friend_routes::init_routes)
            .configure(project_routes::init_routes)
    })
    .bind(address)?
    .run()
    .await
}
