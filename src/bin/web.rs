//! Web server: public page from templates/, static files from /static, JSON API under /api.
//! Run with: cargo run --bin web
//! Configuration comes from the environment (or a `.env` file): HOST, PORT,
//! DATABASE_URL, DATABASE_MAX_CONNECTIONS, SKIP_MIGRATIONS.

use actix_files::Files;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer};
use tournament_manager::config::Config;
use tournament_manager::{db, routes};

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let pool = db::connect(&config).await.map_err(std::io::Error::other)?;
    if config.skip_migrations {
        log::warn!("SKIP_MIGRATIONS set, assuming the schema is current");
    } else {
        db::migrate(&pool).await.map_err(std::io::Error::other)?;
        log::info!("Migrations applied");
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = web::Data::new(pool);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(favicon)
            .configure(routes::configure)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}
