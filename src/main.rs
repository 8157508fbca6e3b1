use actix_cors::Cors;
use actix_web::{self, middleware::Logger, App, HttpServer};
use std::sync::Arc;

use crate::{
    configs::{connect_database, run_migrations},
    constants::{Env, Storage},
    middlewares::{AuthProvider, JwtAuthProvider},
    state::AppServices,
    store::{MemoryStore, PgStore, Store},
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod state;
mod store;
#[cfg(test)]
mod test;
mod utils;

async fn build_store(env: &Env) -> Result<Arc<dyn Store>, api::error::SystemError> {
    match (env.storage, env.database_url.as_deref()) {
        (Storage::Postgres, Some(database_url)) => {
            let pool = connect_database(database_url).await?;
            run_migrations(&pool).await?;
            log::info!("Using Postgres storage");
            Ok(Arc::new(PgStore::new(pool)))
        }
        (Storage::Postgres, None) => {
            Err(api::error::SystemError::config("DATABASE_URL is required for postgres storage"))
        }
        (Storage::Memory, _) => {
            log::warn!("Using in-memory storage, data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let env = Env::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;
    log::info!("Environment loaded ({})", env.app_env);

    let store = build_store(&env).await.map_err(|e| std::io::Error::other(e.to_string()))?;
    let auth: Arc<dyn AuthProvider> =
        Arc::new(JwtAuthProvider::new(env.jwt_secret.clone(), env.access_token_expiration));

    let dev_login = !env.is_production();
    if dev_login {
        log::warn!("Development login enabled at /fake_auth/{{login}}");
    }

    let services = AppServices::new(store, auth, dev_login);
    let frontend_url = env.frontend_url.clone();

    log::info!("Starting server at http://{}:{}", env.ip, env.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        let services = services.clone();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(|cfg| services.configure(cfg))
    })
    .bind((env.ip.as_str(), env.port))?
    .workers(env.workers)
    .run()
    .await
}
