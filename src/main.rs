// src/main.rs
mod config;
mod dtos;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use crate::config::{mask_key, Settings};
use crate::repositories::gateway::DataGateway;
use crate::repositories::supabase_gateway::SupabaseGateway;
use crate::services::auth_services::AuthService;
use crate::services::keluhan_services::KeluhanService;
use crate::services::session_store::SessionStore;
use crate::services::user_services::UserService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Supabase URL: {}", settings.supabase_url);
    info!("Supabase Key: {}", mask_key(&settings.service_role_key));
    info!("Photo bucket: {}", settings.photo_bucket);

    let gateway: Arc<dyn DataGateway> = match SupabaseGateway::new(&settings) {
        Ok(gw) => Arc::new(gw),
        Err(e) => {
            error!("Failed to build backend client: {}", e);
            std::process::exit(1);
        }
    };

    let sessions = SessionStore::new(settings.session_ttl);
    let auth_data = web::Data::new(AuthService::new(
        gateway.clone(),
        sessions,
        &settings.session_secret,
    ));
    let keluhan_data = web::Data::new(KeluhanService::new(gateway.clone(), &settings.photo_bucket));
    let user_data = web::Data::new(UserService::new(gateway, &settings.photo_bucket));

    let allowed_origins = settings.allowed_origins.clone();
    let bind_address = settings.bind_address();
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with",
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(auth_data.clone())
            .app_data(keluhan_data.clone())
            .app_data(user_data.clone())
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
