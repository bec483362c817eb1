use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{BcryptHasher, JwtSigner};
use crate::configuration::JwtSettings;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    add_recruiter, create_company, create_job, create_user, current_user, delete_company,
    delete_job, delete_user, get_company, get_job, health_check, list_companies, list_jobs, login,
    logout, refresh, remove_recruiter, update_company, update_job, update_user,
};
use crate::session::SessionStore;

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
    session_store: Arc<dyn SessionStore>,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let signer = JwtSigner::new(jwt_config);
    let signer_data = web::Data::new(signer.clone());
    let hasher_data = web::Data::new(BcryptHasher);
    let store_data: web::Data<dyn SessionStore> = web::Data::from(session_store);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            .app_data(signer_data.clone())
            .app_data(hasher_data.clone())
            .app_data(store_data.clone())

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/users", web::post().to(create_user))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/logout", web::post().to(logout))

            // Protected routes (require a valid access token)
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(signer.clone()))
                    .route("/users/me", web::get().to(current_user))
                    .route("/users/me", web::patch().to(update_user))
                    .route("/users/me", web::delete().to(delete_user))
                    .route("/companies", web::post().to(create_company))
                    .route("/companies", web::get().to(list_companies))
                    .route("/companies/{id}", web::get().to(get_company))
                    .route("/companies/{id}", web::patch().to(update_company))
                    .route("/companies/{id}", web::delete().to(delete_company))
                    .route("/companies/{id}/recruiters", web::post().to(add_recruiter))
                    .route(
                        "/companies/{id}/recruiters/{user_id}",
                        web::delete().to(remove_recruiter),
                    )
                    .route("/jobs", web::post().to(create_job))
                    .route("/jobs", web::get().to(list_jobs))
                    .route("/jobs/{id}", web::get().to(get_job))
                    .route("/jobs/{id}", web::patch().to(update_job))
                    .route("/jobs/{id}", web::delete().to(delete_job)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
