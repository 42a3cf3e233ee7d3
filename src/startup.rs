use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthSessionService, SessionSettings};
use crate::configuration::ApplicationSettings;
use crate::metrics::HitCounter;
use crate::middleware::HitCounterMiddleware;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    metrics, polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::{ChirpStore, RefreshTokenStore, UserStore};

/// Shared state handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub session: web::Data<AuthSessionService>,
    pub users: web::Data<dyn UserStore>,
    pub chirps: web::Data<dyn ChirpStore>,
    pub hits: HitCounter,
    pub application: web::Data<ApplicationSettings>,
}

impl AppState {
    /// Wire every component to one store
    pub fn new<S>(store: Arc<S>, session: SessionSettings, application: ApplicationSettings) -> Self
    where
        S: UserStore + ChirpStore + RefreshTokenStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let chirps: Arc<dyn ChirpStore> = store.clone();
        let refresh_tokens: Arc<dyn RefreshTokenStore> = store;

        Self {
            session: web::Data::new(AuthSessionService::new(
                users.clone(),
                refresh_tokens,
                session,
            )),
            users: web::Data::from(users),
            chirps: web::Data::from(chirps),
            hits: HitCounter::new(),
            application: web::Data::new(application),
        }
    }
}

/// Register shared state and every route
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state.session.clone())
            .app_data(state.users.clone())
            .app_data(state.chirps.clone())
            .app_data(web::Data::new(state.hits.clone()))
            .app_data(state.application.clone())
            // Public API
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/chirps", web::get().to(list_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))
            // Access token required (AuthenticatedUser extractor)
            .route("/api/users", web::put().to(update_user))
            .route("/api/chirps", web::post().to(create_chirp))
            .route("/api/chirps/{chirp_id}", web::delete().to(delete_chirp))
            // API key required
            .route("/api/polka/webhooks", web::post().to(polka_webhook))
            // Admin
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))
            // Static app, counted
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(state.hits.clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            );
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure(state.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
