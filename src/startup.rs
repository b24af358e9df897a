use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenHelper};
use crate::configuration::{ListenSettings, ListenType};
use crate::db::REQUEST_TIMEOUT;
use crate::error::AppError;
use crate::logger::LoggerMiddleware;
use crate::routes::{
    create_category, create_product, create_user, delete_product, delete_user,
    get_category_by_id, get_category_by_title, get_product, get_user_by_email, get_user_by_id,
    get_user_by_username, health_check, list_categories, list_products, list_users, login,
    refresh, update_product, update_user,
};
use crate::services::UserService;
use crate::storage::{CategoryStorage, ProductStorage, UserStorage};

/// Socket file name used when listening on a UNIX socket
pub const SOCKET_FILE: &str = "app.sock";

/// A bound listener, either TCP or a UNIX socket next to the executable
pub enum AppListener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixListener),
}

impl AppListener {
    pub fn bind(settings: &ListenSettings) -> std::io::Result<Self> {
        match settings.kind {
            ListenType::Port => {
                let address = settings.address();
                tracing::info!(address = %address, "Binding TCP listener");
                Ok(Self::Tcp(TcpListener::bind(address)?))
            }
            ListenType::Sock => Self::bind_socket(),
        }
    }

    #[cfg(unix)]
    fn bind_socket() -> std::io::Result<Self> {
        let path = socket_path()?;

        // a socket left over from a previous run blocks bind
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        tracing::info!(path = %path.display(), "Binding UNIX socket listener");
        Ok(Self::Unix(std::os::unix::net::UnixListener::bind(path)?))
    }

    #[cfg(not(unix))]
    fn bind_socket() -> std::io::Result<Self> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "socket listening requires a unix platform",
        ))
    }
}

/// `app.sock` in the directory of the running executable
pub fn socket_path() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "executable has no parent directory")
    })?;
    Ok(dir.join(SOCKET_FILE))
}

/// Everything the handlers need, assembled once at startup
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStorage>,
    pub products: Arc<dyn ProductStorage>,
    pub categories: Arc<dyn CategoryStorage>,
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenHelper>,
}

pub fn run(listener: AppListener, state: AppState) -> Result<Server, std::io::Error> {
    let user_service = web::Data::new(UserService::new(state.users.clone(), state.hasher));
    let tokens = web::Data::from(state.tokens);
    let products: web::Data<dyn ProductStorage> = web::Data::from(state.products);
    let categories: web::Data<dyn CategoryStorage> = web::Data::from(state.categories);

    let server = HttpServer::new(move || {
        App::new()
            // Sole request logger: login query strings carry passwords
            .wrap(LoggerMiddleware)
            // Malformed bodies and query strings share the regular error envelope
            .app_data(
                web::JsonConfig::default()
                    .content_type_required(false)
                    .error_handler(|err, _req| {
                        tracing::debug!(error = %err, "Rejected request body");
                        AppError::BadRequest("can't decode".to_string()).into()
                    }),
            )
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("invalid query parameters: {err}")).into()
            }))
            // Shared state
            .app_data(user_service.clone())
            .app_data(tokens.clone())
            .app_data(products.clone())
            .app_data(categories.clone())
            .route("/health_check", web::get().to(health_check))
            // Users and auth
            .route("/users", web::post().to(create_user))
            .route("/users", web::get().to(list_users))
            .route("/users/id/", web::get().to(get_user_by_id))
            .route("/users/id/", web::put().to(update_user))
            .route("/users/id/", web::delete().to(delete_user))
            .route("/users/username/", web::get().to(get_user_by_username))
            .route("/users/email/", web::get().to(get_user_by_email))
            .route("/users/login/", web::post().to(login))
            .route("/users/login/", web::put().to(refresh))
            // Products
            .route("/products/", web::post().to(create_product))
            .route("/products/", web::get().to(list_products))
            .route("/products/id/", web::get().to(get_product))
            .route("/products/id/", web::put().to(update_product))
            .route("/products/id/", web::delete().to(delete_product))
            // Categories
            .route("/categories/", web::post().to(create_category))
            .route("/categories/", web::get().to(list_categories))
            .route("/categories/id", web::get().to(get_category_by_id))
            .route("/categories/title", web::get().to(get_category_by_title))
            // API docs
            .service(fs::Files::new("/swagger", "./docs").index_file("swagger.yaml"))
    })
    .client_request_timeout(REQUEST_TIMEOUT)
    .client_disconnect_timeout(REQUEST_TIMEOUT);

    let server = match listener {
        AppListener::Tcp(listener) => server.listen(listener)?,
        #[cfg(unix)]
        AppListener::Unix(listener) => server.listen_uds(listener)?,
    };

    Ok(server.run())
}
