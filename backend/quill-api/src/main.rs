use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use quill_api::handlers;
use quill_api::middleware::CookieAuthMiddleware;
use quill_api::security::jwt;
use quill_api::{db, AppError, Config};
use sqlx::PgPool;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "quill-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "quill-api"
        })),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting quill-api v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    if let Err(err) = jwt::initialize_jwt_keys(&config.auth.jwt_secret) {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize session token keys: {err}"),
        ));
    }

    // Initialize database connection pool and apply pending migrations
    let db_pool = match db::init_pool(&config.database.url, config.database.max_connections).await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connected to database, migrations applied");

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(config.clone()))
            // Malformed bodies, query strings and path segments get the same
            // response envelope as every other client error.
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
            )
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Health check endpoint (outside the authenticated scope)
            .route("/api/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .wrap(CookieAuthMiddleware)
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(handlers::signup))
                            .route("/signin", web::post().to(handlers::signin))
                            .route("/google", web::post().to(handlers::google_auth)),
                    )
                    .service(
                        web::scope("/user")
                            .route("/update/{userId}", web::put().to(handlers::update_user))
                            .route("/getusers", web::get().to(handlers::get_users))
                            .route("/getuser/{userId}", web::get().to(handlers::get_user))
                            .route("/signout", web::post().to(handlers::signout))
                            .route("/delete/{userId}", web::delete().to(handlers::delete_user)),
                    )
                    .service(
                        web::scope("/post")
                            .route("/create", web::post().to(handlers::create_post))
                            .route("/getposts", web::get().to(handlers::get_posts))
                            .route("/getpost/{postId}", web::get().to(handlers::get_post))
                            .route("/search", web::get().to(handlers::search_posts))
                            .route(
                                "/updatepost/{postId}/{userId}",
                                web::put().to(handlers::update_post),
                            )
                            .route(
                                "/deletepost/{postId}/{userId}",
                                web::delete().to(handlers::delete_post),
                            ),
                    )
                    .service(
                        web::scope("/comment")
                            .route("/create", web::post().to(handlers::create_comment))
                            .route(
                                "/getpostcomments/{postId}",
                                web::get().to(handlers::get_post_comments),
                            )
                            .route("/getcomments", web::get().to(handlers::get_comments))
                            .route(
                                "/likecomment/{commentId}",
                                web::put().to(handlers::like_comment),
                            )
                            .route(
                                "/editcomment/{commentId}",
                                web::put().to(handlers::edit_comment),
                            )
                            .route(
                                "/deletecomment/{commentId}",
                                web::delete().to(handlers::delete_comment),
                            ),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
