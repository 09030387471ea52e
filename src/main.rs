use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use studyquiz_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .service(handlers::quiz_handler::health_check)
            .service(handlers::quiz_handler::create_quiz)
            .service(handlers::quiz_handler::get_quiz)
            .service(handlers::quiz_handler::list_quizzes)
            .service(handlers::attempt_handler::start_attempt)
            .service(handlers::attempt_handler::submit_attempt)
            .service(handlers::attempt_handler::get_attempt)
            .service(handlers::attempt_handler::list_attempts)
            .service(handlers::attempt_handler::regenerate_feedback)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
