use api::routes::routes;
use api::state::AppState;
use axum::{Router, http::header::CONTENT_TYPE};
use marker::Assessor;
use marker::grading::llm_grader::LlmGrader;
use marker::traits::grader::Grader;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::config::{AppConfig, ServerConfig};
use util::git::RepoSync;
use util::http::reference_client;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Invalid configuration");
    let _log_guard = init_logging(&config.server);

    // Clone or open the state repository
    let sync: Arc<dyn RepoSync> = Arc::from(
        util::git::connect(&config.repo)
            .await
            .expect("Failed to prepare state repository"),
    );

    let grader: Arc<dyn Grader> = Arc::new(
        LlmGrader::new(
            config.grader.clone(),
            config.assignment.exercise_statement.clone(),
        )
        .expect("Failed to configure grader"),
    );
    let http = reference_client(config.reference.timeout_secs).expect("Failed to build HTTP client");

    tracing::info!(
        assignment = %config.assignment.id,
        deadline = %config.assignment.deadline,
        remote = config.repo.is_remote(),
        "configuration loaded"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .expect("Invalid address");
    let project_name = config.server.project_name.clone();

    let app_state = AppState::new(config, Assessor::new(grader), sync, http);

    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_TYPE]);

    let app = Router::new().nest("/api", routes(app_state)).layer(cors);

    println!("Starting {} on http://{}", project_name, addr);

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server crashed");
}

fn init_logging(server: &ServerConfig) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", &server.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter =
        EnvFilter::try_new(&server.log_level).unwrap_or_else(|_| EnvFilter::new("api=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if server.log_to_stdout {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
