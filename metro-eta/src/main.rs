use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use metro_eta::config::ServerConfig;
use metro_eta::context::EtaContext;
use metro_eta::model::BoostConfig;
use metro_eta::planner::PlannerConfig;
use metro_eta::timetable::Timetable;
use metro_eta::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("metro_eta=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn run() -> Result<(), BoxError> {
    let config = ServerConfig::from_env()?;

    // Load the timetable, train the model and build the graph before binding
    info!(data_dir = %config.data_dir.display(), "Loading timetable");
    let data_dir = config.data_dir.clone();
    let context = tokio::task::spawn_blocking(move || -> Result<EtaContext, BoxError> {
        let timetable = Timetable::load(&data_dir)?;
        let context =
            EtaContext::initialize(&timetable, &BoostConfig::default(), PlannerConfig::default())?;
        Ok(context)
    })
    .await??;

    let app = create_router(AppState::new(context));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Metro ETA listening on http://{}", config.bind);
    info!("  GET  /              - Web interface");
    info!("  GET  /health        - Health check");
    info!("  GET  /api/stations  - Station names");
    info!("  POST /api/predict   - Journey estimate");

    axum::serve(listener, app).await?;
    Ok(())
}
