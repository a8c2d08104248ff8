pub mod core;
pub mod http;
pub mod models;
pub mod platform;

use crate::core::config::Config;
use crate::core::frame_analyzer::FrameAnalyzer;
use crate::core::ml_models::load_classifier;
use crate::core::session_store::SessionStore;
use crate::platform::pose::create_detector;
use std::sync::Arc;
use tracing::info;

// Application state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub analyzer: Arc<FrameAnalyzer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, analyzer: FrameAnalyzer) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_id_scheme)),
            analyzer: Arc::new(analyzer),
            config: Arc::new(config),
        }
    }

    /// Start the landmark detector and load the gesture model. Neither
    /// failure is fatal: the service runs degraded and reports it on /api/health.
    pub fn from_config(config: Config) -> Self {
        let detector = create_detector(&config.pose_config());
        let classifier = load_classifier(&config.model_path);
        Self::new(config, FrameAnalyzer::new(detector, classifier))
    }
}

/// Serve the HTTP API until Ctrl-C
pub async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        bind = %config.socket_addr(),
        model = %config.model_path.display(),
        id_scheme = ?config.session_id_scheme,
        face_tracking = config.enable_face_tracking,
        "gesture-coach starting"
    );

    let addr = config.socket_addr();
    // Model and interpreter start-up block
    let state = tokio::task::spawn_blocking(move || AppState::from_config(config)).await?;
    let app = crate::http::routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    info!(%local, "listening");

    tokio::select! { _ = axum::serve(listener, app) => {} _ = tokio::signal::ctrl_c() => {} }

    info!("gesture-coach shutting down");
    Ok(())
}
