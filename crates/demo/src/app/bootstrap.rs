use pixelcam::{FrameScene, LoopConfig};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_config_from_env, ConfigError, CONFIG_ENV_VAR};
use super::scene::{DemoScene, SceneSetupError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn FrameScene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to set up demo scene: {0}")]
    Scene(#[from] SceneSetupError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!(config_env_var = CONFIG_ENV_VAR, "=== pixelcam demo startup ===");

    let demo_config = load_config_from_env()?;
    info!(
        zoom = demo_config.camera.zoom,
        tile_scale = demo_config.tile_scale,
        chunk_size = demo_config.chunk_size,
        "demo_config"
    );
    let scene = DemoScene::new(&demo_config)?;

    Ok(AppWiring {
        config: demo_config.loop_config(),
        scene: Box::new(scene),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
