use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

mod api;
mod audio;
mod cache;
mod config;
mod error;
mod search;
mod sources;

use crate::api::AppState;
use crate::audio::{AudioDownloader, AudioService, ObjectStoreUploader};
use crate::cache::SearchCache;
use crate::config::Config;
use crate::search::SearchService;
use crate::sources::YouTubeSearchClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("open_music_api=debug".parse()?)
                .add_directive("axum=info".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Open Music API v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;

    // Manejar health check si es necesario
    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check().await;
    }

    info!("{}", config.summary());

    // Cache construido explícitamente; vive en el estado del servidor, no
    // en un singleton de módulo
    let cache = Arc::new(SearchCache::new(config.cache_ttl_seconds, config.cache_size));

    // Servicios
    let provider = Arc::new(YouTubeSearchClient::new());
    let search = SearchService::new(provider, cache);

    let downloader = AudioDownloader::new(config.audio_quality.clone(), config.ffmpeg_path.clone());
    let uploader = ObjectStoreUploader::new(
        config.cloud_name.clone(),
        config.api_key.clone(),
        config.upload_preset.clone(),
    )?;
    let audio = AudioService::new(downloader, uploader, config.temp_dir.clone());

    let app = api::router(AppState { search, audio });

    // Manejar shutdown graceful
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Error al registrar Ctrl+C");
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        std::process::exit(0);
    });

    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("🚀 API escuchando en http://{}", listener.local_addr()?);

    if let Err(why) = axum::serve(listener, app).await {
        error!("Error al ejecutar el servidor: {:?}", why);
    }

    Ok(())
}

async fn health_check() -> Result<()> {
    // Verificar dependencias críticas
    let yt_dlp = tokio::process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .await?;

    let ffmpeg = tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await?;

    if yt_dlp.status.success() && ffmpeg.status.success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("Dependencias faltantes");
    }
}
