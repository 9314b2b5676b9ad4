//! Pipeline de audio: descarga con yt-dlp, conversión a MP3 y subida al
//! almacén de objetos. Cada request se procesa bajo un nombre único y el
//! archivo temporal se elimina tras subirlo.

pub mod downloader;
pub mod uploader;

use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

pub use downloader::AudioDownloader;
pub use uploader::ObjectStoreUploader;

/// Servicio que encadena descarga → subida → limpieza
#[derive(Clone)]
pub struct AudioService {
    downloader: AudioDownloader,
    uploader: ObjectStoreUploader,
    temp_dir: PathBuf,
}

impl AudioService {
    pub fn new(
        downloader: AudioDownloader,
        uploader: ObjectStoreUploader,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            downloader,
            uploader,
            temp_dir,
        }
    }

    pub fn uploader_configured(&self) -> bool {
        self.uploader.is_configured()
    }

    /// Descarga el audio de la URL, lo sube y devuelve la URL pública
    pub async fn process(&self, video_url: &str) -> Result<String> {
        let unique_id = Uuid::new_v4().to_string();
        let output_base = self.temp_dir.join(&unique_id);

        info!("🎵 Iniciando procesamiento de audio para: {}", video_url);

        let downloaded = self.downloader.download_audio(video_url, &output_base).await?;
        let public_url = self.uploader.upload_file(&downloaded).await?;

        if let Err(error) = tokio::fs::remove_file(&downloaded).await {
            warn!(
                "⚠️ No se pudo borrar el archivo temporal {}: {}",
                downloaded.display(),
                error
            );
        } else {
            info!("🧹 Archivo temporal eliminado: {}", downloaded.display());
        }

        Ok(public_url)
    }
}
