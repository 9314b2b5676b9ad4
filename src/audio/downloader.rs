use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{info, warn};
use url::Url;

/// Descargador de audio respaldado por yt-dlp + ffmpeg
#[derive(Clone)]
pub struct AudioDownloader {
    /// Calidad del MP3 en kbps, pasada al postprocesador de ffmpeg
    quality: String,
    ffmpeg_path: Option<String>,
}

impl AudioDownloader {
    pub fn new(quality: impl Into<String>, ffmpeg_path: Option<String>) -> Self {
        Self {
            quality: quality.into(),
            ffmpeg_path,
        }
    }

    /// Descarga el audio de `url` y lo convierte a MP3.
    /// Devuelve la ruta final `<output_base>.mp3`.
    pub async fn download_audio(&self, url: &str, output_base: &Path) -> Result<PathBuf> {
        validate_video_url(url)?;

        info!("📥 Preparando descarga de audio desde {}", url);

        if let Some(parent) = output_base.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("No se pudo crear el directorio de salida")?;
        }

        // Cookies opcionales desde el entorno, materializadas a un archivo
        // temporal que se borra solo al salir de scope
        let cookies = cookies_from_env()?;

        let authenticated = self
            .run_ytdlp(url, output_base, cookies.as_ref().map(|c| c.path()))
            .await;

        if let Err(error) = authenticated {
            warn!(
                "⚠️ Descarga autenticada falló: {:#}. Reintentando acceso público...",
                error
            );
            self.run_ytdlp(url, output_base, None)
                .await
                .with_context(|| format!("All download attempts failed: {}", error))?;
        }

        let final_path = output_base.with_extension("mp3");
        let metadata = tokio::fs::metadata(&final_path).await.with_context(|| {
            format!(
                "Output file not found after download: {}",
                final_path.display()
            )
        })?;

        info!(
            "✅ Descarga completa: {} ({:.2} MB)",
            final_path.display(),
            metadata.len() as f64 / (1024.0 * 1024.0)
        );

        Ok(final_path)
    }

    async fn run_ytdlp(&self, url: &str, output_base: &Path, cookies: Option<&Path>) -> Result<()> {
        let template = format!("{}.%(ext)s", output_base.display());

        let mut cmd = Command::new("yt-dlp");
        cmd.args([
            "--no-playlist",
            "-f",
            "bestaudio/best",
            "-x",
            "--audio-format",
            "mp3",
            "--audio-quality",
            &self.quality,
            "--no-warnings",
            "-o",
            &template,
        ]);

        if let Some(ffmpeg) = &self.ffmpeg_path {
            cmd.args(["--ffmpeg-location", ffmpeg]);
        }

        if let Some(cookies) = cookies {
            info!("🍪 Usando cookies temporales: {}", cookies.display());
            cmd.arg("--cookies").arg(cookies);
        }

        cmd.arg(url);

        let output = cmd.output().await.context("Error al ejecutar yt-dlp")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp error: {}", error.trim());
        }

        Ok(())
    }
}

/// Valida que la URL sea http(s) bien formada antes de invocar yt-dlp
fn validate_video_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("URL mal formada: {}", url))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("Esquema de URL no soportado: {}", parsed.scheme());
    }

    Ok(())
}

/// Crea un archivo temporal de cookies a partir de YOUTUBE_COOKIES.
/// Sin la variable (o vacía) la descarga sigue sin autenticación.
fn cookies_from_env() -> Result<Option<NamedTempFile>> {
    let Ok(contents) = std::env::var("YOUTUBE_COOKIES") else {
        return Ok(None);
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let file = NamedTempFile::new().context("No se pudo crear el archivo temporal de cookies")?;
    std::fs::write(file.path(), contents)
        .context("No se pudieron escribir las cookies temporales")?;

    Ok(Some(file))
}
