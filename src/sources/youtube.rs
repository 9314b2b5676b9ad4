use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use super::{RawChannel, RawThumbnail, RawVideo, VideoSearchProvider};

/// Cliente de búsqueda respaldado por yt-dlp
pub struct YouTubeSearchClient {
    rate_limiter: tokio::sync::Semaphore,
}

/// Información extraída de yt-dlp (una línea JSON por resultado)
#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    duration: Option<f64>,
    channel: Option<String>,
    uploader: Option<String>,
    channel_url: Option<String>,
    uploader_url: Option<String>,
    view_count: Option<u64>,
    thumbnails: Option<Vec<YtDlpThumbnail>>,
    description: Option<String>,
    live_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YtDlpThumbnail {
    url: Option<String>,
}

impl YouTubeSearchClient {
    pub fn new() -> Self {
        Self {
            // Limitar procesos yt-dlp concurrentes para evitar rate limiting
            rate_limiter: tokio::sync::Semaphore::new(3),
        }
    }

    /// Convierte una entrada de yt-dlp al registro crudo del proveedor
    fn entry_to_raw(entry: YtDlpEntry) -> RawVideo {
        let is_live = matches!(
            entry.live_status.as_deref(),
            Some("is_live") | Some("post_live")
        );

        // Las entradas planas de búsqueda traen id de video; canales y
        // playlists llegan sin él
        let kind = if entry.id.is_some() { "video" } else { "unknown" };

        RawVideo {
            kind: kind.to_string(),
            title: entry.title,
            link: entry.webpage_url,
            url: entry.url,
            thumbnails: entry
                .thumbnails
                .unwrap_or_default()
                .into_iter()
                .map(|t| RawThumbnail { url: t.url })
                .collect(),
            duration: entry.duration.map(|d| format_clock(d as u64)),
            is_live,
            channel: Some(RawChannel {
                name: entry.channel.or(entry.uploader),
                link: entry.channel_url.or(entry.uploader_url),
            }),
            view_count: entry.view_count.map(|v| v.to_string()),
            views: None,
            // El modo flat de yt-dlp no expone fecha de publicación legible
            published_time: None,
            description: entry.description,
        }
    }
}

#[async_trait]
impl VideoSearchProvider for YouTubeSearchClient {
    async fn search_videos(&self, query: &str, limit: usize) -> Result<Vec<RawVideo>> {
        let _permit = self.rate_limiter.acquire().await?;

        info!("🔍 Buscando en YouTube: {}", query);

        let search_query = format!("ytsearch{}:{}", limit, query);

        let output = Command::new("yt-dlp")
            .args([
                "--no-playlist",
                "--dump-json",
                "--flat-playlist",
                "--skip-download",
                "--no-warnings",
                &search_query,
            ])
            .output()
            .await
            .context("Error al ejecutar yt-dlp")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp error: {}", error);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut results = Vec::new();

        for line in stdout.lines() {
            if let Ok(entry) = serde_json::from_str::<YtDlpEntry>(line) {
                results.push(Self::entry_to_raw(entry));
            }
        }

        debug!("yt-dlp devolvió {} candidatos para \"{}\"", results.len(), query);

        Ok(results)
    }
}

/// Formatea segundos como "M:SS" o "H:MM:SS"
fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
