use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Servidor
    pub host: String,
    pub port: u16,

    // Cache de búsqueda
    pub cache_size: usize,
    pub cache_ttl_seconds: u64,

    // Audio
    pub audio_quality: String, // kbps para el postprocesador de ffmpeg
    pub ffmpeg_path: Option<String>,
    pub temp_dir: PathBuf,

    // Almacén de objetos (opcional; sin credenciales /api/download falla)
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub upload_preset: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Servidor
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,

            // Cache
            cache_size: std::env::var("CACHE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            cache_ttl_seconds: std::env::var("CACHE_TTL")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,

            // Audio
            audio_quality: std::env::var("AUDIO_QUALITY").unwrap_or_else(|_| "192".to_string()),
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
            temp_dir: std::env::var("TEMP_DIR")
                .unwrap_or_else(|_| "/tmp".to_string())
                .into(),

            // Almacén de objetos
            cloud_name: std::env::var("CLOUD_NAME").ok(),
            api_key: std::env::var("API_KEY").ok(),
            upload_preset: std::env::var("UPLOAD_PRESET").ok(),
        };

        // Create directories if they don't exist
        std::fs::create_dir_all(&config.temp_dir)?;

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port must be greater than 0");
        }

        if self.cache_size == 0 {
            anyhow::bail!("Cache size must be greater than 0");
        }

        if self.cache_ttl_seconds == 0 {
            anyhow::bail!("Cache TTL must be greater than 0");
        }

        if self.audio_quality.parse::<u32>().is_err() {
            anyhow::bail!(
                "Audio quality must be numeric kbps, got: {}",
                self.audio_quality
            );
        }

        Ok(())
    }

    /// Resumen de la configuración para el arranque, sin credenciales
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Server: {}:{}\n  \
            Cache: {} entries, {}s TTL\n  \
            Audio: {}kbps MP3, temp dir {}\n  \
            Uploader: {}",
            self.host,
            self.port,
            self.cache_size,
            self.cache_ttl_seconds,
            self.audio_quality,
            self.temp_dir.display(),
            if self.cloud_name.is_some() {
                "configured"
            } else {
                "not configured"
            }
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cache_size: 100,
            cache_ttl_seconds: 3600,
            audio_quality: "192".to_string(),
            ffmpeg_path: None,
            temp_dir: "/tmp".into(),
            cloud_name: None,
            api_key: None,
            upload_preset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_cache_size_is_rejected() {
        let config = Config {
            cache_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_numeric_audio_quality_is_rejected() {
        let config = Config {
            audio_quality: "alta".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
