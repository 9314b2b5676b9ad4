use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Subidor de archivos a un almacén de objetos estilo Cloudinary
#[derive(Clone)]
pub struct ObjectStoreUploader {
    client: reqwest::Client,
    cloud_name: Option<String>,
    api_key: Option<String>,
    upload_preset: Option<String>,
}

impl ObjectStoreUploader {
    pub fn new(
        cloud_name: Option<String>,
        api_key: Option<String>,
        upload_preset: Option<String>,
    ) -> Result<Self> {
        if cloud_name.is_none() || api_key.is_none() || upload_preset.is_none() {
            warn!("⚠️ Credenciales de subida incompletas; /api/download fallará");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("No se pudo construir el cliente HTTP de subida")?;

        Ok(Self {
            client,
            cloud_name,
            api_key,
            upload_preset,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.api_key.is_some() && self.upload_preset.is_some()
    }

    /// Sube un archivo y devuelve su URL pública
    pub async fn upload_file(&self, file_path: &Path) -> Result<String> {
        let cloud_name = self
            .cloud_name
            .as_deref()
            .context("Almacén de objetos sin configurar: falta CLOUD_NAME")?;
        let upload_preset = self
            .upload_preset
            .as_deref()
            .context("Almacén de objetos sin configurar: falta UPLOAD_PRESET")?;

        info!("☁️ Subiendo archivo al almacén: {}", file_path.display());

        let bytes = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("No se pudo leer {}", file_path.display()))?;
        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let mut form = reqwest::multipart::Form::new()
            .text("upload_preset", upload_preset.to_string())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        if let Some(api_key) = &self.api_key {
            form = form.text("api_key", api_key.clone());
        }

        let endpoint = format!("https://api.cloudinary.com/v1_1/{}/video/upload", cloud_name);

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .context("Fallo de red durante la subida")?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .context("La respuesta de subida no es JSON")?;

        if !status.is_success() {
            error!("❌ Subida rechazada ({}): {}", status, body);
            anyhow::bail!("Failed to upload file: status {}", status);
        }

        match body.get("secure_url").and_then(Value::as_str) {
            Some(url) => {
                info!("✅ Subida exitosa: {}", url);
                Ok(url.to_string())
            }
            None => anyhow::bail!("Invalid upload response from object store"),
        }
    }
}
