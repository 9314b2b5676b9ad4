pub mod youtube;

use anyhow::Result;
use async_trait::async_trait;

pub use youtube::YouTubeSearchClient;

/// Seam del proveedor de búsqueda. El orquestador reintenta sobre esta
/// interfaz; en tests se reemplaza por un mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Pide hasta `limit` candidatos crudos para la consulta.
    async fn search_videos(&self, query: &str, limit: usize) -> Result<Vec<RawVideo>>;
}

/// Registro crudo tal como lo entrega el proveedor, antes de filtrar y
/// normalizar. Los pares `link`/`url` y `view_count`/`views` existen porque
/// distintos proveedores nombran esos campos de forma distinta.
#[derive(Debug, Clone, Default)]
pub struct RawVideo {
    pub kind: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub url: Option<String>,
    pub thumbnails: Vec<RawThumbnail>,
    pub duration: Option<String>,
    pub is_live: bool,
    pub channel: Option<RawChannel>,
    pub view_count: Option<String>,
    pub views: Option<String>,
    pub published_time: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawThumbnail {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawChannel {
    pub name: Option<String>,
    pub link: Option<String>,
}

impl RawVideo {
    #[allow(dead_code)]
    pub fn video(title: impl Into<String>) -> Self {
        Self {
            kind: "video".to_string(),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnails.push(RawThumbnail {
            url: Some(url.into()),
        });
        self
    }

    #[allow(dead_code)]
    pub fn with_channel(mut self, name: impl Into<String>, link: Option<String>) -> Self {
        self.channel = Some(RawChannel {
            name: Some(name.into()),
            link,
        });
        self
    }

    #[allow(dead_code)]
    pub fn with_views(mut self, views: impl Into<String>) -> Self {
        self.view_count = Some(views.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[allow(dead_code)]
    pub fn live(mut self) -> Self {
        self.is_live = true;
        self
    }
}
