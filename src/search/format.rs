use serde::{Deserialize, Serialize};

use crate::sources::RawVideo;

/// Largo máximo de la descripción antes de truncar
const DESCRIPTION_LIMIT: usize = 100;

/// Resultado normalizado que expone la API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub id: usize,
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub duration: String,
    // Un Option aplanado no serializa nada cuando es None
    #[serde(flatten)]
    pub metadata: Option<ResultMetadata>,
}

/// Campos adicionales presentes solo con `include_metadata`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub author: String,
    pub author_url: Option<String>,
    pub views: String,
    pub uploaded_at: String,
    pub duration_in_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Convierte "MM:SS" o "HH:MM:SS" a segundos. Cualquier otra forma,
/// componente no numérico o entrada vacía devuelve 0; nunca falla.
pub fn parse_duration(duration: Option<&str>) -> u64 {
    let Some(raw) = duration else {
        return 0;
    };

    let parts: Result<Vec<u64>, _> = raw.split(':').map(str::parse).collect();

    match parts.as_deref() {
        Ok([minutes, seconds]) => minutes * 60 + seconds,
        Ok([hours, minutes, seconds]) => hours * 3600 + minutes * 60 + seconds,
        _ => 0,
    }
}

/// Formatea conteos de vistas: 1500000 → "1.5M", 2500 → "2.5K".
/// Entradas vacías o no numéricas devuelven cadena vacía.
pub fn format_views(views: Option<&str>) -> String {
    let Some(raw) = views else {
        return String::new();
    };

    if raw.is_empty() {
        return String::new();
    }

    match raw.trim().parse::<u64>() {
        Ok(n) if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        Ok(n) if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        Ok(n) => n.to_string(),
        Err(_) => String::new(),
    }
}

/// Crea el objeto de resultado estándar a partir de un registro crudo.
/// `index` es la posición (base cero) dentro de los resultados aceptados.
pub fn create_result_object(item: &RawVideo, index: usize, include_metadata: bool) -> ResultItem {
    let url = item
        .link
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| item.url.clone().filter(|u| !u.is_empty()))
        .unwrap_or_default();

    let thumbnail = item.thumbnails.first().and_then(|t| t.url.clone());

    let metadata = include_metadata.then(|| {
        let author = item
            .channel
            .as_ref()
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let author_url = item.channel.as_ref().and_then(|c| c.link.clone());

        let views_raw = item.view_count.as_deref().or(item.views.as_deref());

        let description = item
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(truncate_description);

        ResultMetadata {
            author,
            author_url,
            views: format_views(views_raw),
            uploaded_at: item.published_time.clone().unwrap_or_default(),
            duration_in_seconds: parse_duration(item.duration.as_deref()),
            description,
        }
    });

    ResultItem {
        id: index + 1,
        title: item.title.clone().unwrap_or_else(|| "Unknown".to_string()),
        url,
        thumbnail,
        duration: item.duration.clone().unwrap_or_else(|| "N/A".to_string()),
        metadata,
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let truncated: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        description.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(Some("3:45")), 225);
        assert_eq!(parse_duration(Some("1:02:03")), 3723);
        assert_eq!(parse_duration(Some("0:00")), 0);
        assert_eq!(parse_duration(Some("")), 0);
        assert_eq!(parse_duration(Some("abc:def")), 0);
        assert_eq!(parse_duration(Some("12")), 0);
        assert_eq!(parse_duration(Some("1:2:3:4")), 0);
        assert_eq!(parse_duration(None), 0);
    }

    #[test]
    fn test_format_views() {
        assert_eq!(format_views(Some("1500000")), "1.5M");
        assert_eq!(format_views(Some("1000000")), "1.0M");
        assert_eq!(format_views(Some("2500")), "2.5K");
        assert_eq!(format_views(Some("999")), "999");
        assert_eq!(format_views(Some("no es un número")), "");
        assert_eq!(format_views(Some("")), "");
        assert_eq!(format_views(None), "");
    }

    #[test]
    fn test_result_object_basic_fields() {
        let raw = RawVideo::video("Test Song")
            .with_link("https://youtube.com/watch?v=abc")
            .with_duration("3:45")
            .with_thumbnail("https://img.example/abc.jpg");

        let result = create_result_object(&raw, 0, false);

        assert_eq!(result.id, 1);
        assert_eq!(result.title, "Test Song");
        assert_eq!(result.url, "https://youtube.com/watch?v=abc");
        assert_eq!(result.thumbnail.as_deref(), Some("https://img.example/abc.jpg"));
        assert_eq!(result.duration, "3:45");
        assert!(result.metadata.is_none());
    }

    #[test]
    fn test_result_object_fallbacks() {
        let raw = RawVideo {
            kind: "video".to_string(),
            ..RawVideo::default()
        };

        let result = create_result_object(&raw, 4, true);

        assert_eq!(result.id, 5);
        assert_eq!(result.title, "Unknown");
        assert_eq!(result.url, "");
        assert_eq!(result.thumbnail, None);
        assert_eq!(result.duration, "N/A");

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.author, "Unknown");
        assert_eq!(metadata.author_url, None);
        assert_eq!(metadata.views, "");
        assert_eq!(metadata.uploaded_at, "");
        assert_eq!(metadata.duration_in_seconds, 0);
        assert!(metadata.description.is_none());
    }

    #[test]
    fn test_result_object_metadata() {
        let raw = RawVideo::video("Song")
            .with_link("https://youtube.com/watch?v=abc")
            .with_duration("4:10")
            .with_channel("Artist", Some("https://youtube.com/@artist".to_string()))
            .with_views("2500");

        let result = create_result_object(&raw, 0, true);
        let metadata = result.metadata.unwrap();

        assert_eq!(metadata.author, "Artist");
        assert_eq!(
            metadata.author_url.as_deref(),
            Some("https://youtube.com/@artist")
        );
        assert_eq!(metadata.views, "2.5K");
        assert_eq!(metadata.duration_in_seconds, 250);
    }

    #[test]
    fn test_description_truncated_to_100_chars() {
        let long = "x".repeat(150);
        let raw = RawVideo::video("Song").with_description(long);

        let result = create_result_object(&raw, 0, true);
        let description = result.metadata.unwrap().description.unwrap();

        assert_eq!(description.chars().count(), 103);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_short_description_not_truncated() {
        let raw = RawVideo::video("Song").with_description("corta");

        let result = create_result_object(&raw, 0, true);
        assert_eq!(result.metadata.unwrap().description.as_deref(), Some("corta"));
    }

    #[test]
    fn test_metadata_fields_flattened_in_json() {
        let raw = RawVideo::video("Song").with_duration("3:45");
        let json = serde_json::to_value(create_result_object(&raw, 0, true)).unwrap();

        assert_eq!(json["durationInSeconds"], 225);
        assert_eq!(json["author"], "Unknown");
        // Sin metadata, esos campos no aparecen
        let json = serde_json::to_value(create_result_object(&raw, 0, false)).unwrap();
        assert!(json.get("durationInSeconds").is_none());
        assert!(json.get("author").is_none());
    }
}
