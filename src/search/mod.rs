pub mod format;
pub mod prefetch;

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::SearchCache;
use crate::error::{AttemptError, SearchError};
use crate::sources::{RawVideo, VideoSearchProvider};

pub use format::{create_result_object, format_views, parse_duration, ResultItem};

/// Workers máximos de prefetch en vuelo
const PREFETCH_WORKERS: usize = 4;

/// Configuración efectiva de una búsqueda
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Máximo de resultados devueltos
    pub limit: usize,
    /// Intentos totales contra el proveedor
    pub max_retries: u32,
    /// Duración mínima aceptada, en segundos (inclusive)
    pub min_duration: u64,
    /// Duración máxima aceptada, en segundos (inclusive)
    pub max_duration: u64,
    /// Excluir transmisiones en vivo
    pub filter_live: bool,
    /// Incluir autor/vistas/fecha/descripción en cada resultado
    pub include_metadata: bool,
    /// Guardar el resultado en el cache
    pub cache_results: bool,
    /// Calentar el cache con búsquedas relacionadas
    pub prefetch_related: bool,
    /// Deadline por intento, en milisegundos
    pub timeout: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            max_retries: 2,
            min_duration: 0,
            max_duration: 600,
            filter_live: true,
            include_metadata: true,
            cache_results: true,
            prefetch_related: true,
            timeout: 15_000,
        }
    }
}

/// Overrides parciales aportados por el caller; lo no especificado cae en
/// los defaults de [`SearchConfig`]
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    pub max_retries: Option<u32>,
    pub min_duration: Option<u64>,
    pub max_duration: Option<u64>,
    pub filter_live: Option<bool>,
    pub include_metadata: Option<bool>,
    pub cache_results: Option<bool>,
    pub prefetch_related: Option<bool>,
    pub timeout: Option<u64>,
}

impl SearchOptions {
    fn merge_into(self, mut config: SearchConfig) -> SearchConfig {
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(min_duration) = self.min_duration {
            config.min_duration = min_duration;
        }
        if let Some(max_duration) = self.max_duration {
            config.max_duration = max_duration;
        }
        if let Some(filter_live) = self.filter_live {
            config.filter_live = filter_live;
        }
        if let Some(include_metadata) = self.include_metadata {
            config.include_metadata = include_metadata;
        }
        if let Some(cache_results) = self.cache_results {
            config.cache_results = cache_results;
        }
        if let Some(prefetch_related) = self.prefetch_related {
            config.prefetch_related = prefetch_related;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config
    }
}

/// Payload de búsqueda que expone la API y guarda el cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    fn ok(query: String, results: Vec<ResultItem>) -> Self {
        Self {
            success: true,
            query,
            total_results: Some(results.len()),
            results: Some(results),
            error: None,
        }
    }

    fn failed(query: String, error: String) -> Self {
        Self {
            success: false,
            query,
            total_results: None,
            results: None,
            error: Some(error),
        }
    }
}

/// Orquestador de búsqueda: cache, reintentos con backoff y prefetch.
///
/// El cache y el proveedor se inyectan al construirlo; el ciclo de vida
/// queda atado al estado del servidor, sin singletons de módulo.
#[derive(Clone)]
pub struct SearchService {
    provider: Arc<dyn VideoSearchProvider>,
    cache: Arc<SearchCache>,
    prefetch_pool: Arc<Semaphore>,
}

impl SearchService {
    pub fn new(provider: Arc<dyn VideoSearchProvider>, cache: Arc<SearchCache>) -> Self {
        Self {
            provider,
            cache,
            prefetch_pool: Arc::new(Semaphore::new(PREFETCH_WORKERS)),
        }
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Normaliza la consulta añadiendo " music" salvo que ya lo mencione
    fn normalize_query(query: &str) -> String {
        if query.to_lowercase().contains("music") {
            query.to_string()
        } else {
            format!("{} music", query)
        }
    }

    /// Clave derivada de la consulta normalizada y el límite.
    ///
    /// Ignora deliberadamente min/max_duration y filter_live: dos búsquedas
    /// que solo difieren en esos filtros comparten la misma entrada.
    fn cache_key(query: &str, limit: usize) -> String {
        format!("yt_{}_{}", query.to_lowercase().replace(' ', "_"), limit)
    }

    /// Ejecuta una búsqueda completa.
    ///
    /// Solo una consulta vacía produce `Err`; el agotamiento de reintentos
    /// se reporta dentro del payload con `success: false`.
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let config = options.merge_into(SearchConfig::default());
        let search_query = Self::normalize_query(query);
        let cache_key = Self::cache_key(&search_query, config.limit);

        if config.cache_results {
            if let Some(cached) = self.cache.get(&cache_key) {
                info!("⚡ Cache hit para \"{}\"", search_query);
                return Ok(cached);
            }
        }

        info!(
            "🔍 Iniciando búsqueda de \"{}\" con timeout {}ms",
            search_query, config.timeout
        );

        let mut attempts: u32 = 0;
        let mut last_error: Option<AttemptError> = None;

        while attempts < config.max_retries {
            debug!("Intento {} para \"{}\"", attempts + 1, search_query);

            match self.attempt(&search_query, &config).await {
                Ok(results) => {
                    info!(
                        "✅ {} resultados válidos para \"{}\"",
                        results.len(),
                        search_query
                    );

                    let response = SearchResponse::ok(search_query, results);

                    if config.cache_results {
                        self.cache.set(cache_key, response.clone());

                        if config.prefetch_related {
                            self.spawn_prefetch(&response, &config);
                        }
                    }

                    return Ok(response);
                }
                Err(error) => {
                    warn!("❌ Intento {} falló: {}", attempts + 1, error);
                    attempts += 1;

                    if attempts < config.max_retries {
                        // Backoff exponencial
                        let delay_ms = 1000 * 2u64.pow(attempts);
                        debug!("Esperando {}ms antes del próximo intento...", delay_ms);
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }

                    last_error = Some(error);
                }
            }
        }

        warn!(
            "❌ Los {} intentos de búsqueda fallaron para \"{}\"",
            config.max_retries, search_query
        );

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Search failed after multiple attempts".to_string());

        Ok(SearchResponse::failed(search_query, message))
    }

    /// Un intento contra el proveedor: deadline, filtrado y normalización
    async fn attempt(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<ResultItem>, AttemptError> {
        // Se sobrepiden candidatos para sobrevivir al filtrado
        let fetch_limit = (config.limit + 5).min(30);
        let deadline = Duration::from_millis(config.timeout);

        let raw = match tokio::time::timeout(
            deadline,
            self.provider.search_videos(query, fetch_limit),
        )
        .await
        {
            // El deadline abandona la llamada en vuelo; el proveedor puede
            // terminar por su cuenta sin que nadie espere el resultado
            Err(_) => return Err(AttemptError::Timeout(config.timeout)),
            Ok(Err(error)) => return Err(AttemptError::Provider(error.to_string())),
            Ok(Ok(raw)) => raw,
        };

        if raw.is_empty() {
            return Err(AttemptError::NoResults);
        }

        debug!("{} candidatos crudos para \"{}\"", raw.len(), query);

        let results = filter_candidates(&raw, config);

        if results.is_empty() {
            return Err(AttemptError::NoValidResults);
        }

        Ok(results)
    }

    fn spawn_prefetch(&self, response: &SearchResponse, config: &SearchConfig) {
        let service = self.clone();
        let query = response.query.clone();
        let results = response.results.clone().unwrap_or_default();
        let config = config.clone();

        tokio::spawn(async move {
            prefetch::prefetch_related_queries(service, query, results, config).await;
        });
    }

    /// Versión boxed de [`search`](Self::search) para las tareas de
    /// prefetch, que re-entran al orquestador
    pub(crate) fn search_boxed(
        &self,
        query: String,
        options: SearchOptions,
    ) -> BoxFuture<'static, Result<SearchResponse, SearchError>> {
        let service = self.clone();
        async move { service.search(&query, options).await }.boxed()
    }
}

/// Filtra candidatos en orden y los normaliza hasta `limit`.
///
/// Solo videos; descarta vivos cuando `filter_live`; descarta duraciones
/// fuera de rango cuando el registro trae duración. Los candidatos después
/// de completar `limit` ni se evalúan.
fn filter_candidates(raw: &[RawVideo], config: &SearchConfig) -> Vec<ResultItem> {
    let mut valid = Vec::new();

    for item in raw {
        if item.kind != "video" {
            continue;
        }

        if config.filter_live && item.is_live {
            continue;
        }

        if let Some(duration) = item.duration.as_deref() {
            let seconds = parse_duration(Some(duration));
            if seconds < config.min_duration || seconds > config.max_duration {
                continue;
            }
        }

        valid.push(create_result_object(item, valid.len(), config.include_metadata));

        if valid.len() >= config.limit {
            break;
        }
    }

    valid
}
