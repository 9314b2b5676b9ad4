//! # Cache Module
//!
//! Cache en memoria para resultados de búsqueda formateados.
//!
//! La API reduce llamadas redundantes al proveedor guardando cada
//! `SearchResponse` exitoso bajo una clave derivada de la consulta
//! normalizada y el límite pedido. Las entradas expiran por TTL y el
//! cache completo está acotado por capacidad.
//!
//! Configuración vía variables de entorno:
//!
//! ```env
//! CACHE_SIZE=100    # Máximo de entradas
//! CACHE_TTL=3600    # Time-to-live en segundos (1 hora)
//! ```

pub mod ttl_cache;

pub use ttl_cache::{CacheStats, TtlCache};

use crate::search::SearchResponse;

/// Cache principal de resultados de búsqueda.
///
/// Indexado por clave de búsqueda (consulta normalizada + límite); guarda
/// el payload ya formateado que expone la API, listo para devolverse sin
/// tocar al proveedor.
pub type SearchCache = TtlCache<String, SearchResponse>;
