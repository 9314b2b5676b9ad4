use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use super::{ResultItem, SearchConfig, SearchOptions, SearchService};

/// Títulos considerados para derivar consultas relacionadas
const TITLE_SAMPLE: usize = 2;
/// Solo palabras más largas que esto aportan a la consulta derivada
const MIN_WORD_LEN: usize = 3;

/// Deriva consultas relacionadas a partir de los primeros títulos.
///
/// Cada título aporta hasta dos palabras largas; solo los que aportan
/// exactamente dos forman una candidata `"<w1> <w2> music"`. La consulta
/// original queda excluida.
pub fn derive_related_queries(query: &str, results: &[ResultItem]) -> Vec<String> {
    let mut related = HashSet::new();

    for result in results.iter().take(TITLE_SAMPLE) {
        let words: Vec<&str> = result
            .title
            .split_whitespace()
            .filter(|word| word.chars().count() > MIN_WORD_LEN)
            .take(2)
            .collect();

        if words.len() >= 2 {
            related.insert(format!("{} {} music", words[0], words[1]));
        }
    }

    related
        .into_iter()
        .filter(|candidate| candidate != query)
        .collect()
}

/// Worker de prefetch: calienta el cache con búsquedas relacionadas de
/// baja prioridad. Corre desacoplado del request que lo disparó y todos
/// sus fallos se tragan; nunca afecta al caller original.
pub async fn prefetch_related_queries(
    service: SearchService,
    query: String,
    results: Vec<ResultItem>,
    config: SearchConfig,
) {
    let related = derive_related_queries(&query, &results);

    if related.is_empty() {
        return;
    }

    // Pool acotado: el fan-out de prefetch no puede monopolizar el scheduler
    let Ok(_permit) = service.prefetch_pool.clone().acquire_owned().await else {
        return;
    };

    for related_query in related {
        // Retraso aleatorio para no saturar al proveedor
        let delay = rand::thread_rng().gen_range(2.0..5.0);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;

        let options = SearchOptions {
            limit: Some(5),
            include_metadata: Some(false),
            prefetch_related: Some(false),
            timeout: Some(config.timeout),
            ..SearchOptions::default()
        };

        match service.search_boxed(related_query.clone(), options).await {
            Ok(response) if response.success => {
                debug!("Prefetch completado para \"{}\"", related_query);
            }
            Ok(_) => debug!("Prefetch sin resultados para \"{}\"", related_query),
            // Los errores de prefetch se ignoran por completo
            Err(_) => {}
        }
    }
}
