use thiserror::Error;

/// Error terminal de búsqueda: nunca se reintenta y se detecta antes de
/// cualquier I/O. El routing lo mapea a 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search query must be a non-empty string.")]
    InvalidQuery,
}

/// Fallo transitorio de un intento de búsqueda. El loop de reintentos los
/// consume como valores; ninguno escapa hacia el caller.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Search timeout after {0}ms")]
    Timeout(u64),

    #[error("No results returned from search")]
    NoResults,

    #[error("No valid results found after filtering")]
    NoValidResults,

    #[error("Provider error: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_error_messages() {
        assert_eq!(
            AttemptError::Timeout(15000).to_string(),
            "Search timeout after 15000ms"
        );
        assert_eq!(
            AttemptError::NoResults.to_string(),
            "No results returned from search"
        );
        assert_eq!(
            AttemptError::NoValidResults.to_string(),
            "No valid results found after filtering"
        );
    }
}
