use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Envuelve datos en la respuesta estándar `{success: true, data}`
pub fn success_response<T: Serialize>(data: T) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    )
}

/// Respuesta de error estándar `{success: false, error}`
pub fn error_response(message: impl Into<String>, status: StatusCode) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_envelope_shape() {
        let (status, Json(body)) = success_response(json!({ "answer": 42 }));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": { "answer": 42 } }));
    }

    #[test]
    fn test_error_envelope_shape() {
        let (status, Json(body)) = error_response("Missing search query", StatusCode::BAD_REQUEST);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Missing search query" })
        );
    }
}
