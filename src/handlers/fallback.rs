use crate::core::error::QueueError;
use axum::{
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

pub async fn fallback_handler(headers: HeaderMap) -> Response {
    // Check if this is a browser request
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let is_browser = user_agent.contains("Mozilla")
        || user_agent.contains("Chrome")
        || user_agent.contains("Safari")
        || user_agent.contains("Firefox")
        || user_agent.contains("Edge");

    if is_browser {
        let html = "Nothing to see here. Lost in the void!";

        return Html(html).into_response();
    }

    QueueError::NotFound(
        "Endpoint".to_string(),
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_browser_gets_html() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", "Mozilla/5.0".parse().unwrap());

        let response = fallback_handler(headers).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_client_gets_404() {
        let headers = HeaderMap::new();

        let response = fallback_handler(headers).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
