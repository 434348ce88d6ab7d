//! Security headers applied to every response
//!
//! - X-Content-Type-Options: nosniff (prevents MIME type sniffing)
//! - X-Frame-Options: DENY (prevents clickjacking)
//!
//! axum emits no `X-Powered-By`, so there is nothing to strip.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_security_headers_present_on_responses() {
        let app = Router::new()
            .route("/test", get(|| async { "OK" }))
            .layer(middleware::from_fn(security_headers));

        let request = axum::http::Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
        assert!(!response.headers().contains_key("X-Powered-By"));
    }
}
