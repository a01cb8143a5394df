//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, access log)
//! - Serve plain HTTP or TLS with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::access_log::access_log;
use super::handlers;
use crate::config::{CaptureConfig, ReflectorConfig};
use crate::lifecycle::shutdown;
use crate::net::TlsInfoAcceptor;
use crate::render::{HtmlRenderer, Renderer};

/// Application state injected into handlers.
///
/// Read-only after construction; cloning shares the renderer.
#[derive(Clone)]
pub struct AppState {
    pub capture: CaptureConfig,
    pub renderer: Arc<dyn Renderer>,
}

/// HTTP server for the reflector.
pub struct HttpServer {
    router: Router,
    config: ReflectorConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the built-in HTML renderer.
    pub fn new(config: ReflectorConfig) -> Self {
        Self::with_renderer(config, Arc::new(HtmlRenderer::new()))
    }

    /// Create a server that renders pages with `renderer`.
    pub fn with_renderer(config: ReflectorConfig, renderer: Arc<dyn Renderer>) -> Self {
        let state = AppState {
            capture: config.capture.clone(),
            renderer,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ReflectorConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", any(handlers::health))
            .route("/collect", any(handlers::collect))
            .fallback(handlers::reflect)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                config.observability.access_log,
                access_log,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ReflectorConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            body_limit = self.config.capture.body_limit,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    ///
    /// In-flight requests get `timeouts.shutdown_grace_secs` to finish.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            body_limit = self.config.capture.body_limit,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        tokio::spawn(async move {
            shutdown::signalled(shutdown).await;
            drain.graceful_shutdown(Some(grace));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind(addr)
            .handle(handle)
            .acceptor(TlsInfoAcceptor::new(tls))
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReflectError;
    use crate::render::RenderModel;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn render(&self, _model: &RenderModel) -> Result<String, ReflectError> {
            Err(ReflectError::Render(std::fmt::Error))
        }
    }

    fn router_with(config: ReflectorConfig) -> Router {
        HttpServer::new(config).router()
    }

    fn router() -> Router {
        router_with(ReflectorConfig::default())
    }

    fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "reflector.test")
            .body(body)
            .unwrap();
        let peer: SocketAddr = "198.51.100.7:54321".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_plain_ok() {
        for method in ["GET", "POST", "DELETE"] {
            let res = router().oneshot(request(method, "/healthz", Body::empty())).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            assert!(res.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
            assert_eq!(body_text(res).await, "ok");
        }
    }

    #[tokio::test]
    async fn root_renders_first_phase() {
        let res = router().oneshot(request("GET", "/", Body::empty())).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");

        let html = body_text(res).await;
        assert!(html.contains("banner banner-info"));
        assert!(html.contains("window.__reflectorHasClientData = false;"));
        assert!(html.contains("198.51.100.7"));
        assert!(html.contains("54321"));
    }

    #[tokio::test]
    async fn any_path_and_method_reflects() {
        let res = router()
            .oneshot(request("PUT", "/some/where?x=1", Body::from("payload")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("&#x2F;some&#x2F;where?x=1"));
        assert!(html.contains("<pre>payload</pre>"));
    }

    #[tokio::test]
    async fn forwarded_for_shows_as_remote_ip() {
        let mut req = request("GET", "/", Body::empty());
        req.headers_mut()
            .insert("x-forwarded-for", "203.0.113.5, 10.0.0.1".parse().unwrap());
        let html = body_text(router().oneshot(req).await.unwrap()).await;
        assert!(html.contains("<dt>Remote IP</dt><dd>203.0.113.5</dd>"));
    }

    #[tokio::test]
    async fn disabled_capture_skips_body() {
        let mut config = ReflectorConfig::default();
        config.capture.body_limit = 0;
        let res = router_with(config)
            .oneshot(request("POST", "/", Body::from("secret body")))
            .await
            .unwrap();
        let html = body_text(res).await;
        assert!(!html.contains("secret body"));
        assert!(html.contains("No request body captured."));
    }

    #[tokio::test]
    async fn collect_with_json_renders_enriched_page() {
        let res = router()
            .oneshot(request("POST", "/collect", Body::from(r#"{"timezone":"UTC"}"#)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("banner banner-success"));
        assert!(html.contains("window.__reflectorHasClientData = true;"));
        assert!(html.contains("&quot;timezone&quot;: &quot;UTC&quot;"));
    }

    #[tokio::test]
    async fn collect_with_empty_body_stays_in_first_phase() {
        let res = router().oneshot(request("POST", "/collect", Body::empty())).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("banner banner-info"));
        assert!(html.contains("window.__reflectorHasClientData = false;"));
    }

    #[tokio::test]
    async fn collect_rejects_invalid_json() {
        let res = router()
            .oneshot(request("POST", "/collect", Body::from("not-json")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(res).await, "invalid client payload");
    }

    #[tokio::test]
    async fn collect_rejects_non_object_json() {
        let res = router()
            .oneshot(request("POST", "/collect", Body::from("[1, 2, 3]")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn collect_requires_post() {
        let res = router().oneshot(request("GET", "/collect", Body::empty())).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(res.headers()[header::ALLOW].to_str().unwrap().contains("POST"));
    }

    #[tokio::test]
    async fn collect_uses_fallback_limit_when_capture_disabled() {
        let mut config = ReflectorConfig::default();
        config.capture.body_limit = -1;
        let res = router_with(config)
            .oneshot(request("POST", "/collect", Body::from(r#"{"a":1}"#)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("banner banner-success"));
    }

    #[tokio::test]
    async fn oversized_collect_payload_is_truncated_and_rejected() {
        let mut config = ReflectorConfig::default();
        config.capture.body_limit = 8;
        let res = router_with(config)
            .oneshot(request("POST", "/collect", Body::from(r#"{"timezone":"UTC"}"#)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn header_injection_is_escaped() {
        let mut req = request("GET", "/", Body::empty());
        req.headers_mut()
            .insert("x-probe", "<script>alert(1)</script>".parse().unwrap());
        let html = body_text(router().oneshot(req).await.unwrap()).await;
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
    }

    #[tokio::test]
    async fn body_read_failure_is_500() {
        let stream = futures_util::stream::iter(vec![Err::<&'static str, _>(
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        )]);
        let res = router()
            .oneshot(request("POST", "/", Body::from_stream(stream)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(res).await, "failed to read request body");
    }

    #[tokio::test]
    async fn render_failure_is_500() {
        let server = HttpServer::with_renderer(ReflectorConfig::default(), Arc::new(BrokenRenderer));
        let res = server.router().oneshot(request("GET", "/", Body::empty())).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(res).await, "failed to render page");
    }

    #[test]
    fn access_log_metrics_stay_bounded_for_invented_methods() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let app = router();
                for i in 0..100 {
                    let res = app
                        .clone()
                        .oneshot(request(&format!("RND{i}"), "/", Body::empty()))
                        .await
                        .unwrap();
                    assert_eq!(res.status(), StatusCode::OK);
                }
            })
        });

        let rendered = handle.render();
        let series: Vec<_> = rendered
            .lines()
            .filter(|line| line.starts_with("reflector_requests_total{"))
            .collect();
        assert_eq!(series.len(), 1);
        assert!(series[0].contains("method=\"OTHER\""));
        assert!(series[0].ends_with(" 100"));
    }
}
