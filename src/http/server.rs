//! HTTP server setup and forwarding.
//!
//! # Responsibilities
//! - Create the Axum Router with the forwarding handler
//! - Wire up the admission decorator chain (see crate::policy::pipeline)
//! - Wire up plumbing middleware (request ID, timeout, tracing)
//! - Forward admitted requests to the image-processing backend
//! - Serve with graceful shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        HeaderMap, HeaderValue, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, GatewayConfig, ValidationError};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::policy::{pipeline, TokenBucket};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Application state injected into the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub backend_scheme: Scheme,
    pub backend_authority: Authority,
}

/// HTTP server for the admission gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the configuration does not validate; in particular a
    /// malformed backend URL is fatal and the process must not start.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let backend: Uri = config.backend.url.parse().map_err(|error: InvalidUri| {
            ConfigError::Validation(vec![ValidationError::BackendUrl {
                url: config.backend.url.clone(),
                reason: error.to_string(),
            }])
        })?;
        let backend_authority = backend.authority().cloned().ok_or_else(|| {
            ConfigError::Validation(vec![ValidationError::BackendHost(
                config.backend.url.clone(),
            )])
        })?;
        let backend_scheme = backend.scheme().cloned().unwrap_or(Scheme::HTTP);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.upstream_idle_secs))
            .pool_max_idle_per_host(config.timeouts.upstream_max_idle_per_host)
            .build(HttpConnector::new());

        let state = AppState {
            client,
            backend_scheme,
            backend_authority,
        };

        // Owned here for the process lifetime, shared with every request task.
        let bucket = Arc::new(TokenBucket::new(
            config.rate_limit.fill_rate,
            config.rate_limit.burst_size,
        ));

        let router = Self::build_router(&config, state, bucket);
        Ok(Self { router, config })
    }

    /// Build the Axum router: forwarding handler innermost, then the policy
    /// chain, then plumbing middleware outermost.
    fn build_router(config: &GatewayConfig, state: AppState, bucket: Arc<TokenBucket>) -> Router {
        let router = Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state);

        let router = pipeline::install(router, config, bucket);

        router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` resolves or Ctrl+C arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Terminal handler: relay the admitted request to the backend.
async fn forward_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();

    // Point the URI at the backend, keeping path and query as the policy
    // chain left them.
    let mut parts = request.uri().clone().into_parts();
    parts.scheme = Some(state.backend_scheme.clone());
    parts.authority = Some(state.backend_authority.clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    match Uri::from_parts(parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "Failed to build upstream URI");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    }

    append_forwarded_for(request.headers_mut(), remote);

    match state.client.request(request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method, status.as_u16(), start);

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "Upstream request failed");
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), start);

            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Record the client address, appending to any list a trusted proxy in
/// front of us already started.
fn append_forwarded_for(headers: &mut HeaderMap, remote: SocketAddr) {
    let client_ip = remote.ip().to_string();
    let value = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{existing}, {client_ip}"),
        None => client_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_malformed_backend_url() {
        let mut config = GatewayConfig::default();
        config.backend.url = "::not-a-url::".to_string();
        assert!(HttpServer::new(config).is_err());
    }

    #[test]
    fn test_forwarded_for_appends() {
        let remote: SocketAddr = "10.0.0.9:4242".parse().unwrap();

        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, remote);
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.9");

        append_forwarded_for(&mut headers, remote);
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.9, 10.0.0.9");
    }
}
