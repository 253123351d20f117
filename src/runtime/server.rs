//! Custom handler HTTP server.

use crate::function::FunctionRegistry;
use crate::http::{HostRequest, HostResponse, Method, StatusCode};
use crate::runtime::HandlerConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Failure to start the server.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
enum RequestError {
    #[error("request body exceeds {0} bytes")]
    TooLarge(usize),
    #[error("failed to read request body: {0}")]
    Body(String),
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// The custom handler process.
///
/// The host sends every invocation as `POST /{function name}`; the first
/// path segment selects the registered function.
pub struct FunctionApp {
    config: HandlerConfig,
    registry: Arc<FunctionRegistry>,
}

impl FunctionApp {
    pub fn new(config: HandlerConfig, registry: FunctionRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), RuntimeError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| RuntimeError::Bind { addr, source })?;
        self.serve(listener, shutdown_signal()).await;
        Ok(())
    }

    /// Serve connections from `listener` until `shutdown` resolves, then
    /// wait up to the shutdown timeout for in-flight invocations.
    pub async fn serve(self, listener: TcpListener, shutdown: impl Future<Output = ()>) {
        if let Ok(addr) = listener.local_addr() {
            info!(
                "Custom handler listening on {} ({} functions)",
                addr,
                self.registry.len()
            );
        }

        let graceful = GracefulShutdown::new();
        let config = Arc::new(self.config);
        let registry = self.registry;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!("Failed to accept connection: {}", err);
                            continue;
                        }
                    };

                    let registry = registry.clone();
                    let config = config.clone();
                    let service = service_fn(move |req| {
                        let registry = registry.clone();
                        let config = config.clone();
                        async move {
                            Ok::<_, Infallible>(handle_request(req, registry, config, remote_addr).await)
                        }
                    });

                    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);
                    tokio::task::spawn(async move {
                        if let Err(err) = conn.await {
                            error!("Error serving connection: {:?}", err);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received, draining connections");
                    break;
                }
            }
        }

        drop(listener);
        tokio::select! {
            _ = graceful.shutdown() => info!("All connections closed"),
            _ = tokio::time::sleep(config.shutdown_timeout_duration()) => {
                warn!("Timed out waiting for connections to close");
            }
        }
    }
}

/// Resolves on Ctrl-C, or on SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn handle_request(
    req: Request<Incoming>,
    registry: Arc<FunctionRegistry>,
    config: Arc<HandlerConfig>,
    remote_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();
    debug!("Handling request: {} {} from {}", req.method(), path, remote_addr);

    let function_name = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string();
    if function_name.is_empty() {
        return build_response(HostResponse::error(
            StatusCode::NOT_FOUND,
            "no function specified",
        ));
    }

    let request = match convert_request(req, config.max_body_size).await {
        Ok(request) => request,
        Err(err) => {
            warn!("Rejected request for '{}': {}", function_name, err);
            return build_response(HostResponse::error(err.status(), err.to_string()));
        }
    };

    let execution = registry.execute(&function_name, request);
    match tokio::time::timeout(config.request_timeout_duration(), execution).await {
        Ok(response) => build_response(response),
        Err(_) => {
            error!(
                "Function '{}' timed out after {}s",
                function_name, config.request_timeout
            );
            build_response(HostResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("function '{}' timed out", function_name),
            ))
        }
    }
}

async fn convert_request(
    req: Request<Incoming>,
    max_body_size: usize,
) -> Result<HostRequest, RequestError> {
    let method = Method::from(req.method());
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    let body = Limited::new(req.into_body(), max_body_size)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                RequestError::TooLarge(max_body_size)
            } else {
                RequestError::Body(err.to_string())
            }
        })?
        .to_bytes();

    Ok(HostRequest {
        method,
        url,
        headers,
        body: (!body.is_empty()).then_some(body),
    })
}

fn build_response(response: HostResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Full::new(response.body)).unwrap_or_else(|err| {
        error!("Failed to build response: {}", err);
        let mut fallback = Response::new(Full::new(Bytes::from_static(b"internal server error")));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}
