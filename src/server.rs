use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

use crate::config::{DecoderConfig, ServerConfig};
use crate::http::{decode_with_config, Request, ResponseWriter, StatusCode};

/// Error a handler returns instead of a body; written as the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub trait Handler: Send + Sync + 'static {
    /// Writes the response body for `request` into `body`.
    fn handle(&self, request: &Request, body: &mut Vec<u8>) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Vec<u8>) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, body: &mut Vec<u8>) -> Result<(), HandlerError> {
        self(request, body)
    }
}

#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    accept_loop: JoinHandle<()>,
}

impl Server {
    /// Binds the configured port and accepts connections in the background.
    pub async fn serve<H: Handler>(config: ServerConfig, handler: H) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
            .await
            .with_context(|| format!("bind port {}", config.port))?;
        let local_addr = listener.local_addr().context("listener local addr")?;
        log::info!("listening on {local_addr}");

        let shutdown = Arc::new(Notify::new());
        let accept_loop = tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            config,
            shutdown.clone(),
        ));
        Ok(Self {
            local_addr,
            shutdown,
            accept_loop,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections. Connections already accepted run to completion.
    pub async fn close(self) -> anyhow::Result<()> {
        self.shutdown.notify_one();
        self.accept_loop.await.context("join accept loop")?;
        log::info!("server on {} closed", self.local_addr);
        Ok(())
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    config: ServerConfig,
    shutdown: Arc<Notify>,
) {
    let permits = Arc::new(Semaphore::new(config.max_connections));
    loop {
        let permit = tokio::select! {
            _ = shutdown.notified() => break,
            permit = permits.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        let (stream, peer) = tokio::select! {
            _ = shutdown.notified() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("accept failed: {e}");
                    continue;
                }
            },
        };

        log::debug!("accepted connection from {peer}");
        let handler = handler.clone();
        let decoder = config.decoder;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, handler.as_ref(), &decoder).await {
                log::warn!("connection from {peer}: {e:#}");
            }
            log::debug!("connection to {peer} closed");
            drop(permit);
        });
    }
}

async fn handle_connection<H: Handler>(
    mut stream: TcpStream,
    handler: &H,
    decoder: &DecoderConfig,
) -> anyhow::Result<()> {
    let request = match decode_with_config(&mut stream, decoder).await {
        Ok(request) => request,
        Err(e) => {
            log::warn!("rejecting request: {e}");
            if let Some(status) = e.status_code() {
                let message = format!("{e}\n");
                ResponseWriter::new(&mut stream)
                    .respond(status, message.as_bytes())
                    .await?;
            }
            return stream.shutdown().await.context("shutdown connection");
        }
    };

    let mut body = Vec::new();
    let (status, body) = match handler.handle(&request, &mut body) {
        Ok(()) => (StatusCode::Ok, body),
        Err(e) => (e.status, e.message.into_bytes()),
    };
    if status.is_success() {
        log::debug!(
            "{} {} -> {}",
            request.request_line().method(),
            request.request_line().target(),
            status.code()
        );
    } else {
        log::info!(
            "{} {} -> {} {}",
            request.request_line().method(),
            request.request_line().target(),
            status.code(),
            status.reason_phrase()
        );
    }
    ResponseWriter::new(&mut stream)
        .respond(status, &body)
        .await?;
    stream.shutdown().await.context("shutdown connection")
}
