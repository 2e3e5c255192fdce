// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures::{Stream, StreamExt};
use hyper::{server::conn::Http, Body, Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tower::Service;

/// Pause after an accept error that is not tied to a single connection
/// (e.g. out of file descriptors), so the loop does not spin on it.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Serve loop, one connection at a time.
pub struct ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    handler: H,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Accept from `listener` until shutdown is signalled.
    pub async fn serve(self, listener: TcpListener, shutdown: watch::Receiver<bool>) {
        let incoming = futures::stream::unfold(listener, |listener| async move {
            let accepted = listener.accept().await;
            Some((accepted, listener))
        });
        self.serve_incoming::<_, TcpStream>(incoming, shutdown).await
    }

    /// Answer connections from `incoming` until `shutdown` flips to `true`,
    /// its sender goes away, or the stream ends. The signal is only looked at
    /// between connections, so an in-flight response always completes first.
    /// Accept errors are logged and skipped.
    pub async fn serve_incoming<I, C>(self, incoming: I, mut shutdown: watch::Receiver<bool>)
    where
        I: Stream<Item = io::Result<(C, SocketAddr)>>,
        C: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let mut http = Http::new();
        http.http1_only(true).http1_keep_alive(false);
        futures::pin_mut!(incoming);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let accepted = tokio::select! {
                next = incoming.next() => match next {
                    Some(accepted) => accepted,
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::warn!(%err, "accept error");
                    if !is_connection_error(&err) {
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                    continue;
                }
            };

            tracing::trace!(%peer, "accepted connection");
            if let Err(err) = http.serve_connection(stream, self.handler.clone()).await {
                tracing::warn!(%peer, %err, "connection error");
            }
        }

        tracing::info!("serve loop stopped");
    }
}

/// Errors that only concern the connection being accepted.
fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::RequestHandler;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
    use tokio::time::timeout;

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    #[tokio::test]
    async fn accept_errors_do_not_stop_the_loop() {
        let (mut client, server_side) = tokio::io::duplex(4096);
        let incoming = futures::stream::iter(vec![
            Err(io::Error::from(io::ErrorKind::ConnectionAborted)),
            Err(io::Error::new(io::ErrorKind::Other, "too many open files")),
            Ok((server_side, peer())),
        ])
        .chain(futures::stream::pending::<io::Result<(DuplexStream, SocketAddr)>>());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let serving = tokio::spawn(
            ServerBuilder::new(RequestHandler::new(8000)).serve_incoming(incoming, shutdown_rx),
        );

        client
            .write_all(b"GET /loremipsum HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        timeout(Duration::from_secs(5), client.read_to_end(&mut response))
            .await
            .unwrap()
            .unwrap();
        let response = String::from_utf8_lossy(&response);
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Lorem ipsum dolor sit amet."));

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(5), serving).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn loop_ends_when_shutdown_sender_is_dropped() {
        let incoming = futures::stream::pending::<io::Result<(DuplexStream, SocketAddr)>>();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let serving = tokio::spawn(
            ServerBuilder::new(RequestHandler::new(8000)).serve_incoming(incoming, shutdown_rx),
        );

        drop(shutdown_tx);
        timeout(Duration::from_secs(5), serving).await.unwrap().unwrap();
    }

    #[test]
    fn per_connection_errors_skip_backoff() {
        assert!(is_connection_error(&io::ErrorKind::ConnectionAborted.into()));
        assert!(!is_connection_error(&io::Error::new(
            io::ErrorKind::Other,
            "too many open files"
        )));
    }
}
