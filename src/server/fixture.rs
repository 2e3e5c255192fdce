// ────────────────────────────────
// src/server/fixture.rs
// Background-thread lifecycle for the fixture: bind, start, shutdown.
// ────────────────────────────────
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener};
use std::sync::mpsc;
use std::thread::JoinHandle;

use tokio::runtime;
use tokio::sync::watch;
use tracing::{error, info};

use super::{bind_tcp, register, RequestHandler, ServerBuilder};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build server runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to register listener on {addr}: {source}")]
    Register {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server on {0} is already started")]
    AlreadyStarted(SocketAddr),

    #[error("failed to spawn server thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("server thread panicked")]
    ThreadPanicked,
}

/// HTTP fixture running on its own thread.
///
/// The socket is bound on construction; [`start`](Self::start) spawns the
/// serve loop and [`shutdown`](Self::shutdown) stops it and releases the
/// port. Dropping a started server shuts it down as well. None of these
/// need, or mind, an ambient Tokio runtime: the serve loop gets its own on
/// the server thread.
pub struct FixtureServer {
    addr: SocketAddr,
    idle: Option<StdTcpListener>,
    shutdown_tx: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl FixtureServer {
    /// Bind `0.0.0.0:<port>`. Port `0` asks the OS for a free one.
    pub fn bind(port: u16) -> Result<Self, ServerError> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    pub fn bind_addr(addr: SocketAddr) -> Result<Self, ServerError> {
        let listener = bind_tcp(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let (shutdown_tx, _) = watch::channel(false);
        info!("fixture bound on {}", addr);

        Ok(Self {
            addr,
            idle: Some(listener),
            shutdown_tx,
            thread: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL for requests from the local machine.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port())
    }

    /// Spawn the serve loop. Returns once the loop's runtime is up and the
    /// listener is registered with it.
    pub fn start(&mut self) -> Result<(), ServerError> {
        let listener = self
            .idle
            .take()
            .ok_or(ServerError::AlreadyStarted(self.addr))?;

        let shutdown_rx = self.shutdown_tx.subscribe();
        let addr = self.addr;
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name(format!("fixture-server-{}", addr.port()))
            .spawn(move || serve_on_thread(addr, listener, shutdown_rx, ready_tx))
            .map_err(ServerError::Spawn)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            // Sender dropped without reporting: the thread died early.
            Err(_) => {
                let _ = thread.join();
                return Err(ServerError::ThreadPanicked);
            }
        }

        self.thread = Some(thread);
        info!("fixture serving on {}", self.addr);
        Ok(())
    }

    /// Stop the serve loop and close the socket.
    ///
    /// Blocks until the response in flight (if any) has been sent, including
    /// the full delay of a `/wait/` page.
    pub fn shutdown(mut self) -> Result<(), ServerError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), ServerError> {
        // Never started: dropping the listener closes the socket.
        self.idle = None;

        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        let _ = self.shutdown_tx.send(true);
        let joined = thread.join().map_err(|_| ServerError::ThreadPanicked);
        info!("fixture on {} shut down", self.addr);
        joined
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("fixture on {} failed to shut down: {}", self.addr, e);
        }
    }
}

/// Body of the server thread. The runtime is created, used and dropped here.
fn serve_on_thread(
    addr: SocketAddr,
    listener: StdTcpListener,
    shutdown_rx: watch::Receiver<bool>,
    ready: mpsc::Sender<Result<(), ServerError>>,
) {
    let runtime = match runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = ready.send(Err(ServerError::Runtime(e)));
            return;
        }
    };

    let listener = {
        let _guard = runtime.enter();
        match register(listener) {
            Ok(listener) => listener,
            Err(source) => {
                let _ = ready.send(Err(ServerError::Register { addr, source }));
                return;
            }
        }
    };
    let _ = ready.send(Ok(()));

    let server = ServerBuilder::new(RequestHandler::new(addr.port()));
    runtime.block_on(server.serve(listener, shutdown_rx));
}
