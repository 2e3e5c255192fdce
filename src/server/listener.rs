// ────────────────────────────────
// src/server/listener.rs
// Low-level TCP bind, kept apart from the runtime that later serves it.
// ────────────────────────────────
use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use tokio::net::TcpListener;

/// Bind a listening socket without touching any Tokio runtime, so it can be
/// done from sync or async code alike.
///
/// On Unix the standard library sets `SO_REUSEADDR` before binding, which
/// lets a fixture restarted on the same port reuse it while old connections
/// sit in TIME_WAIT.
pub fn bind_tcp(addr: SocketAddr) -> io::Result<StdTcpListener> {
    let listener = StdTcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Hand a bound socket to the runtime that is current on this thread.
pub fn register(listener: StdTcpListener) -> io::Result<TcpListener> {
    TcpListener::from_std(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpStream};

    #[test]
    fn bound_socket_is_nonblocking() {
        let listener = bind_tcp(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let err = listener.accept().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[tokio::test]
    async fn registered_listener_accepts() {
        let std_listener = bind_tcp(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let addr = std_listener.local_addr().unwrap();
        let listener = register(std_listener).unwrap();

        let connect = tokio::task::spawn_blocking(move || TcpStream::connect(addr));
        let (_, peer) = listener.accept().await.unwrap();
        let client = connect.await.unwrap().unwrap();
        assert_eq!(client.local_addr().unwrap(), peer);
    }
}
