use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// One bounded reachability check: `true` iff a TCP handshake to
/// `host:port` completes within `timeout`. Refused, timed out,
/// unresolvable and unreachable all collapse to `false`; the caller only
/// sees reachable or not. The connection, if established, is closed as
/// soon as the check returns. No retries here.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    let addr = format!("{}:{}", host, port);
    match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(_stream)) => {
            debug!("{} answered", addr);
            true
        }
        Ok(Err(e)) => {
            debug!("{} unreachable: {}", addr, e);
            false
        }
        Err(_) => {
            debug!("{} timed out after {:?}", addr, timeout);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(probe("127.0.0.1", port, Duration::from_secs(3)).await);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!probe("127.0.0.1", port, Duration::from_secs(3)).await);
    }

    #[tokio::test]
    async fn unresolvable_host_is_unreachable() {
        assert!(!probe("host.invalid", 80, Duration::from_secs(3)).await);
    }

    #[tokio::test]
    async fn probe_stays_within_the_timeout_bound() {
        // 192.0.2.0/24 (TEST-NET-1) either refuses fast or blackholes.
        let started = Instant::now();
        let reachable = probe("192.0.2.1", 80, Duration::from_millis(300)).await;

        assert!(!reachable);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
