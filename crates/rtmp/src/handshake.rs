//! RTMP-3 simple handshake driver: C0/C1/C2 sent, S0/S1/S2 received. S2 is
//! never validated against the C1 this client sent — a publishing client
//! is talking to a server that controls the connection either way, so a
//! mismatched echo isn't actionable.

use std::time::{Duration, Instant};

use rand::RngCore;
use rtmp_future_ext::FutureExt;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const RTMP_VERSION: u8 = 0x03;
const HANDSHAKE_BODY_LEN: usize = 1536;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("server replied with unsupported RTMP version {0}, expected 3")]
    UnsupportedVersion(u8),
    #[error("handshake timed out")]
    Timeout,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<tokio::time::error::Elapsed> for HandshakeError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        HandshakeError::Timeout
    }
}

/// Drives the RTMP-3 simple handshake over `stream`. `handshake_timeout`
/// bounds each individual read (a `Duration::ZERO` disables the deadline).
pub async fn perform_handshake<S>(stream: &mut S, handshake_timeout: Duration) -> Result<(), HandshakeError>
where
    S: AsyncReadExt + AsyncWriteExt + Unpin,
{
    let send_start = Instant::now();

    let mut c0c1 = Vec::with_capacity(1 + HANDSHAKE_BODY_LEN);
    c0c1.push(RTMP_VERSION);
    // time (ms since an arbitrary epoch, truncated to 32 bits), packed as a
    // proper big-endian u32.
    c0c1.extend_from_slice(&0u32.to_be_bytes());
    c0c1.extend_from_slice(&[0, 0, 0, 0]);
    let mut random_bytes = vec![0u8; HANDSHAKE_BODY_LEN - 8];
    rand::rng().fill_bytes(&mut random_bytes);
    c0c1.extend_from_slice(&random_bytes);

    stream.write_all(&c0c1).with_timeout(handshake_timeout).await??;

    let mut s0 = [0u8; 1];
    stream.read_exact(&mut s0).with_timeout(handshake_timeout).await??;
    if s0[0] != RTMP_VERSION {
        return Err(HandshakeError::UnsupportedVersion(s0[0]));
    }

    let mut s1 = [0u8; HANDSHAKE_BODY_LEN];
    stream.read_exact(&mut s1).with_timeout(handshake_timeout).await??;

    let mut c2 = Vec::with_capacity(HANDSHAKE_BODY_LEN);
    let elapsed_ms = send_start.elapsed().as_millis() as u32;
    c2.extend_from_slice(&elapsed_ms.to_be_bytes());
    c2.extend_from_slice(&s1[4..]);

    stream.write_all(&c2).with_timeout(handshake_timeout).await??;

    let mut s2 = [0u8; HANDSHAKE_BODY_LEN];
    stream.read_exact(&mut s2).with_timeout(handshake_timeout).await??;
    // s2 is discarded unread past this point: its echo of c1 is not validated.

    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::duplex;

    use super::*;

    #[tokio::test]
    async fn handshake_succeeds_against_a_well_behaved_peer() {
        let (mut client, mut server) = duplex(4096);

        let server_task = tokio::spawn(async move {
            let mut c0 = [0u8; 1];
            server.read_exact(&mut c0).await.unwrap();
            assert_eq!(c0[0], RTMP_VERSION);
            let mut c1 = [0u8; HANDSHAKE_BODY_LEN];
            server.read_exact(&mut c1).await.unwrap();

            server.write_all(&[RTMP_VERSION]).await.unwrap();
            let mut s1 = vec![0u8; HANDSHAKE_BODY_LEN];
            rand::rng().fill_bytes(&mut s1);
            server.write_all(&s1).await.unwrap();

            let mut c2 = [0u8; HANDSHAKE_BODY_LEN];
            server.read_exact(&mut c2).await.unwrap();
            assert_eq!(&c2[4..], &s1[4..]);

            let mut s2 = vec![0u8; HANDSHAKE_BODY_LEN];
            rand::rng().fill_bytes(&mut s2);
            server.write_all(&s2).await.unwrap();
        });

        perform_handshake(&mut client, Duration::from_secs(1)).await.unwrap();
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn rejects_unsupported_server_version() {
        let (mut client, mut server) = duplex(4096);

        tokio::spawn(async move {
            let mut buf = [0u8; 1 + HANDSHAKE_BODY_LEN];
            server.read_exact(&mut buf).await.unwrap();
            server.write_all(&[0x06]).await.unwrap();
        });

        let err = perform_handshake(&mut client, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, HandshakeError::UnsupportedVersion(0x06)));
    }
}
