//! Test game client.
//!
//! Speaks the raw NUL-framed stream so tests see exactly what the server
//! writes, byte for byte.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send one message, appending the NUL terminator.
    pub async fn send_raw(&mut self, message: &str) -> anyhow::Result<()> {
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(&[0]).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single message from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a message with a timeout. Fails on EOF.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        let n = timeout(dur, self.reader.read_until(0, &mut buf)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        if buf.last() == Some(&0) {
            buf.pop();
        }
        Ok(String::from_utf8(buf)?)
    }

    /// True if nothing arrives within `dur` and the socket stays open.
    pub async fn is_silent_for(&mut self, dur: Duration) -> bool {
        let mut buf = Vec::new();
        timeout(dur, self.reader.read_until(0, &mut buf))
            .await
            .is_err()
    }

    /// True once the server has closed the socket.
    #[allow(dead_code)]
    pub async fn is_closed(&mut self) -> bool {
        let mut buf = Vec::new();
        matches!(
            timeout(Duration::from_secs(5), self.reader.read_until(0, &mut buf)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }

    /// Version check and random key exchange. Returns the random key.
    pub async fn bootstrap(&mut self) -> anyhow::Result<String> {
        self.send_raw("<msg t='sys'><body action='verChk' r='0'><ver v='153' /></body></msg>")
            .await?;
        let api = self.recv().await?;
        anyhow::ensure!(api.contains("apiOK"), "unexpected version reply: {api}");

        self.send_raw("<msg t='sys'><body action='rndK' r='-1'></body></msg>")
            .await?;
        let reply = self.recv().await?;
        let key = reply
            .split_once("<k>")
            .and_then(|(_, rest)| rest.split_once("</k>"))
            .map(|(key, _)| key.to_string())
            .ok_or_else(|| anyhow::anyhow!("no key in reply: {reply}"))?;
        Ok(key)
    }
}
