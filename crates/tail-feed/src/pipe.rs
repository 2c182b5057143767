//! Message pipe to the positioning server.
//!
//! Messages are UTF-8 JSON documents separated by a single 0x1F
//! (unit separator) byte. Empty segments between separators are skipped.

use tail_common::{Result, TailError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

pub const MESSAGE_SEPARATOR: u8 = 0x1f;

/// Largest accepted message, separator excluded.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024;

pub struct MessagePipe<S> {
    stream: BufReader<S>,
    buf: Vec<u8>,
    max_len: usize,
}

impl MessagePipe<TcpStream> {
    /// Open a TCP pipe with Nagle disabled.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl<S> MessagePipe<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream: BufReader::new(stream), buf: Vec::with_capacity(4096), max_len: MAX_MESSAGE_LEN }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Next complete message, or `None` once the peer has closed cleanly.
    ///
    /// A message that is not UTF-8 yields [`TailError::Malformed`]; the pipe
    /// stays usable and the next call returns the following message. Any
    /// other error leaves the stream out of sync.
    pub async fn recv_msg(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            let limit = self.max_len as u64 + 1;
            let n = (&mut self.stream)
                .take(limit)
                .read_until(MESSAGE_SEPARATOR, &mut self.buf)
                .await?;
            if n == 0 {
                return Ok(None);
            }
            if self.buf.last() != Some(&MESSAGE_SEPARATOR) {
                if n as u64 == limit {
                    return Err(TailError::Protocol(format!(
                        "message exceeds {} bytes",
                        self.max_len
                    )));
                }
                return Err(TailError::Protocol(format!(
                    "connection closed inside a message ({} bytes pending)",
                    self.buf.len()
                )));
            }
            self.buf.pop();
            if self.buf.is_empty() {
                continue;
            }
            let msg = String::from_utf8(std::mem::take(&mut self.buf))
                .map_err(|e| TailError::Malformed(format!("message is not UTF-8: {}", e)))?;
            return Ok(Some(msg));
        }
    }

    pub async fn send_msg(&mut self, msg: &str) -> Result<()> {
        let stream = self.stream.get_mut();
        stream.write_all(msg.as_bytes()).await?;
        stream.write_all(&[MESSAGE_SEPARATOR]).await?;
        stream.flush().await?;
        Ok(())
    }
}
