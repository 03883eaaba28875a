use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::error::SmtpError;
use super::types::SmtpReply;

static REPLY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{3})(?:([ -])(.*))?$").expect("reply pattern is a valid regex")
});

/// Upper bound on buffered reply bytes before the server is declared broken.
const MAX_REPLY_BYTES: usize = 64 * 1024;

/// One SMTP connection plus the transcript of everything exchanged on it.
/// Dropping the session closes the socket.
pub struct SmtpSession {
    host: String,
    stream: TcpStream,
    buffer: Vec<u8>,
    transcript: Vec<String>,
}

impl SmtpSession {
    /// Tries each address in turn, each bounded by `connect_timeout`.
    pub async fn connect(
        host: &str,
        addresses: &[SocketAddr],
        connect_timeout: Duration,
    ) -> Result<Self, SmtpError> {
        let mut last_err = None;
        for addr in addresses {
            match tokio::time::timeout(connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    debug!(host, %addr, "smtp connected");
                    return Ok(Self {
                        host: host.to_string(),
                        stream,
                        buffer: Vec::new(),
                        transcript: Vec::new(),
                    });
                }
                Ok(Err(source)) => {
                    last_err = Some(SmtpError::Connect {
                        host: host.to_string(),
                        source,
                    })
                }
                Err(_) => {
                    last_err = Some(SmtpError::ConnectTimeout {
                        host: host.to_string(),
                    })
                }
            }
        }
        Err(last_err.unwrap_or_else(|| SmtpError::NoAddress {
            host: host.to_string(),
        }))
    }

    pub async fn send_command(&mut self, command: &str) -> Result<(), SmtpError> {
        self.record("C", command);
        let mut data = Vec::with_capacity(command.len() + 2);
        data.extend_from_slice(command.as_bytes());
        data.extend_from_slice(b"\r\n");
        self.stream.write_all(&data).await.map_err(SmtpError::io)?;
        self.stream.flush().await.map_err(SmtpError::io)
    }

    /// Reads one (possibly multi-line) reply. Lines that do not look like a
    /// reply are skipped. Cancel-safe: partial input stays buffered.
    pub async fn read_reply(&mut self) -> Result<SmtpReply, SmtpError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await?;
            let Some(caps) = REPLY_LINE.captures(&line) else {
                self.record("S?", &line);
                continue;
            };
            let code = caps[1]
                .parse::<u16>()
                .map_err(|_| SmtpError::Protocol(format!("invalid code in line: {line}")))?;
            let text = caps.get(3).map_or("", |m| m.as_str()).to_string();
            let continued = caps.get(2).is_some_and(|m| m.as_str() == "-");
            self.record("S", &line);
            lines.push(text);
            if !continued {
                return Ok(SmtpReply { code, lines });
            }
        }
    }

    /// Best-effort `QUIT`, bounded by `wait`. Errors are ignored.
    pub async fn quit(&mut self, wait: Duration) {
        let exchange = async {
            self.send_command("QUIT").await?;
            self.read_reply().await
        };
        let _ = tokio::time::timeout(wait, exchange).await;
        self.close().await;
    }

    pub async fn close(&mut self) {
        let _ = self.stream.shutdown().await;
    }

    pub fn into_transcript(self) -> Vec<String> {
        self.transcript
    }

    fn record(&mut self, direction: &str, message: &str) {
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.host));
    }

    async fn read_line(&mut self) -> Result<String, SmtpError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                while matches!(line.last(), Some(b'\n' | b'\r')) {
                    line.pop();
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            if self.buffer.len() > MAX_REPLY_BYTES {
                return Err(SmtpError::Protocol("reply line too long".to_string()));
            }

            let mut buf = [0u8; 1024];
            let read = self.stream.read(&mut buf).await.map_err(SmtpError::io)?;
            if read == 0 {
                return Err(SmtpError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn parses_multiline_reply_and_skips_noise() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"* noise\r\n250-mx.test hello\r\n250-SIZE 1000\r\n250 OK\r\n")
                .await
                .unwrap();
        });

        let mut session = SmtpSession::connect("mx.test", &[addr], Duration::from_secs(1))
            .await
            .unwrap();
        let reply = session.read_reply().await.unwrap();
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines, vec!["mx.test hello", "SIZE 1000", "OK"]);
        assert_eq!(reply.summary(), "250 OK");
        let transcript = session.into_transcript();
        assert_eq!(transcript.len(), 4);
        assert!(transcript[0].contains("S?"));
    }

    #[tokio::test]
    async fn code_must_be_exactly_three_digits() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"2500 not a reply\r\n250x\r\n220\r\n")
                .await
                .unwrap();
        });

        let mut session = SmtpSession::connect("mx.test", &[addr], Duration::from_secs(1))
            .await
            .unwrap();
        let reply = session.read_reply().await.unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.lines, vec![""]);
        let transcript = session.into_transcript();
        assert!(transcript[0].contains("S?"));
        assert!(transcript[1].contains("S?"));
    }

    #[tokio::test]
    async fn closed_connection_is_an_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });
        let mut session = SmtpSession::connect("mx.test", &[addr], Duration::from_secs(1))
            .await
            .unwrap();
        assert!(matches!(
            session.read_reply().await,
            Err(SmtpError::Io { .. })
        ));
    }
}
