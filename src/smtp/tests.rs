use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::*;
use crate::config::SmtpConfig;

/// How the scripted server answers.
#[derive(Clone, Copy)]
enum Script {
    /// Full dialogue, RCPT TO answered with this code.
    Rcpt(u16),
    /// Same, but every reply waits before being written.
    SlowRcpt(u16, Duration),
    /// Accepts the connection and never writes.
    Silent,
    /// Rejects the greeting.
    Banner(u16),
    /// Slow full dialogue that never answers QUIT.
    MuteQuit(u16, Duration),
}

struct MockServer {
    addr: SocketAddr,
    /// Commands received, sent once the client closes the socket.
    closed: oneshot::Receiver<Vec<String>>,
}

async fn spawn_mock_server(script: Script) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);
        let mut received = Vec::new();

        match script {
            Script::Silent => {
                let mut sink = Vec::new();
                let _ = reader.read_to_end(&mut sink).await;
                let _ = tx.send(received);
                return;
            }
            Script::Banner(code) => {
                let _ = write
                    .write_all(format!("{code} go away\r\n").as_bytes())
                    .await;
            }
            Script::Rcpt(_) | Script::SlowRcpt(..) | Script::MuteQuit(..) => {
                let _ = write.write_all(b"220 mock.test ESMTP\r\n").await;
            }
        }

        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let command = line.trim_end().to_string();
            received.push(command.clone());
            let upper = command.to_ascii_uppercase();
            let reply = if upper.starts_with("EHLO") {
                "250-mock.test\r\n250 PIPELINING\r\n".to_string()
            } else if upper.starts_with("MAIL FROM") {
                "250 2.1.0 OK\r\n".to_string()
            } else if upper.starts_with("RCPT TO") {
                match script {
                    Script::Rcpt(code) | Script::SlowRcpt(code, _) | Script::MuteQuit(code, _) => {
                        format!("{code} scripted answer\r\n")
                    }
                    _ => "503 bad sequence\r\n".to_string(),
                }
            } else if upper.starts_with("QUIT") {
                if let Script::MuteQuit(..) = script {
                    continue;
                }
                "221 bye\r\n".to_string()
            } else {
                "502 unknown\r\n".to_string()
            };
            if let Script::SlowRcpt(_, delay) | Script::MuteQuit(_, delay) = script {
                tokio::time::sleep(delay).await;
            }
            if write.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = tx.send(received);
    });
    MockServer { addr, closed: rx }
}

fn prober(addr: SocketAddr, deadline: Duration) -> SmtpProber {
    SmtpProber::new(SmtpConfig {
        port: addr.port(),
        helo_domain: "probe.test".to_string(),
        mail_from: "verify@probe.test".to_string(),
        connect_timeout: Duration::from_secs(1),
        probe_deadline: deadline,
        ..SmtpConfig::default()
    })
}

fn loopback_mx() -> MxRecord {
    MxRecord::new(10, "127.0.0.1")
}

#[tokio::test]
async fn accepting_any_recipient_is_catch_all_high() {
    let server = spawn_mock_server(Script::Rcpt(250)).await;
    let result = prober(server.addr, Duration::from_secs(5))
        .probe("example.com", &loopback_mx())
        .await;

    assert!(result.is_catch_all);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.smtp_response.as_deref(), Some("250 scripted answer"));
    assert!(result.test_email.ends_with("@example.com"));
    assert!(!result.is_failure());

    let received = server.closed.await.unwrap();
    assert_eq!(received[0], "EHLO probe.test");
    assert_eq!(received[1], "MAIL FROM:<verify@probe.test>");
    assert_eq!(received[2], format!("RCPT TO:<{}>", result.test_email));
    assert_eq!(received.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn rejecting_the_random_recipient_is_not_catch_all_high() {
    let server = spawn_mock_server(Script::Rcpt(550)).await;
    let result = prober(server.addr, Duration::from_secs(5))
        .probe("example.com", &loopback_mx())
        .await;

    assert!(!result.is_catch_all);
    assert_eq!(result.confidence, Confidence::High);
    assert!(server.closed.await.is_ok());
}

#[tokio::test]
async fn policy_rejections_are_low_confidence() {
    for code in [552, 554] {
        let server = spawn_mock_server(Script::Rcpt(code)).await;
        let result = prober(server.addr, Duration::from_secs(5))
            .probe("example.com", &loopback_mx())
            .await;
        assert!(!result.is_catch_all);
        assert_eq!(result.confidence, Confidence::Low, "code {code}");
        assert!(result.is_inconclusive());
    }
}

#[tokio::test]
async fn silent_server_times_out_and_socket_is_released() {
    let server = spawn_mock_server(Script::Silent).await;
    let started = Instant::now();
    let result = prober(server.addr, Duration::from_millis(300))
        .probe("example.com", &loopback_mx())
        .await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!result.is_catch_all);
    assert_eq!(result.confidence, Confidence::Low);
    assert_eq!(result.failure, Some(ProbeFailure::Timeout));
    assert!(result.smtp_response.as_deref().unwrap_or("").contains("timeout"));

    // The server only reports once it has seen EOF from our side.
    let received = tokio::time::timeout(Duration::from_secs(2), server.closed)
        .await
        .expect("socket left open")
        .unwrap();
    assert!(received.is_empty());
}

#[tokio::test]
async fn slow_but_compliant_server_is_classified_correctly() {
    let server = spawn_mock_server(Script::SlowRcpt(250, Duration::from_millis(80))).await;
    let result = prober(server.addr, Duration::from_secs(5))
        .probe("example.com", &loopback_mx())
        .await;
    assert!(result.is_catch_all);
    assert_eq!(result.confidence, Confidence::High);
}

#[tokio::test]
async fn quit_never_outlives_the_deadline() {
    let server = spawn_mock_server(Script::MuteQuit(250, Duration::from_millis(60))).await;
    let deadline = Duration::from_millis(400);
    let started = Instant::now();
    let result = prober(server.addr, deadline)
        .probe("example.com", &loopback_mx())
        .await;

    assert!(result.is_catch_all);
    assert!(
        started.elapsed() < deadline + Duration::from_millis(150),
        "took {:?}",
        started.elapsed()
    );
    let received = server.closed.await.unwrap();
    assert_eq!(received.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn rejected_greeting_is_refused_low() {
    let server = spawn_mock_server(Script::Banner(554)).await;
    let result = prober(server.addr, Duration::from_secs(5))
        .probe("example.com", &loopback_mx())
        .await;
    assert_eq!(result.failure, Some(ProbeFailure::Refused));
    assert_eq!(result.confidence, Confidence::Low);
    assert!(!result.transcript.is_empty());
}

#[tokio::test]
async fn connection_refused_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = prober(addr, Duration::from_secs(2))
        .probe("example.com", &loopback_mx())
        .await;
    assert_eq!(result.failure, Some(ProbeFailure::Unreachable));
    assert!(!result.is_catch_all);
    assert!(result.smtp_response.is_some());
}

#[tokio::test]
async fn unresolvable_mx_host_is_unreachable() {
    let result = prober("127.0.0.1:25".parse().unwrap(), Duration::from_secs(2))
        .probe("example.com", &MxRecord::new(5, "mx.nonexistent-domain-xyz123.invalid"))
        .await;
    // Unreachable when resolution fails fast, Timeout when the host resolver hangs.
    assert!(result.is_failure());
    assert!(!result.is_catch_all);
    assert_eq!(result.confidence, Confidence::Low);
}

#[tokio::test]
async fn probe_domain_picks_lowest_priority_and_skips_empty() {
    let prober = SmtpProber::new(SmtpConfig::default());
    assert!(prober.probe_domain("example.com", &[]).await.is_none());

    let server = spawn_mock_server(Script::Rcpt(550)).await;
    let records = [
        MxRecord::new(50, "mx.nonexistent-domain-xyz123.invalid"),
        MxRecord::new(5, "127.0.0.1"),
    ];
    let result = prober_for(server.addr)
        .probe_domain("example.com", &records)
        .await
        .unwrap();
    assert_eq!(result.mx_host.as_deref(), Some("127.0.0.1"));
    assert_eq!(result.confidence, Confidence::High);
}

fn prober_for(addr: SocketAddr) -> SmtpProber {
    prober(addr, Duration::from_secs(5))
}
