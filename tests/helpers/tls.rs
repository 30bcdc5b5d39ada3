// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// Self-signed certificate with its PKCS#8 key
pub struct TestCert {
    pub pem: String,
    pub der: Vec<u8>,
    key_der: Vec<u8>,
}

/// Generate a self-signed certificate for the given subject alt names.
pub fn generate_cert(names: &[&str]) -> TestCert {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let cert = rcgen::generate_simple_self_signed(names).expect("Failed to generate cert");
    TestCert {
        pem: cert.cert.pem(),
        der: cert.cert.der().to_vec(),
        key_der: cert.signing_key.serialize_der(),
    }
}

/// Certificate valid for 127.0.0.1 and localhost
pub fn localhost_cert() -> TestCert {
    generate_cert(&["127.0.0.1", "localhost"])
}

fn server_config(cert: &TestCert) -> rustls::ServerConfig {
    let mut config =
        rustls::ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .expect("Failed to select protocol versions")
            .with_no_client_auth()
            .with_single_cert(
                vec![CertificateDer::from(cert.der.clone())],
                PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(cert.key_der.clone())),
            )
            .expect("Failed to build server config");
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    config
}

/// HTTPS server answering every request with one canned HTTP/1.1 response
pub struct TlsServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TlsServer {
    pub async fn start(cert: &TestCert, response: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let acceptor = TlsAcceptor::from(Arc::new(server_config(cert)));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let response = response.to_string();

        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let acceptor = acceptor.clone();
                let response = response.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    // Handshake failures are expected when the client rejects us.
                    let Ok(mut tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    let request = read_request_head(&mut tls).await;
                    seen.lock().push(request);
                    let _ = tls.write_all(response.as_bytes()).await;
                    let _ = tls.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("https://127.0.0.1:{}{}", self.addr.port(), path)
    }

    /// Request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

async fn read_request_head<S: tokio::io::AsyncRead + Unpin>(stream: &mut S) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Build a raw HTTP/1.1 response that closes the connection
pub fn http_response(status_line: &str, extra_headers: &[&str], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {}\r\n", status_line);
    for header in extra_headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    response
}

/// Plain TCP server that accepts connections and never answers
pub async fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}

/// Plain TCP server that answers every connection with `raw` bytes
pub async fn raw_server(raw: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request_head(&mut stream).await;
                let _ = stream.write_all(raw).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    addr
}
