use std::time::Duration;
use sumi_scan::config::{Config, ProbeConfig, ScannerConfig};
use tokio::net::TcpListener;

/// Config with short timeouts so timeout paths finish quickly
pub fn fast_config() -> Config {
    Config {
        scanner: ScannerConfig {
            timeout_secs: 1,
            ..ScannerConfig::default()
        },
        probe: ProbeConfig { timeout_secs: 1 },
        ..Config::default()
    }
}

/// Starts a TCP server that accepts connections and never answers
///
/// Returns the bound port. Both TLS handshakes and plain HTTP requests against
/// it hang until the client gives up.
pub async fn start_black_hole() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind black hole listener");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(10)).await;
    port
}

/// Page that trips most rules: no alt on 7 images, no h1, nothing legal
pub fn poor_page() -> String {
    format!(
        r#"<html>
<head><title>Old Site</title></head>
<body>
  <h2>Latest news</h2>
  {}
  <a href="/news">News</a>
</body>
</html>"#,
        r#"<img src="photo.jpg">"#.repeat(7)
    )
}

/// Page that passes every markup rule
pub fn good_page() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head><title>Acme</title></head>
<body>
  <div id="banner">This site uses cookies. <button>I agree</button></div>
  <h1>Acme</h1>
  <img src="logo.png" alt="Acme logo">
  <form><label for="email">Email</label><input id="email" type="email"></form>
  <a href="/privacy">Privacy</a>
  <a href="/contact">Contact</a>
</body>
</html>"#
}
