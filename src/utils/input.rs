//! Payload input loading — file path, stdin (`-`), or an `http(s)://` URL
//! fetched with the synchronous `ureq` client.

use std::fs;
use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};

/// Load a raw payload from `input`.
///
/// `-` reads stdin to EOF; `http://` / `https://` inputs are fetched with a
/// GET request and the given timeout; anything else is a file path.
pub fn load_payload(input: &str, fetch_timeout_secs: u64) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed reading payload from stdin")?;
        return Ok(buf);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        return fetch_payload(input, fetch_timeout_secs);
    }

    fs::read_to_string(input).with_context(|| format!("failed reading payload file: {input}"))
}

/// Fetch a payload over HTTP. Used to pull captured bodies straight from a
/// proxy's log endpoint without saving them to disk first.
fn fetch_payload(url: &str, timeout_secs: u64) -> Result<String> {
    let response = ureq::get(url)
        .timeout(Duration::from_secs(timeout_secs))
        .call()
        .with_context(|| format!("failed fetching payload from {url}"))?;

    response
        .into_string()
        .with_context(|| format!("failed reading response body from {url}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_payload_from_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("prism-input-test.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "{{\"model\": \"claude\"}}").unwrap();

        let payload = load_payload(path.to_str().unwrap(), 5).unwrap();
        assert!(payload.contains("claude"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_error_with_path_context() {
        let err = load_payload("/nonexistent/prism-payload.json", 5).unwrap_err();
        assert!(err.to_string().contains("prism-payload.json"));
    }
}
