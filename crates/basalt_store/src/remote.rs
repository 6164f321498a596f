//! Remote document store and asset source
//!
//! Speaks minimal HTTP/1.1 over a plain TCP stream instead of pulling in
//! a full client; the document server's API is small enough that request
//! framing fits in a handful of lines. Every request opens its own
//! connection and closes it.

use futures_util::future::BoxFuture;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;

use basalt_codec::{AssetError, AssetSource, Record};

use crate::{DocumentStore, DocumentSummary, StoreError, StoreResult};

/// Client for a basalt document server.
pub struct RemoteStore {
    base_url: String,
}

impl RemoteStore {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Deserialize)]
struct SaveResponse {
    id: String,
}

#[derive(Deserialize)]
struct LoadResponse {
    records: Vec<Record>,
}

impl DocumentStore for RemoteStore {
    fn save<'a>(
        &'a self,
        name: &'a str,
        records: &'a [Record],
    ) -> BoxFuture<'a, StoreResult<String>> {
        Box::pin(async move {
            let body = serde_json::to_vec(&serde_json::json!({
                "name": name,
                "records": records,
            }))
            .map_err(|e| StoreError::Format(e.to_string()))?;
            let response =
                http_request(&self.endpoint("/api/documents"), "POST", Some(&body)).await?;
            let parsed: SaveResponse = serde_json::from_slice(&response)
                .map_err(|e| StoreError::Format(e.to_string()))?;
            log::info!("saved document '{}' remotely as {}", name, parsed.id);
            Ok(parsed.id)
        })
    }

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Vec<Record>>> {
        Box::pin(async move {
            let response = http_request(
                &self.endpoint(&format!("/api/documents/{}", id)),
                "GET",
                None,
            )
            .await?;
            let parsed: LoadResponse = serde_json::from_slice(&response)
                .map_err(|e| StoreError::Format(e.to_string()))?;
            Ok(parsed.records)
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<DocumentSummary>>> {
        Box::pin(async move {
            let response = http_request(&self.endpoint("/api/documents"), "GET", None).await?;
            serde_json::from_slice(&response).map_err(|e| StoreError::Format(e.to_string()))
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            http_request(
                &self.endpoint(&format!("/api/documents/{}", id)),
                "DELETE",
                None,
            )
            .await?;
            Ok(())
        })
    }
}

/// Asset source resolving locators against a remote base URL. Relative
/// locators are joined onto the base; absolute ones pass through.
pub struct RemoteAssetSource {
    base_url: String,
}

impl RemoteAssetSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn absolute(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            locator.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                locator.trim_start_matches('/')
            )
        }
    }
}

impl AssetSource for RemoteAssetSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        Box::pin(async move {
            let url = self.absolute(locator);
            match http_request(&url, "GET", None).await {
                Ok(bytes) => Ok(bytes),
                Err(StoreError::NotFound(_)) => Err(AssetError::NotFound(locator.to_string())),
                Err(e) => Err(AssetError::Transport(locator.to_string(), e.to_string())),
            }
        })
    }
}

/// One-shot HTTP/1.1 request. Returns the response body of a 2xx reply.
async fn http_request(url: &str, method: &str, body: Option<&[u8]>) -> StoreResult<Vec<u8>> {
    let url = Url::parse(url).map_err(|e| StoreError::Transport(format!("invalid url: {}", e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| StoreError::Transport("url has no host".to_string()))?;
    let port = url.port().unwrap_or(80);
    let path = url.path();
    let query = url.query().map(|q| format!("?{}", q)).unwrap_or_default();

    let addr = format!("{}:{}", host, port);
    let mut stream = tokio::net::TcpStream::connect(&addr)
        .await
        .map_err(|e| StoreError::Transport(format!("connect to {} failed: {}", addr, e)))?;

    let mut request = format!(
        "{} {}{} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n",
        method, path, query, host
    );
    if let Some(body) = body {
        request.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n",
            body.len()
        ));
    }
    request.push_str("\r\n");

    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| StoreError::Transport(format!("write failed: {}", e)))?;
    if let Some(body) = body {
        stream
            .write_all(body)
            .await
            .map_err(|e| StoreError::Transport(format!("write failed: {}", e)))?;
    }

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .map_err(|e| StoreError::Transport(format!("read failed: {}", e)))?;

    split_response(&response)
}

/// Split a raw response into status and body; map non-2xx to errors.
fn split_response(response: &[u8]) -> StoreResult<Vec<u8>> {
    let header_end = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or_else(|| StoreError::Transport("malformed http response".to_string()))?;
    let head = String::from_utf8_lossy(&response[..header_end]);
    let status: u16 = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StoreError::Transport("malformed status line".to_string()))?;

    let body = response[header_end + 4..].to_vec();
    match status {
        200..=299 => Ok(body),
        404 => Err(StoreError::NotFound(String::from_utf8_lossy(&body).into_owned())),
        other => Err(StoreError::Transport(format!("http status {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_response_extracts_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
        assert_eq!(split_response(raw).unwrap(), b"ok".to_vec());
    }

    #[test]
    fn test_split_response_maps_status() {
        let missing = b"HTTP/1.1 404 Not Found\r\n\r\ngone";
        assert!(matches!(
            split_response(missing),
            Err(StoreError::NotFound(_))
        ));

        let broken = b"HTTP/1.1 500 Internal Server Error\r\n\r\n";
        assert!(matches!(
            split_response(broken),
            Err(StoreError::Transport(_))
        ));
    }

    #[test]
    fn test_remote_asset_source_joins_locators() {
        let source = RemoteAssetSource::new("http://localhost:3001/");
        assert_eq!(
            source.absolute("textures/skin.png"),
            "http://localhost:3001/textures/skin.png"
        );
        assert_eq!(
            source.absolute("http://cdn.example/a.png"),
            "http://cdn.example/a.png"
        );
    }
}
