//! Contract tests for the document stores and asset sources.

use basalt_codec::{AssetError, AssetSource, Record};
use basalt_store::{
    DirectoryAssetSource, DocumentStore, MemoryStore, RemoteAssetSource, RemoteStore, StoreError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Serve one canned HTTP response on an ephemeral port and hand back the
/// captured request for inspection.
async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request_complete(&request) {
                break;
            }
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });
    (format!("http://{}", addr), handle)
}

fn request_complete(request: &[u8]) -> bool {
    let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&request[..header_end]);
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}

fn sample_records() -> Vec<Record> {
    let mut scene = Record::new("Scene", "s1");
    scene.insert("name", "Scene");
    scene.children.push("g1".to_string());
    let group = Record::new("Group", "g1");
    vec![scene, group]
}

#[tokio::test]
async fn test_memory_store_save_load_roundtrip() {
    init_logging();
    let store = MemoryStore::new();
    let records = sample_records();

    let id = store.save("level-1", &records).await.unwrap();
    let loaded = store.load(&id).await.unwrap();
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn test_memory_store_list_and_delete() {
    init_logging();
    let store = MemoryStore::new();
    let a = store.save("alpha", &sample_records()).await.unwrap();
    let b = store.save("beta", &sample_records()).await.unwrap();
    assert_ne!(a, b);

    let summaries = store.list().await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].record_count, 2);

    store.delete(&a).await.unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.load(&a).await,
        Err(StoreError::NotFound(a.clone()))
    );
    assert_eq!(
        store.delete(&a).await,
        Err(StoreError::NotFound(a))
    );
}

#[tokio::test]
async fn test_remote_store_save_posts_document() {
    init_logging();
    let (base, server) =
        serve_once("HTTP/1.1 200 OK\r\n\r\n{\"id\":\"doc-9\"}".to_string()).await;

    let store = RemoteStore::new(base);
    let id = store.save("level-1", &sample_records()).await.unwrap();
    assert_eq!(id, "doc-9");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/documents HTTP/1.1"));
    assert!(request.contains("Content-Type: application/json"));
    assert!(request.contains("\"name\":\"level-1\""));
}

#[tokio::test]
async fn test_remote_store_load_round_trips_records() {
    init_logging();
    let records = sample_records();
    let body = format!(
        "{{\"records\":{}}}",
        serde_json::to_string(&records).unwrap()
    );
    let (base, server) = serve_once(format!("HTTP/1.1 200 OK\r\n\r\n{}", body)).await;

    let store = RemoteStore::new(base);
    let loaded = store.load("doc-9").await.unwrap();
    assert_eq!(loaded, records);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/documents/doc-9 HTTP/1.1"));
}

#[tokio::test]
async fn test_remote_store_missing_document_maps_to_not_found() {
    init_logging();
    let (base, server) =
        serve_once("HTTP/1.1 404 Not Found\r\n\r\ngone".to_string()).await;

    let store = RemoteStore::new(base);
    assert!(matches!(
        store.load("doc-0").await,
        Err(StoreError::NotFound(_))
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn test_remote_asset_source_fetches_bytes() {
    init_logging();
    let (base, server) = serve_once("HTTP/1.1 200 OK\r\n\r\npixels".to_string()).await;

    let source = RemoteAssetSource::new(base);
    let bytes = source.fetch("textures/skin.png").await.unwrap();
    assert_eq!(bytes, b"pixels".to_vec());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /textures/skin.png HTTP/1.1"));
}

#[tokio::test]
async fn test_remote_asset_source_maps_missing_to_not_found() {
    init_logging();
    let (base, server) =
        serve_once("HTTP/1.1 404 Not Found\r\n\r\n".to_string()).await;

    let source = RemoteAssetSource::new(base);
    assert_eq!(
        source.fetch("gone.png").await,
        Err(AssetError::NotFound("gone.png".to_string()))
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_directory_asset_source_reads_files() {
    init_logging();
    let root = std::env::temp_dir().join(format!("basalt-store-test-{}", std::process::id()));
    tokio::fs::create_dir_all(&root).await.unwrap();
    tokio::fs::write(root.join("skin.png"), b"not-really-a-png")
        .await
        .unwrap();

    let source = DirectoryAssetSource::new(&root);
    assert_eq!(
        source.fetch("skin.png").await.unwrap(),
        b"not-really-a-png".to_vec()
    );
    assert_eq!(
        source.fetch("missing.png").await,
        Err(AssetError::NotFound("missing.png".to_string()))
    );
    assert!(matches!(
        source.fetch("../outside.png").await,
        Err(AssetError::NotFound(_))
    ));

    tokio::fs::remove_dir_all(&root).await.unwrap();
}
