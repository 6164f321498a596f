//! Externally hosted entity stubs
//!
//! An external node's payload lives behind a remote locator embedded in
//! its annotation bag. Encoding never descends into the hosted subtree;
//! decoding queues the stub and resolves it after the synchronous walk by
//! fetching the locator, decoding the embedded sub-document and splicing
//! the result into the recorded parent. A composite locator joins the
//! sub-document with companion files (textures, animation clips) that are
//! layered over the asset source for the duration of the fetch.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use basalt_scene::{AnimationClip, Node, NodeKind};

use crate::context::{AssetSource, OverlaySource, ResolveContext};
use crate::converter;
use crate::node::apply_envelope;
use crate::record::{Record, RecordTable};
use crate::registry::CodecRegistry;

/// Joins the sub-document locator with its companion file locators.
pub const LOCATOR_SEPARATOR: char = ';';

/// Annotation bag key carrying the remote locator.
pub const LOCATOR_KEY: &str = "locator";

/// Build a stub node for a hosted payload. The locator goes into the
/// annotation bag so it survives any round trip unchanged.
pub fn stub_node(locator: impl Into<String>) -> Node {
    let mut node = Node::new(NodeKind::External { pending: true });
    node.user_data = serde_json::json!({ LOCATOR_KEY: locator.into() });
    node
}

/// The remote locator of a stub, if it carries one.
pub fn locator_of(node: &Node) -> Option<&str> {
    node.user_data.get(LOCATOR_KEY)?.as_str()
}

/// Registered decoder for the stub kind. The envelope is applied by the
/// caller; resolution happens separately via [`resolve_stub`].
pub(crate) fn decode_stub_node(
    _registry: &CodecRegistry,
    _record: &Record,
    _ctx: &mut ResolveContext,
) -> Option<Node> {
    Some(Node::new(NodeKind::External { pending: true }))
}

/// Materialize one queued stub. Resolves to the spliceable node, or to
/// absent after a warning; failures never propagate.
pub(crate) fn resolve_stub<'a>(
    registry: &'a CodecRegistry,
    assets: Arc<dyn AssetSource>,
    record: Record,
) -> BoxFuture<'a, Option<Node>> {
    Box::pin(async move {
        let Some(locator) = record
            .get("userData")
            .and_then(|bag| bag.get(LOCATOR_KEY))
            .and_then(|v| v.as_str())
        else {
            log::warn!("stub '{}' has no locator; leaving it unresolved", record.token);
            return None;
        };

        let mut parts = locator.split(LOCATOR_SEPARATOR);
        // split always yields at least one part
        let document_locator = parts.next().unwrap_or_default();

        let bytes = match assets.fetch(document_locator).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("stub '{}' fetch failed: {}", record.token, e);
                return None;
            }
        };
        let sub_records: Vec<Record> = match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("stub '{}' sub-document is malformed: {}", record.token, e);
                return None;
            }
        };

        // Companion files ride along with the sub-document: animation
        // clips are parsed directly, everything else is layered over the
        // asset source so the sub-document's own references resolve.
        let mut companions: HashMap<String, Vec<u8>> = HashMap::new();
        let mut clips: Vec<AnimationClip> = Vec::new();
        for part in parts {
            let bytes = match assets.fetch(part).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("stub companion '{}' fetch failed: {}", part, e);
                    continue;
                }
            };
            if part.ends_with(".clip.json") {
                match serde_json::from_slice::<Vec<AnimationClip>>(&bytes) {
                    Ok(parsed) => clips.extend(parsed),
                    Err(e) => log::warn!("stub companion '{}' is malformed: {}", part, e),
                }
            } else {
                companions.insert(part.to_string(), bytes);
            }
        }

        let overlay: Arc<dyn AssetSource> = Arc::new(OverlaySource::new(companions, assets));
        let mut ctx = ResolveContext::new(overlay.clone());
        let table = RecordTable::new(&sub_records);
        let Some(root) = sub_records.first() else {
            log::warn!("stub '{}' sub-document is empty", record.token);
            return None;
        };
        let Some(mut node) = converter::decode_node_tree(registry, &table, root, &mut ctx) else {
            log::warn!("stub '{}' sub-document root failed to decode", record.token);
            return None;
        };

        // The sub-document may carry its own images and nested stubs.
        let pending = ctx.take_pending();
        converter::drive_pending(registry, &overlay, pending, &mut node).await;

        // The stub's own pose and annotations win over the hosted ones.
        apply_envelope(&record, &mut node);
        node.animations.extend(clips);
        Some(node)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_node_carries_locator() {
        let node = stub_node("https://assets.example/crate.json");
        assert!(node.is_external());
        assert_eq!(locator_of(&node), Some("https://assets.example/crate.json"));
    }

    #[test]
    fn test_stub_encode_has_empty_children() {
        let registry = CodecRegistry::new();
        let mut node = stub_node("a.json");
        node.children.push(Node::new(NodeKind::Group));

        let rec = registry.nodes.encode(&registry, &node);
        assert_eq!(rec.kind(), "External");
        assert!(rec.children.is_empty());
        assert_eq!(rec.get("userData").unwrap()[LOCATOR_KEY], "a.json");
    }
}
