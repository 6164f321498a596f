//! Document converter
//!
//! Encoding flattens a live document into a record list in a fixed order:
//! singletons first, then a pre-order walk of the graph. Decoding runs a
//! small phase machine: singletons, then the synchronous graph walk, then
//! one concurrent pass that drives every deferred fetch to completion
//! before the future resolves. The record list is read-only throughout.

use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use serde_json::Value;

use basalt_scene::{
    AnimationClip, AnimationGroup, AudioListener, Node, SceneDocument, Script, Token,
};

use crate::context::{AssetSource, PendingOp, ResolveContext};
use crate::error::{CodecError, CodecResult};
use crate::external;
use crate::record::{tokens, Record, RecordTable};
use crate::registry::CodecRegistry;
use crate::texture;

/// Decode progress, logged at each transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    SingletonsResolving,
    GraphWalking,
    StubsResolving,
    Complete,
}

impl Phase {
    fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::SingletonsResolving => "singletons-resolving",
            Phase::GraphWalking => "graph-walking",
            Phase::StubsResolving => "stubs-resolving",
            Phase::Complete => "complete",
        }
    }
}

struct PhaseMachine {
    phase: Phase,
}

impl PhaseMachine {
    fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    fn enter(&mut self, next: Phase) {
        log::debug!("decode phase {} -> {}", self.phase.as_str(), next.as_str());
        self.phase = next;
    }
}

/// Converts between live documents and flat record lists.
pub struct Converter {
    registry: Arc<CodecRegistry>,
}

impl Converter {
    pub fn new(registry: Arc<CodecRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    // ========================================================================
    // Encode
    // ========================================================================

    /// Flatten a document. Order is fixed: config, camera, renderer,
    /// scripts, animation groups and clips, listener, then the graph in
    /// pre-order. External and effect subtrees are not descended into.
    pub fn encode(&self, doc: &SceneDocument) -> Vec<Record> {
        let mut out = Vec::new();

        out.push(singleton_record(
            "EditorConfig",
            tokens::CONFIG,
            serde_json::to_value(&doc.config).unwrap_or(Value::Null),
        ));

        let mut camera = self.registry.nodes.encode(&self.registry, &doc.camera);
        camera.token = tokens::CAMERA.to_string();
        out.push(camera);

        out.push(singleton_record(
            "RendererSettings",
            tokens::RENDERER,
            serde_json::to_value(&doc.renderer).unwrap_or(Value::Null),
        ));

        for (target, scripts) in &doc.scripts {
            for script in scripts {
                let mut rec = Record::new("Script", Token::generate());
                rec.insert("target", target.to_string());
                rec.insert("name", script.name.clone());
                rec.insert("source", script.source.clone());
                out.push(rec);
            }
        }

        for group in &doc.animations {
            let mut group_rec = Record::new("AnimationGroup", Token::generate());
            group_rec.insert("name", group.name.clone());
            let mut clip_recs = Vec::with_capacity(group.clips.len());
            for clip in &group.clips {
                let rec = singleton_record(
                    "AnimationClip",
                    Token::generate(),
                    serde_json::to_value(clip).unwrap_or(Value::Null),
                );
                group_rec.children.push(rec.token.clone());
                clip_recs.push(rec);
            }
            out.push(group_rec);
            out.extend(clip_recs);
        }

        if let Some(listener) = &doc.listener {
            let mut rec = Record::new("AudioListener", tokens::LISTENER);
            rec.insert("masterVolume", listener.master_volume);
            out.push(rec);
        }

        self.walk_encode(&doc.scene, &mut out);
        out
    }

    fn walk_encode(&self, node: &Node, out: &mut Vec<Record>) {
        out.push(self.registry.nodes.encode(&self.registry, node));
        if node.is_external() || node.is_effect() {
            return;
        }
        for child in &node.children {
            self.walk_encode(child, out);
        }
    }

    // ========================================================================
    // Decode
    // ========================================================================

    /// Rebuild a document from a flat record list. The returned future
    /// resolves only after every deferred image load and stub fetch has
    /// settled; those failures warn and resolve to absent, so the only
    /// error surfaced here is a structurally missing scene.
    pub async fn decode(
        &self,
        records: &[Record],
        mut ctx: ResolveContext,
    ) -> CodecResult<SceneDocument> {
        let mut machine = PhaseMachine::new();
        let table = RecordTable::new(records);

        machine.enter(Phase::SingletonsResolving);
        let config = match table.get(tokens::CONFIG) {
            Some(rec) => match serde_json::from_value(Value::Object(rec.payload.clone())) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("editor config is malformed ({}); using defaults", e);
                    Default::default()
                }
            },
            None => {
                log::warn!("document has no editor config; using defaults");
                Default::default()
            }
        };

        let camera = table
            .get(tokens::CAMERA)
            .and_then(|rec| self.registry.nodes.decode(&self.registry, rec, &mut ctx))
            .filter(Node::is_camera)
            .unwrap_or_else(|| {
                log::warn!("document has no usable camera; using the default");
                Node::default_camera()
            });

        let renderer = match table.get(tokens::RENDERER) {
            Some(rec) => match serde_json::from_value(Value::Object(rec.payload.clone())) {
                Ok(renderer) => renderer,
                Err(e) => {
                    log::warn!("renderer settings are malformed ({}); using defaults", e);
                    Default::default()
                }
            },
            None => {
                log::warn!("document has no renderer settings; using defaults");
                Default::default()
            }
        };

        let mut scripts: std::collections::BTreeMap<Token, Vec<Script>> = Default::default();
        for rec in table.of_kind("Script") {
            let Some(target) = rec.str_field("target") else {
                log::warn!("script record '{}' has no target; skipping", rec.token);
                continue;
            };
            scripts.entry(target.into()).or_default().push(Script {
                name: rec.str_field("name").unwrap_or("").to_string(),
                source: rec.str_field("source").unwrap_or("").to_string(),
            });
        }

        let mut animations = Vec::new();
        for rec in table.of_kind("AnimationGroup") {
            let mut clips = Vec::new();
            for clip_token in &rec.children {
                let Some(clip_rec) = table.get(clip_token) else {
                    log::warn!("animation clip '{}' is missing; skipping", clip_token);
                    continue;
                };
                match serde_json::from_value::<AnimationClip>(Value::Object(
                    clip_rec.payload.clone(),
                )) {
                    Ok(clip) => clips.push(clip),
                    Err(e) => log::warn!("animation clip '{}' is malformed: {}", clip_token, e),
                }
            }
            animations.push(AnimationGroup {
                name: rec.str_field("name").unwrap_or("").to_string(),
                clips,
            });
        }

        let listener = table.get(tokens::LISTENER).map(|rec| AudioListener {
            master_volume: rec.f32_field("masterVolume").unwrap_or(1.0),
        });

        machine.enter(Phase::GraphWalking);
        let scene_rec = table
            .first_of_kind("Scene")
            .ok_or_else(|| CodecError::Singleton("document has no scene record".to_string()))?;
        let mut scene = decode_node_tree(&self.registry, &table, scene_rec, &mut ctx)
            .ok_or_else(|| CodecError::Singleton("scene record failed to decode".to_string()))?;

        let pending = ctx.take_pending();
        if pending.is_empty() {
            log::debug!("no pending operations; skipping stub resolution");
        } else {
            machine.enter(Phase::StubsResolving);
            drive_pending(&self.registry, &ctx.assets, pending, &mut scene).await;
        }

        machine.enter(Phase::Complete);
        Ok(SceneDocument {
            config,
            camera,
            renderer,
            scripts,
            animations,
            listener,
            scene,
        })
    }
}

fn singleton_record(kind: &str, token: impl Into<String>, value: Value) -> Record {
    let mut rec = Record::new(kind, token);
    if let Value::Object(fields) = value {
        for (key, value) in fields {
            rec.payload.insert(key, value);
        }
    }
    rec
}

/// Decode one record and its subtree. Children are resolved by token over
/// the whole table; a child may appear anywhere in the list. Stub children
/// are queued instead of attached, and effect subtrees come back already
/// rebuilt.
pub(crate) fn decode_node_tree(
    registry: &CodecRegistry,
    table: &RecordTable<'_>,
    record: &Record,
    ctx: &mut ResolveContext,
) -> Option<Node> {
    let mut node = registry.nodes.decode(registry, record, ctx)?;
    if node.is_effect() {
        // Effect subtrees are rebuilt from parameters; stored children
        // tokens on an effect record are spurious.
        if !record.children.is_empty() {
            log::warn!(
                "effect record '{}' carries {} children tokens; ignoring them",
                record.token,
                record.children.len()
            );
        }
        return Some(node);
    }
    for child_token in &record.children {
        let Some(child_rec) = table.get(child_token) else {
            log::warn!(
                "node '{}' references missing child '{}'; skipping",
                record.token,
                child_token
            );
            continue;
        };
        if child_rec.kind() == "External" {
            ctx.queue_stub(node.token.clone(), child_rec.clone());
            continue;
        }
        if let Some(child) = decode_node_tree(registry, table, child_rec, ctx) {
            node.children.push(child);
        }
    }
    Some(node)
}

enum Settled {
    Done,
    Splice(Token, Option<Node>),
}

/// Drive every pending operation concurrently and splice resolved stubs
/// into the tree under `root`. Resolves only once all operations have
/// settled; individual failures have already warned and yield nothing.
pub(crate) async fn drive_pending(
    registry: &CodecRegistry,
    assets: &Arc<dyn AssetSource>,
    ops: Vec<PendingOp>,
    root: &mut Node,
) {
    let futures: Vec<BoxFuture<'_, Settled>> = ops
        .into_iter()
        .map(|op| match op {
            PendingOp::Image { payload, source } => {
                let assets = assets.clone();
                Box::pin(async move {
                    texture::materialize(assets, payload, source).await;
                    Settled::Done
                }) as BoxFuture<'_, Settled>
            }
            PendingOp::Stub { parent, record } => {
                let assets = assets.clone();
                Box::pin(async move {
                    Settled::Splice(parent, external::resolve_stub(registry, assets, record).await)
                }) as BoxFuture<'_, Settled>
            }
        })
        .collect();

    for settled in join_all(futures).await {
        let Settled::Splice(parent, resolved) = settled else { continue };
        let Some(resolved) = resolved else { continue };
        match root.find_mut(&parent) {
            Some(parent) => parent.children.push(resolved),
            None => log::warn!(
                "resolved stub's parent '{}' is no longer in the tree; dropping it",
                parent
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_scene::NodeKind;

    #[test]
    fn test_encode_order_is_fixed() {
        let converter = Converter::new(Arc::new(CodecRegistry::new()));
        let mut doc = SceneDocument::new();
        doc.listener = Some(AudioListener::default());
        doc.scene.children.push(Node::named(NodeKind::Group, "a"));

        let records = converter.encode(&doc);
        let kinds: Vec<&str> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "EditorConfig",
                "PerspectiveCamera",
                "RendererSettings",
                "AudioListener",
                "Scene",
                "Group"
            ]
        );
        assert_eq!(records[0].token, tokens::CONFIG);
        assert_eq!(records[1].token, tokens::CAMERA);
        assert_eq!(records[3].token, tokens::LISTENER);
    }

    #[test]
    fn test_walk_is_preorder() {
        let converter = Converter::new(Arc::new(CodecRegistry::new()));
        let mut doc = SceneDocument::new();
        let mut parent = Node::named(NodeKind::Group, "parent");
        parent.children.push(Node::named(NodeKind::Group, "inner"));
        doc.scene.children.push(parent);
        doc.scene.children.push(Node::named(NodeKind::Group, "sibling"));

        let records = converter.encode(&doc);
        let names: Vec<&str> = records
            .iter()
            .filter(|r| r.kind() == "Group")
            .filter_map(|r| r.str_field("name"))
            .collect();
        assert_eq!(names, vec!["parent", "inner", "sibling"]);
    }
}
