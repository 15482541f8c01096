//! Plane registry — the bridge from card ids to tagged mesh planes.
//!
//! A loaded model carries planes whose tags name the card they represent
//! (`card_id`, plus `row_id`/`card_type`/`label` bookkeeping from the
//! exporter). Registration is one full traversal per scene load; the owner
//! re-runs it explicitly whenever the model is replaced. Lookups are
//! read-only: callers may update a plane's render-affecting material state
//! through the scene, never swap the node itself.

use std::collections::HashMap;

use super::{tag_string, tag_truthy, NodeId, TagSource, Tags};

/// Tag metadata extracted from a plane node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMetadata {
    pub row_id: Option<String>,
    pub card_type: Option<String>,
    pub card_id: Option<String>,
    pub scaled_plane: bool,
    pub label: Option<String>,
    pub content: Option<String>,
    pub visible: bool,
    /// Node name in the asset, kept for diagnostics.
    pub name: String,
}

impl PlaneMetadata {
    /// Read plane tags off a node. Returns `None` for nodes that carry
    /// none of the plane markers (`row_id`, `card_id`, `scaledPlane`).
    pub fn extract(name: &str, tags: &Tags) -> Option<Self> {
        let row_id = tag_string(tags, "row_id");
        let card_id = tag_string(tags, "card_id");
        let scaled_plane = tag_truthy(tags, "scaledPlane");
        if row_id.is_none() && card_id.is_none() && !scaled_plane {
            return None;
        }
        Some(Self {
            row_id,
            card_type: tag_string(tags, "card_type"),
            card_id,
            scaled_plane,
            label: tag_string(tags, "label"),
            content: tag_string(tags, "content"),
            visible: tag_truthy(tags, "visible"),
            name: name.to_string(),
        })
    }
}

/// One registered plane: a node handle plus its extracted metadata.
#[derive(Debug, Clone)]
pub struct PlaneEntry {
    pub node: NodeId,
    pub metadata: PlaneMetadata,
}

/// Card-id → plane mapping plus the scaled-plane singleton.
#[derive(Debug, Clone, Default)]
pub struct PlaneRegistry {
    row_planes: HashMap<String, PlaneEntry>,
    scaled_plane: Option<PlaneEntry>,
}

impl PlaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Traverse the scene and register every node tagged with a `card_id`
    /// (scaled planes excluded). A later registration replaces the entry
    /// for the same card id wholesale.
    pub fn register_planes(&mut self, scene: &dyn TagSource) {
        scene.visit_nodes(&mut |node, name, tags| {
            let Some(metadata) = PlaneMetadata::extract(name, tags) else {
                return;
            };
            if metadata.scaled_plane {
                return;
            }
            if let Some(card_id) = metadata.card_id.clone() {
                self.row_planes.insert(card_id, PlaneEntry { node, metadata });
            }
        });
        log::debug!("registered {} row planes", self.row_planes.len());
    }

    /// Find the scaled-plane singleton. When several nodes claim the flag
    /// the last traversal hit wins; that ambiguity comes from the asset, so
    /// it gets logged rather than guessed at.
    pub fn register_scaled_plane(&mut self, scene: &dyn TagSource) {
        scene.visit_nodes(&mut |node, name, tags| {
            let Some(metadata) = PlaneMetadata::extract(name, tags) else {
                return;
            };
            if !metadata.scaled_plane {
                return;
            }
            if let Some(previous) = &self.scaled_plane {
                log::warn!(
                    "multiple scaled planes: '{}' replaces '{}'",
                    metadata.name,
                    previous.metadata.name
                );
            }
            self.scaled_plane = Some(PlaneEntry { node, metadata });
        });
    }

    pub fn lookup(&self, card_id: &str) -> Option<&PlaneEntry> {
        self.row_planes.get(card_id)
    }

    pub fn scaled_plane(&self) -> Option<&PlaneEntry> {
        self.scaled_plane.as_ref()
    }

    pub fn len(&self) -> usize {
        self.row_planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_planes.is_empty()
    }

    /// Drop everything. Called before re-registering against a freshly
    /// loaded model, since node handles do not survive a reload.
    pub fn clear(&mut self) {
        self.row_planes.clear();
        self.scaled_plane = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneModel, SceneNode};
    use serde_json::json;

    fn tagged_node(name: &str, card_id: Option<&str>, scaled: bool) -> SceneNode {
        let mut node = SceneNode::new(name);
        if let Some(id) = card_id {
            node.tags.insert("card_id".into(), json!(id));
            node.tags.insert("row_id".into(), json!("row-0"));
            node.tags.insert("card_type".into(), json!("text"));
        }
        if scaled {
            node.tags.insert("scaledPlane".into(), json!(true));
        }
        node
    }

    #[test]
    fn three_tagged_nodes_yield_three_hits() {
        let mut scene = SceneModel::default();
        scene.push(tagged_node("plane_1", Some("1"), false));
        scene.push(tagged_node("plane_2", Some("2"), false));
        scene.push(SceneNode::new("chassis")); // untagged
        scene.push(tagged_node("plane_3", Some("3"), false));

        let mut registry = PlaneRegistry::new();
        registry.register_planes(&scene);

        assert_eq!(registry.len(), 3);
        assert!(registry.lookup("1").is_some());
        assert!(registry.lookup("2").is_some());
        assert!(registry.lookup("3").is_some());
        assert!(registry.lookup("4").is_none());
    }

    #[test]
    fn scaled_planes_are_excluded_from_row_planes() {
        let mut scene = SceneModel::default();
        scene.push(tagged_node("z_plane", Some("9"), true));

        let mut registry = PlaneRegistry::new();
        registry.register_planes(&scene);
        registry.register_scaled_plane(&scene);

        assert!(registry.lookup("9").is_none());
        assert_eq!(registry.scaled_plane().unwrap().metadata.name, "z_plane");
    }

    #[test]
    fn last_scaled_plane_wins() {
        let mut scene = SceneModel::default();
        scene.push(tagged_node("z_first", None, true));
        scene.push(tagged_node("z_second", None, true));

        let mut registry = PlaneRegistry::new();
        registry.register_scaled_plane(&scene);

        assert_eq!(registry.scaled_plane().unwrap().metadata.name, "z_second");
    }

    #[test]
    fn reregistration_replaces_entries() {
        let mut scene = SceneModel::default();
        scene.push(tagged_node("plane_old", Some("1"), false));

        let mut registry = PlaneRegistry::new();
        registry.register_planes(&scene);
        assert_eq!(registry.lookup("1").unwrap().metadata.name, "plane_old");

        let mut replacement = SceneModel::default();
        replacement.push(tagged_node("plane_new", Some("1"), false));
        registry.register_planes(&replacement);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("1").unwrap().metadata.name, "plane_new");
    }

    #[test]
    fn numeric_card_ids_register_as_strings() {
        // Blender integer custom properties export as JSON numbers.
        let mut node = SceneNode::new("plane_n");
        node.tags.insert("card_id".into(), json!(7));
        let mut scene = SceneModel::default();
        scene.push(node);

        let mut registry = PlaneRegistry::new();
        registry.register_planes(&scene);
        assert!(registry.lookup("7").is_some());
    }
}
