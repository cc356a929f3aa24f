//! Scene graph: named nodes with a translation, an enabled flag, an optional sprite and
//! an optional user tag, arranged in a parent/child hierarchy.
//!
//! Root nodes act as draw layers: they are visited in insertion order, and so are the
//! children of every node, which gives back-to-front ordering without explicit z values.

use std::collections::HashMap;

use thiserror::Error;

use crate::math::Vec2;
use crate::render::Sprite;

/// Unique identifier for a node in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Get the underlying integer ID (useful for debugging).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
    #[error("scene node {0:?} already has a parent")]
    AlreadyParented(NodeId),
    #[error("attaching the node would create a cycle")]
    Cycle,
}

/// A single scene node.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    translation: Vec2,
    enabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    drawable: Option<Sprite>,
    user_tag: Option<u32>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            translation: Vec2::ZERO,
            enabled: true,
            parent: None,
            children: Vec::new(),
            drawable: None,
            user_tag: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translation relative to the parent node.
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec2) {
        self.translation = translation;
    }

    pub fn set_translation_y(&mut self, y: f32) {
        self.translation.y = y;
    }

    pub fn translate_x(&mut self, dx: f32) {
        self.translation.x += dx;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn drawable(&self) -> Option<&Sprite> {
        self.drawable.as_ref()
    }

    pub fn drawable_mut(&mut self) -> Option<&mut Sprite> {
        self.drawable.as_mut()
    }

    pub fn set_drawable(&mut self, sprite: Sprite) {
        self.drawable = Some(sprite);
    }

    /// Opaque value game code attaches to the node, e.g. an entity kind.
    pub fn user_tag(&self) -> Option<u32> {
        self.user_tag
    }

    pub fn set_user_tag(&mut self, tag: Option<u32>) {
        self.user_tag = tag;
    }
}

/// Owns every node and the root ordering.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node, as a root when `parent` is `None`.
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            self.ensure_exists(parent)?;
        }

        self.next_id = self.next_id.wrapping_add(1).max(1);
        let id = NodeId(self.next_id);
        let mut node = Node::new(name.into());
        node.parent = parent;
        self.nodes.insert(id, node);

        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Attach an existing root node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.ensure_exists(parent)?;
        if self.node(child)?.parent.is_some() {
            return Err(SceneError::AlreadyParented(child));
        }
        if parent == child || self.ancestors(parent).any(|id| id == child) {
            return Err(SceneError::Cycle);
        }

        self.roots.retain(|&id| id != child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Remove `id` and its whole subtree. Returns every removed node, `id` first.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.iter().rev());
                removed.push(current);
            }
        }
        Ok(removed)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given name in visit order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.visit(|id, node| {
            if found.is_none() && node.name == name {
                found = Some(id);
            }
            found.is_none()
        });
        found
    }

    /// Translation of the node in world space (sum over its ancestors).
    pub fn world_translation(&self, id: NodeId) -> Result<Vec2, SceneError> {
        let mut position = self.node(id)?.translation;
        for ancestor in self.ancestors(id) {
            if let Some(node) = self.nodes.get(&ancestor) {
                position += node.translation;
            }
        }
        Ok(position)
    }

    /// True when the node and all of its ancestors are enabled.
    pub fn is_effectively_enabled(&self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(node) if node.enabled => self
                .ancestors(id)
                .all(|ancestor| self.nodes.get(&ancestor).is_some_and(|n| n.enabled)),
            _ => false,
        }
    }

    /// Depth-first walk in draw order. Returning `false` skips the node's children.
    pub fn visit<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(NodeId, &'a Node) -> bool,
    {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if visitor(id, node) {
                stack.extend(node.children.iter().rev());
            }
        }
    }

    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.nodes.get(&id).and_then(|n| n.parent);
            Some(id)
        })
    }

    fn ensure_exists(&self, id: NodeId) -> Result<(), SceneError> {
        self.node(id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rect;
    use crate::render::TextureHandle;

    fn layered() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let back = scene.add_node("layer_back", None).unwrap();
        let hero = scene.add_node("layer_hero", None).unwrap();
        (scene, back, hero)
    }

    #[test]
    fn world_translation_accumulates_parents() {
        let (mut scene, _, hero) = layered();
        let pipe = scene.add_node("pipe", Some(hero)).unwrap();
        let upper = scene.add_node("pipeUp", Some(pipe)).unwrap();
        scene.node_mut(hero).unwrap().set_translation(Vec2::new(1.0, 1.0));
        scene.node_mut(pipe).unwrap().set_translation(Vec2::new(200.0, 10.0));
        scene.node_mut(upper).unwrap().set_translation(Vec2::new(0.0, 202.0));

        assert_eq!(scene.world_translation(upper).unwrap(), Vec2::new(201.0, 213.0));
    }

    #[test]
    fn visit_is_depth_first_in_insertion_order() {
        let (mut scene, back, hero) = layered();
        let bg = scene.add_node("background", Some(back)).unwrap();
        let ground = scene.add_node("ground", Some(hero)).unwrap();
        let bird = scene.add_node("bird", Some(hero)).unwrap();

        let mut order = Vec::new();
        scene.visit(|id, _| {
            order.push(id);
            true
        });
        assert_eq!(order, vec![back, bg, hero, ground, bird]);
    }

    #[test]
    fn visitor_can_prune_disabled_subtrees() {
        let (mut scene, back, _) = layered();
        let menu = scene.add_node("menu", Some(back)).unwrap();
        scene.add_node("start", Some(menu)).unwrap();
        scene.node_mut(menu).unwrap().set_enabled(false);

        let mut names = Vec::new();
        scene.visit(|_, node| {
            if !node.is_enabled() {
                return false;
            }
            names.push(node.name().to_string());
            true
        });
        assert_eq!(names, vec!["layer_back", "layer_hero"]);
    }

    #[test]
    fn visit_lends_nodes_for_the_whole_walk() {
        let (mut scene, back, hero) = layered();
        let sky = scene.add_node("background", Some(back)).unwrap();
        let bird = scene.add_node("bird", Some(hero)).unwrap();
        scene
            .node_mut(sky)
            .unwrap()
            .set_drawable(Sprite::new(TextureHandle::from_raw(1), Rect::new(0.0, 0.0, 288.0, 512.0)));
        scene
            .node_mut(bird)
            .unwrap()
            .set_drawable(Sprite::new(TextureHandle::from_raw(2), Rect::new(0.0, 0.0, 34.0, 24.0)));

        let mut sprites: Vec<&Sprite> = Vec::new();
        scene.visit(|_, node| {
            sprites.extend(node.drawable());
            true
        });
        let textures: Vec<_> = sprites.iter().map(|sprite| sprite.texture).collect();
        assert_eq!(textures, vec![TextureHandle::from_raw(1), TextureHandle::from_raw(2)]);
    }

    #[test]
    fn remove_node_drops_subtree() {
        let (mut scene, back, _) = layered();
        let pipe = scene.add_node("pipe", Some(back)).unwrap();
        let upper = scene.add_node("pipeUp", Some(pipe)).unwrap();
        let lower = scene.add_node("pipeDown", Some(pipe)).unwrap();

        let removed = scene.remove_node(pipe).unwrap();
        assert_eq!(removed, vec![pipe, upper, lower]);
        assert!(!scene.contains(upper));
        assert!(scene.node(back).unwrap().children().is_empty());
        assert_eq!(scene.remove_node(pipe), Err(SceneError::UnknownNode(pipe)));
    }

    #[test]
    fn add_child_reparents_roots_only() {
        let (mut scene, back, hero) = layered();
        let orphan = scene.add_node("orphan", None).unwrap();
        scene.add_child(hero, orphan).unwrap();
        assert_eq!(scene.roots(), &[back, hero]);
        assert_eq!(scene.node(hero).unwrap().first_child(), Some(orphan));

        assert_eq!(
            scene.add_child(back, orphan),
            Err(SceneError::AlreadyParented(orphan))
        );
    }

    #[test]
    fn add_child_rejects_cycles() {
        let (mut scene, back, _) = layered();
        let child = scene.add_node("child", Some(back)).unwrap();
        let grandchild = scene.add_node("grandchild", Some(child)).unwrap();
        assert_eq!(scene.add_child(grandchild, back), Err(SceneError::Cycle));
        assert_eq!(scene.add_child(back, back), Err(SceneError::Cycle));
    }

    #[test]
    fn effective_enable_follows_ancestors() {
        let (mut scene, back, _) = layered();
        let over = scene.add_node("gameover", Some(back)).unwrap();
        let play = scene.add_node("play", Some(over)).unwrap();
        assert!(scene.is_effectively_enabled(play));

        scene.node_mut(over).unwrap().set_enabled(false);
        assert!(!scene.is_effectively_enabled(play));
        assert!(scene.node(play).unwrap().is_enabled());
    }

    #[test]
    fn find_by_name_returns_first_in_draw_order() {
        let (mut scene, back, hero) = layered();
        let first = scene.add_node("twin", Some(back)).unwrap();
        scene.add_node("twin", Some(hero)).unwrap();
        assert_eq!(scene.find_by_name("twin"), Some(first));
        assert_eq!(scene.find_by_name("missing"), None);
    }
}
