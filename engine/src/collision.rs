//! Ghost collision objects: shapes attached to scene nodes that report overlaps but
//! never push each other around.
//!
//! Each object is a rapier sensor on a kinematic body. [`CollisionWorld::step`] copies
//! node positions into the bodies, lets rapier's narrow phase find intersections, and
//! turns them into edge-triggered events for objects registered with
//! [`CollisionWorld::add_listener`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

// Rapier stays an implementation detail of this module.
use rapier2d::prelude::{
    vector, ActiveCollisionTypes, ActiveEvents, BroadPhase, CCDSolver, ChannelEventCollector,
    ColliderBuilder, ColliderHandle, ColliderSet, CollisionEvent as RapierEvent, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType, SharedShape,
};
// The `vector!` macro expands to paths rooted at `nalgebra`.
use rapier2d::na as nalgebra;

use crate::math::Vec2;
use crate::scene::{NodeId, Scene};

/// Engine-facing collider shape, centred on its node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollisionShape {
    Sphere { radius: f32 },
    Box { width: f32, height: f32 },
}

impl CollisionShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn box_shape(width: f32, height: f32) -> Self {
        Self::Box { width, height }
    }

    fn to_rapier_shape(self) -> SharedShape {
        match self {
            CollisionShape::Sphere { radius } => SharedShape::ball(radius),
            CollisionShape::Box { width, height } => SharedShape::cuboid(width * 0.5, height * 0.5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionObjectId(u32);

#[derive(Clone, Copy, Debug)]
pub struct CollisionObject {
    pub node: NodeId,
    pub shape: CollisionShape,
    listening: bool,
    /// Present while the node is enabled and the object lives in the rapier world.
    body: Option<RigidBodyHandle>,
    collider: Option<ColliderHandle>,
}

impl CollisionObject {
    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionEventKind {
    Colliding,
    NotColliding,
}

/// Overlap change between a listening object (`a`) and any other object (`b`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    pub kind: CollisionEventKind,
    pub object_a: CollisionObjectId,
    pub object_b: CollisionObjectId,
    pub node_a: NodeId,
    pub node_b: NodeId,
}

pub struct CollisionWorld {
    // --- rapier internals ---
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    event_recv: crossbeam_channel::Receiver<RapierEvent>,
    event_handler: ChannelEventCollector,

    // --- mappings (engine <-> rapier) ---
    objects: BTreeMap<CollisionObjectId, CollisionObject>,
    collider_to_object: HashMap<ColliderHandle, CollisionObjectId>,

    /// (listener, other) pairs currently overlapping.
    touching: BTreeSet<(CollisionObjectId, CollisionObjectId)>,
    /// `NotColliding` events for objects that went away, reported on the next step.
    pending: Vec<CollisionEvent>,
    next_id: u32,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    pub fn new() -> Self {
        let (send_collision, event_recv) = crossbeam_channel::unbounded();
        // Contact force events are never enabled on ghost colliders.
        let (send_force, _) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector::new(send_collision, send_force);

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            event_recv,
            event_handler,

            objects: BTreeMap::new(),
            collider_to_object: HashMap::new(),
            touching: BTreeSet::new(),
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a shape on `node`. It joins the rapier world on the next `step`.
    pub fn add_object(&mut self, node: NodeId, shape: CollisionShape) -> CollisionObjectId {
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let id = CollisionObjectId(self.next_id);
        self.objects.insert(
            id,
            CollisionObject {
                node,
                shape,
                listening: false,
                body: None,
                collider: None,
            },
        );
        id
    }

    /// Remove an object. Pairs it was part of report `NotColliding` on the next step.
    pub fn remove_object(&mut self, id: CollisionObjectId) -> bool {
        if !self.objects.contains_key(&id) {
            return false;
        }
        let ended = self.end_contacts(id);
        self.pending.extend(ended);
        self.detach(id);
        self.objects.remove(&id);
        true
    }

    /// Remove every object attached to one of `nodes`. Returns how many were removed.
    pub fn remove_nodes(&mut self, nodes: &[NodeId]) -> usize {
        let doomed: Vec<_> = self
            .objects
            .iter()
            .filter(|(_, object)| nodes.contains(&object.node))
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.remove_object(*id);
        }
        doomed.len()
    }

    /// Report overlaps between `id` and every other object that start after this call.
    pub fn add_listener(&mut self, id: CollisionObjectId) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.listening = true;
                true
            }
            None => false,
        }
    }

    pub fn object(&self, id: CollisionObjectId) -> Option<&CollisionObject> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (CollisionObjectId, &CollisionObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Move every collider to its node, run the narrow phase and report overlap changes
    /// since the last step.
    ///
    /// Objects on missing or disabled nodes leave the rapier world until their node is
    /// enabled again.
    pub fn step(&mut self, scene: &Scene) -> Vec<CollisionEvent> {
        let mut events = std::mem::take(&mut self.pending);

        let ids: Vec<_> = self.objects.keys().copied().collect();
        for id in ids {
            let Some(object) = self.objects.get(&id).copied() else {
                continue;
            };
            let position = scene
                .is_effectively_enabled(object.node)
                .then(|| scene.world_translation(object.node).ok())
                .flatten();

            match (position, object.body) {
                (Some(position), Some(body)) => {
                    if let Some(body) = self.bodies.get_mut(body) {
                        body.set_translation(vector![position.x, position.y], true);
                    }
                }
                (Some(position), None) => self.attach(id, object.shape, position),
                (None, Some(_)) => {
                    events.extend(self.end_contacts(id));
                    self.detach(id);
                }
                (None, None) => {}
            }
        }

        let gravity = vector![0.0, 0.0];
        let hooks = &();
        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            hooks,
            &self.event_handler,
        );

        self.collect_events(&mut events);
        events
    }

    fn attach(&mut self, id: CollisionObjectId, shape: CollisionShape, position: Vec2) {
        let body = RigidBodyBuilder::new(RigidBodyType::KinematicPositionBased)
            .translation(vector![position.x, position.y])
            .build();
        let body = self.bodies.insert(body);

        let collider = ColliderBuilder::new(shape.to_rapier_shape())
            .sensor(true)
            // Kinematic/kinematic pairs are skipped by default.
            .active_collision_types(ActiveCollisionTypes::all())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        self.collider_to_object.insert(collider, id);
        if let Some(object) = self.objects.get_mut(&id) {
            object.body = Some(body);
            object.collider = Some(collider);
        }
    }

    /// Take the object's body and collider out of the rapier world.
    fn detach(&mut self, id: CollisionObjectId) {
        let Some(object) = self.objects.get_mut(&id) else {
            return;
        };
        if let Some(collider) = object.collider.take() {
            self.collider_to_object.remove(&collider);
        }
        if let Some(body) = object.body.take() {
            self.bodies.remove(
                body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    /// Forget every overlap `id` takes part in, producing `NotColliding` for each.
    fn end_contacts(&mut self, id: CollisionObjectId) -> Vec<CollisionEvent> {
        let ended: Vec<_> = self
            .touching
            .iter()
            .filter(|(a, b)| *a == id || *b == id)
            .copied()
            .collect();

        let mut events = Vec::with_capacity(ended.len());
        for key in ended {
            self.touching.remove(&key);
            if let Some(event) = self.event(CollisionEventKind::NotColliding, key) {
                events.push(event);
            }
        }
        events
    }

    fn collect_events(&mut self, events: &mut Vec<CollisionEvent>) {
        while let Ok(event) = self.event_recv.try_recv() {
            let (c1, c2, started) = match event {
                RapierEvent::Started(c1, c2, _) => (c1, c2, true),
                RapierEvent::Stopped(c1, c2, _) => (c1, c2, false),
            };
            // Colliders removed since the pair was found no longer map to an object.
            let (Some(&o1), Some(&o2)) = (
                self.collider_to_object.get(&c1),
                self.collider_to_object.get(&c2),
            ) else {
                continue;
            };

            for key in [(o1, o2), (o2, o1)] {
                if !self.objects.get(&key.0).is_some_and(|object| object.listening) {
                    continue;
                }
                let changed = if started {
                    self.touching.insert(key)
                } else {
                    self.touching.remove(&key)
                };
                let kind = if started {
                    CollisionEventKind::Colliding
                } else {
                    CollisionEventKind::NotColliding
                };
                if let Some(event) = changed.then(|| self.event(kind, key)).flatten() {
                    events.push(event);
                }
            }
        }
    }

    fn event(
        &self,
        kind: CollisionEventKind,
        (object_a, object_b): (CollisionObjectId, CollisionObjectId),
    ) -> Option<CollisionEvent> {
        Some(CollisionEvent {
            kind,
            object_a,
            object_b,
            node_a: self.objects.get(&object_a)?.node,
            node_b: self.objects.get(&object_b)?.node,
        })
    }
}
