//! Physics collaborator seam
//!
//! The engine never simulates bodies itself. It asks a [`PhysicsWorld`] to add, remove
//! and launch pieces, and reads back positions and speeds while resolving a batch.
//! Game data (tiers) is never attached to physics bodies; the merge resolver keeps its
//! own side table keyed by [`InstanceHandle`].

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque id of a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceHandle(pub u32);

/// Two bodies touching during one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub a: InstanceHandle,
    pub b: InstanceHandle,
}

impl Contact {
    pub fn new(a: InstanceHandle, b: InstanceHandle) -> Self {
        Self { a, b }
    }
}

/// What the engine needs from a rigid-body simulator
pub trait PhysicsWorld {
    /// Add a dynamic circle
    fn add_instance(&mut self, position: Vec2, radius: f32) -> InstanceHandle;
    fn remove_instances(&mut self, handles: &[InstanceHandle]);
    fn set_velocity(&mut self, handle: InstanceHandle, velocity: Vec2);
    fn set_gravity(&mut self, gravity: Vec2);
    /// Remove every dynamic body (boundaries stay)
    fn clear_all(&mut self);
    fn position(&self, handle: InstanceHandle) -> Option<Vec2>;
    fn speed(&self, handle: InstanceHandle) -> Option<f32>;
}

/// A circle in the headless world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// Minimal kinematic world for headless runs and tests
///
/// Integrates gravity, keeps circles inside the arena box, pushes overlapping circles
/// apart and reports every overlapping pair as a contact. Velocity units are pixels per
/// step, matching the launch speed.
#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    bodies: BTreeMap<InstanceHandle, Body>,
    gravity: Vec2,
    size: Vec2,
    next_id: u32,
}

impl HeadlessWorld {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity: Vec2::ZERO,
            size: Vec2::new(width, height),
            next_id: 1,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    pub fn body(&self, handle: InstanceHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    /// Bodies in handle order
    pub fn bodies(&self) -> impl Iterator<Item = (InstanceHandle, &Body)> {
        self.bodies.iter().map(|(&h, b)| (h, b))
    }

    /// Teleport a body (tests, scripted scenarios)
    pub fn set_position(&mut self, handle: InstanceHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
        }
    }

    /// Advance one step and return the contacts seen
    pub fn step(&mut self) -> Vec<Contact> {
        let (gravity, size) = (self.gravity, self.size);
        for body in self.bodies.values_mut() {
            body.vel += gravity;
            body.pos += body.vel;
            confine(size, body);
        }

        let handles: Vec<InstanceHandle> = self.bodies.keys().copied().collect();
        let mut contacts = Vec::new();
        for (i, &ha) in handles.iter().enumerate() {
            for &hb in &handles[i + 1..] {
                let (a, b) = (self.bodies[&ha], self.bodies[&hb]);
                let delta = b.pos - a.pos;
                let overlap = a.radius + b.radius - delta.length();
                if overlap <= 0.0 {
                    continue;
                }
                contacts.push(Contact::new(ha, hb));

                // Split the overlap and cancel approaching velocity along the normal
                let normal = delta.try_normalize().unwrap_or(Vec2::Y);
                let correction = normal * (overlap * 0.5);
                if let Some(body) = self.bodies.get_mut(&ha) {
                    body.pos -= correction;
                    body.vel -= normal * body.vel.dot(normal).max(0.0);
                }
                if let Some(body) = self.bodies.get_mut(&hb) {
                    body.pos += correction;
                    body.vel -= normal * body.vel.dot(normal).min(0.0);
                }
            }
        }

        for body in self.bodies.values_mut() {
            confine(size, body);
        }
        contacts
    }
}

/// Keep a circle inside the arena box, killing velocity into the wall
fn confine(size: Vec2, body: &mut Body) {
    let min = Vec2::splat(body.radius);
    let max = (size - Vec2::splat(body.radius)).max(min);
    let clamped = body.pos.clamp(min, max);
    if clamped.x != body.pos.x {
        body.vel.x = 0.0;
    }
    if clamped.y != body.pos.y {
        body.vel.y = 0.0;
    }
    body.pos = clamped;
}

impl PhysicsWorld for HeadlessWorld {
    fn add_instance(&mut self, position: Vec2, radius: f32) -> InstanceHandle {
        let handle = InstanceHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            handle,
            Body {
                pos: position,
                vel: Vec2::ZERO,
                radius,
            },
        );
        handle
    }

    fn remove_instances(&mut self, handles: &[InstanceHandle]) {
        for handle in handles {
            self.bodies.remove(handle);
        }
    }

    fn set_velocity(&mut self, handle: InstanceHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.vel = velocity;
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn clear_all(&mut self) {
        self.bodies.clear();
    }

    fn position(&self, handle: InstanceHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn speed(&self, handle: InstanceHandle) -> Option<f32> {
        self.bodies.get(&handle).map(|b| b.vel.length())
    }
}
