use glam::Vec3A;
use serde::{Deserialize, Serialize};

use super::{NodeId, Scene};

/// How thoroughly the host resolves collisions for a body. Fast-moving
/// carried objects get `Continuous` to stop them tunneling through walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
pub enum CollisionFidelity {
    #[default]
    Discrete,
    Continuous,
}

/// Render-pose smoothing between physics ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
pub enum MotionInterpolation {
    #[default]
    Off,
    Interpolate,
    Extrapolate,
}

/// The body properties a grab overrides, captured so release can restore
/// them exactly as they were.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub linear_damping: f32,
    pub collision_fidelity: CollisionFidelity,
    pub interpolation: MotionInterpolation,
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub mass: f32,
    pub linear_damping: f32,
    pub velocity: Vec3A,
    pub kinematic: bool,
    pub collision_fidelity: CollisionFidelity,
    pub interpolation: MotionInterpolation,
}

impl RigidBody {
    pub fn dynamic(mass: f32) -> Self {
        Self {
            mass,
            linear_damping: 0.0,
            velocity: Vec3A::ZERO,
            kinematic: false,
            collision_fidelity: Default::default(),
            interpolation: Default::default(),
        }
    }

    /// A body driven by pose, not by forces. Used for follow anchors.
    pub fn kinematic() -> Self {
        Self {
            mass: 0.0,
            linear_damping: 0.0,
            velocity: Vec3A::ZERO,
            kinematic: true,
            collision_fidelity: Default::default(),
            interpolation: Default::default(),
        }
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            linear_damping: self.linear_damping,
            collision_fidelity: self.collision_fidelity,
            interpolation: self.interpolation,
        }
    }

    pub fn restore(&mut self, snapshot: BodySnapshot) {
        self.linear_damping = snapshot.linear_damping;
        self.collision_fidelity = snapshot.collision_fidelity;
        self.interpolation = snapshot.interpolation;
    }

    pub fn apply_impulse(&mut self, impulse: Vec3A) {
        if self.mass > f32::EPSILON {
            self.velocity += impulse / self.mass;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintId(pub usize);

/// A breakable rigid joint pinning a body to an anchor.
#[derive(Debug, Clone, Copy)]
pub struct FixedConstraint {
    pub body: NodeId,
    pub anchor: NodeId,
    pub break_force: f32,
    pub break_torque: f32,
}

impl Scene {
    pub fn add_constraint(
        &mut self,
        body: NodeId,
        anchor: NodeId,
        break_force: f32,
        break_torque: f32,
    ) -> ConstraintId {
        let id = ConstraintId(self.next_constraint);
        self.next_constraint += 1;
        self.constraints.insert(
            id,
            FixedConstraint {
                body,
                anchor,
                break_force,
                break_torque,
            },
        );
        id
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> bool {
        self.constraints.remove(&id).is_some()
    }

    /// Host-side outcome hook: the physics step (or an external solver)
    /// decided the joint gave way.
    pub fn sever_constraint(&mut self, id: ConstraintId) {
        if self.constraints.remove(&id).is_some() {
            log::info!("constraint {} severed", id.0);
        }
    }

    pub fn constraint_intact(&self, id: ConstraintId) -> bool {
        self.constraints.contains_key(&id)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &FixedConstraint)> {
        self.constraints.iter().map(|(id, c)| (*id, c))
    }

    /// Minimal integration pass. Constrained bodies snap to their anchor
    /// unless the implied force exceeds the joint's break threshold; free
    /// dynamic bodies fall under gravity with linear damping. Kinematic
    /// bodies only move when something sets their pose.
    pub fn step(&mut self, dt: f32) {
        if dt <= f32::EPSILON {
            return;
        }

        let ids: Vec<ConstraintId> = self.constraints.keys().copied().collect();
        let mut pinned: Vec<NodeId> = Vec::new();

        for id in ids {
            let Some(constraint) = self.constraints.get(&id).copied() else {
                continue;
            };
            let Some(anchor_pos) = self.get(constraint.anchor).map(|n| n.transform.translation)
            else {
                log::warn!("constraint {}: anchor node does not exist", id.0);
                self.constraints.remove(&id);
                continue;
            };
            let Some(node) = self.get_mut(constraint.body) else {
                log::warn!("constraint {}: body node does not exist", id.0);
                self.constraints.remove(&id);
                continue;
            };
            let position = node.transform.translation;
            let Some(body) = node.body.as_mut() else {
                log::warn!("constraint {}: body node has no physics body", id.0);
                self.constraints.remove(&id);
                continue;
            };

            let delta = anchor_pos - position;
            let force = body.mass * delta.length() / (dt * dt);
            if force > constraint.break_force {
                log::info!(
                    "constraint {} broke under load ({:.0} > {:.0})",
                    id.0,
                    force,
                    constraint.break_force
                );
                self.constraints.remove(&id);
                continue;
            }

            body.velocity = delta / dt;
            node.transform.translation = anchor_pos;
            pinned.push(constraint.body);
        }

        let gravity = self.gravity;
        for node in self.nodes_mut() {
            let id = node.id;
            let Some(body) = node.body.as_mut() else {
                continue;
            };
            if body.kinematic || pinned.contains(&id) {
                continue;
            }
            body.velocity += gravity * dt;
            body.velocity *= 1.0 / (1.0 + body.linear_damping * dt);
            node.transform.translation += body.velocity * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;
    use glam::Affine3A;

    fn dynamic_node(scene: &mut Scene, name: &str, pos: Vec3A, mass: f32) -> NodeId {
        let mut node = SceneNode::named(name);
        node.transform = Affine3A::from_translation(pos.into());
        node.body = Some(RigidBody::dynamic(mass));
        scene.spawn(node)
    }

    #[test]
    fn impulse_scales_by_mass() {
        let mut body = RigidBody::dynamic(2.0);
        body.apply_impulse(Vec3A::new(0.0, 0.0, -10.0));
        assert_eq!(body.velocity, Vec3A::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn free_bodies_fall_and_damp() {
        let mut scene = Scene::new();
        let id = dynamic_node(&mut scene, "rock", Vec3A::new(0.0, 10.0, 0.0), 1.0);
        scene.step(0.1);
        let node = scene.get(id).unwrap();
        assert!(node.transform.translation.y < 10.0);
        assert!(node.body.as_ref().unwrap().velocity.y < 0.0);
    }

    #[test]
    fn kinematic_bodies_do_not_integrate() {
        let mut scene = Scene::new();
        let mut node = SceneNode::named("anchor");
        node.transform = Affine3A::from_translation(glam::Vec3::new(0.0, 2.0, 0.0));
        node.body = Some(RigidBody::kinematic());
        let id = scene.spawn(node);
        scene.step(0.1);
        assert_eq!(
            scene.get(id).unwrap().transform.translation,
            Vec3A::new(0.0, 2.0, 0.0)
        );
    }

    #[test]
    fn constrained_body_follows_anchor() {
        let mut scene = Scene::new();
        let body = dynamic_node(&mut scene, "rock", Vec3A::ZERO, 1.0);
        let mut anchor = SceneNode::named("anchor");
        anchor.transform = Affine3A::from_translation(glam::Vec3::new(0.0, 2.0, 0.0));
        anchor.body = Some(RigidBody::kinematic());
        let anchor = scene.spawn(anchor);

        let id = scene.add_constraint(body, anchor, 1.0e6, 1.0e6);
        scene.step(0.1);

        assert!(scene.constraint_intact(id));
        assert_eq!(
            scene.get(body).unwrap().transform.translation,
            Vec3A::new(0.0, 2.0, 0.0)
        );
    }

    #[test]
    fn constraint_severs_past_break_force() {
        let mut scene = Scene::new();
        let body = dynamic_node(&mut scene, "rock", Vec3A::ZERO, 1.0);
        let mut anchor = SceneNode::named("anchor");
        anchor.transform = Affine3A::from_translation(glam::Vec3::new(0.0, 100.0, 0.0));
        anchor.body = Some(RigidBody::kinematic());
        let anchor = scene.spawn(anchor);

        // 100m of separation over one 0.1s step wants far more than 50N
        let id = scene.add_constraint(body, anchor, 50.0, 50.0);
        scene.step(0.1);

        assert!(!scene.constraint_intact(id));
        // the body was not teleported to the anchor
        assert!(scene.get(body).unwrap().transform.translation.y < 1.0);
    }

    #[test]
    fn constraint_with_despawned_endpoint_is_dropped() {
        let mut scene = Scene::new();
        let body = dynamic_node(&mut scene, "rock", Vec3A::ZERO, 1.0);
        let anchor = dynamic_node(&mut scene, "anchor", Vec3A::ONE, 1.0);
        let id = scene.add_constraint(body, anchor, 1.0e6, 1.0e6);

        scene.despawn(anchor);
        scene.step(0.1);
        assert!(!scene.constraint_intact(id));
    }
}
