use std::sync::Arc;

use glam::{Affine3A, Vec3A};
use once_cell::sync::Lazy;

use crate::config::InteractionConfig;
use crate::scene::{
    body::{BodySnapshot, CollisionFidelity, ConstraintId, MotionInterpolation, RigidBody},
    NodeId, Scene, SceneNode,
};

use super::highlight::HighlightTracker;

pub static HOLD_ANCHOR_NAME: Lazy<Arc<str>> = Lazy::new(|| Arc::from("hold-anchor"));

#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("grab target no longer exists")]
    TargetGone,
    #[error("grab target has no physics body")]
    NoBody,
}

/// Everything a hold owns: the held body, its follow anchor, the joint
/// between them, and the body properties to put back on release. Only
/// exists while mode is Holding.
#[derive(Debug)]
pub struct HoldState {
    held: NodeId,
    anchor: NodeId,
    constraint: ConstraintId,
    original: BodySnapshot,
}

pub fn anchor_position(viewpoint: &Affine3A, hold_distance: f32) -> Vec3A {
    viewpoint.translation + viewpoint.transform_vector3a(Vec3A::NEG_Z) * hold_distance
}

impl HoldState {
    /// Take hold of `root`: tune its body for being puppeted, spawn the
    /// kinematic follow anchor, join the two with a breakable constraint.
    /// Highlights the held surfaces if nothing is highlighted yet.
    pub fn begin(
        scene: &mut Scene,
        highlight: &mut HighlightTracker,
        config: &InteractionConfig,
        viewpoint: &Affine3A,
        root: NodeId,
    ) -> Result<Self, GrabError> {
        if scene.get(root).is_none() {
            return Err(GrabError::TargetGone);
        }
        let held = body_bearer(scene, root).ok_or(GrabError::NoBody)?;

        let Some(node) = scene.get_mut(held) else {
            return Err(GrabError::TargetGone);
        };
        let Some(body) = node.body.as_mut() else {
            return Err(GrabError::NoBody);
        };

        let original = body.snapshot();
        body.interpolation = MotionInterpolation::Interpolate;
        body.collision_fidelity = CollisionFidelity::Continuous;
        body.linear_damping = config.held_drag;
        let name = node.name.clone();

        let mut anchor_node = SceneNode::named(HOLD_ANCHOR_NAME.clone());
        anchor_node.transform =
            Affine3A::from_translation(anchor_position(viewpoint, config.hold_distance).into());
        anchor_node.body = Some(RigidBody::kinematic());
        let anchor = scene.spawn(anchor_node);

        let constraint = scene.add_constraint(held, anchor, config.break_force, config.break_torque);

        if highlight.is_empty() {
            let surfaces = scene.collect_surfaces(held);
            highlight.apply_if_changed(scene, &surfaces);
        }

        log::info!("grabbed {}", name);
        Ok(Self {
            held,
            anchor,
            constraint,
            original,
        })
    }

    pub fn held(&self) -> NodeId {
        self.held
    }

    /// False once the joint broke under load, or either endpoint was
    /// destroyed externally. Checked lazily each step.
    pub fn intact(&self, scene: &Scene) -> bool {
        scene.constraint_intact(self.constraint)
            && scene.get(self.anchor).is_some()
            && scene.get(self.held).is_some()
    }

    /// The only per-step mutation while holding: keep the anchor at the
    /// hold distance in front of the viewpoint.
    pub fn update_anchor(&self, scene: &mut Scene, viewpoint: &Affine3A, config: &InteractionConfig) {
        if let Some(node) = scene.get_mut(self.anchor) {
            node.transform.translation = anchor_position(viewpoint, config.hold_distance);
        }
    }

    /// Unwind the hold: drop joint and anchor, restore the body's
    /// captured properties, optionally throw, clear highlights. Every
    /// part tolerates having already been destroyed externally.
    pub fn release(
        self,
        scene: &mut Scene,
        highlight: &mut HighlightTracker,
        config: &InteractionConfig,
        viewpoint: &Affine3A,
        throw: bool,
    ) {
        scene.remove_constraint(self.constraint);
        scene.despawn(self.anchor);

        if let Some(node) = scene.get_mut(self.held) {
            if let Some(body) = node.body.as_mut() {
                body.restore(self.original);
                if throw {
                    let forward = viewpoint.transform_vector3a(Vec3A::NEG_Z);
                    body.apply_impulse(forward * config.throw_force);
                }
            }
            log::info!("dropped {}", node.name);
        } else {
            log::warn!("held object does not exist anymore");
        }

        highlight.clear_all(scene);
    }
}

/// The node actually carrying the physics body: the root itself, or the
/// first body-bearing node in its subtree.
fn body_bearer(scene: &Scene, root: NodeId) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = vec![root];
    while let Some(id) = stack.pop() {
        let Some(node) = scene.get(id) else { continue };
        if node.body.is_some() {
            return Some(id);
        }
        let mut kids = scene.children(id);
        kids.reverse();
        stack.extend(kids);
    }
    None
}
