use glam::{Affine3A, Vec3A};

use crate::scene::raycast::Ray;

/// Per-step action flags, sampled by the host from whatever input backend
/// it uses. Edge detection happens against the previous step's copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionState {
    /// Pick up the targeted object. Only honored while idle.
    pub grab: bool,
    /// Drop the held object. Only honored while holding. Hosts are free
    /// to bind this to the same key as `grab`.
    pub release: bool,
    /// Confirm a placement.
    pub place: bool,
    /// Leave placement mode.
    pub cancel: bool,
}

pub struct InputState {
    /// World pose of the viewpoint. Forward is -Z, as with a camera.
    pub viewpoint: Affine3A,
    /// Screen-cursor ray used by placement. Distinct from the
    /// viewpoint-forward ray used for targeting.
    pub cursor_ray: Ray,
    pub now: ActionState,
    pub before: ActionState,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            viewpoint: Affine3A::IDENTITY,
            cursor_ray: Ray::new(Vec3A::ZERO, Vec3A::NEG_Z),
            now: Default::default(),
            before: Default::default(),
        }
    }

    pub fn pre_update(&mut self) {
        self.before = self.now;
    }

    pub fn grab_pressed(&self) -> bool {
        self.now.grab && !self.before.grab
    }

    pub fn release_pressed(&self) -> bool {
        self.now.release && !self.before.release
    }

    pub fn place_pressed(&self) -> bool {
        self.now.place && !self.before.place
    }

    pub fn cancel_pressed(&self) -> bool {
        self.now.cancel && !self.before.cancel
    }

    pub fn forward(&self) -> Vec3A {
        self.viewpoint.transform_vector3a(Vec3A::NEG_Z)
    }

    pub fn forward_ray(&self) -> Ray {
        Ray::new(self.viewpoint.translation, self.forward())
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
