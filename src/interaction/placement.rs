use std::sync::Arc;

use glam::{Affine3A, Vec3A};

use crate::catalog::ItemCatalog;
use crate::config::InteractionConfig;
use crate::inventory::Inventory;
use crate::scene::{raycast::Ray, MaterialId, NodeId, Scene};

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("no spawnable prototype for item {0}")]
    UnknownItem(Arc<str>),
}

/// The placement session: which item is selected and the preview node
/// standing in for it. Only exists while mode is Placing; the preview
/// dies with it, confirm or not.
pub struct PlacementState {
    item_id: Arc<str>,
    preview: NodeId,
    visible: bool,
}

impl PlacementState {
    /// Spawn the preview: a clone of the item's spawnable form with its
    /// body stripped, colliders disabled, and every material slot set to
    /// the translucent preview material. Hidden until the cursor finds a
    /// surface.
    pub fn begin(
        scene: &mut Scene,
        catalog: &dyn ItemCatalog,
        preview_material: MaterialId,
        item_id: Arc<str>,
    ) -> Result<Self, PlacementError> {
        let Some(proto) = catalog.prototype(&item_id) else {
            return Err(PlacementError::UnknownItem(item_id));
        };

        let preview = scene.instantiate(proto, Affine3A::IDENTITY);
        let node = scene.get_mut(preview).unwrap(); // just spawned above
        node.body = None;
        if let Some(collider) = node.collider.as_mut() {
            collider.enabled = false;
        }
        if let Some(mesh) = node.mesh.as_mut() {
            for slot in mesh.materials.iter_mut() {
                *slot = preview_material;
            }
            mesh.enabled = false;
        }

        log::info!("placement preview ready for {}", item_id);
        Ok(Self {
            item_id,
            preview,
            visible: false,
        })
    }

    pub fn item_id(&self) -> &Arc<str> {
        &self.item_id
    }

    pub fn preview(&self) -> NodeId {
        self.preview
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Follow the cursor: snap the preview onto the nearest placement
    /// surface, lifted by its own half-height so it rests flush, or hide
    /// it when the ray finds nothing. A hidden preview's pose is left
    /// untouched.
    pub fn update(&mut self, scene: &mut Scene, cursor_ray: Ray, config: &InteractionConfig) {
        let hit = scene.raycast(cursor_ray, config.placement_distance, config.placement_layers);

        let Some(node) = scene.get_mut(self.preview) else {
            log::warn!("placement preview does not exist anymore");
            self.visible = false;
            return;
        };

        match hit {
            Some(hit) => {
                let half_height = node
                    .collider
                    .as_ref()
                    .map(|c| c.shape.half_height())
                    .unwrap_or(0.0);
                node.transform.translation = hit.point + Vec3A::Y * half_height;
                if let Some(mesh) = node.mesh.as_mut() {
                    mesh.enabled = true;
                }
                self.visible = true;
            }
            None => {
                if let Some(mesh) = node.mesh.as_mut() {
                    mesh.enabled = false;
                }
                self.visible = false;
            }
        }
    }

    /// Spawn the real thing at the preview's pose, if the preview is on
    /// a surface and the ledger agrees to part with one unit. The debit
    /// happens first and gets the final say.
    pub fn confirm(
        &self,
        scene: &mut Scene,
        catalog: &dyn ItemCatalog,
        inventory: &mut dyn Inventory,
    ) -> bool {
        if !self.visible {
            return false;
        }
        let Some(pose) = scene.get(self.preview).map(|n| n.transform) else {
            log::warn!("placement preview does not exist anymore");
            return false;
        };
        let Some(proto) = catalog.prototype(&self.item_id) else {
            log::warn!("no spawnable prototype for item {}", self.item_id);
            return false;
        };
        if !inventory.has_quantity(&self.item_id, 1) {
            log::debug!("not enough {} to place", self.item_id);
            return false;
        }
        if !inventory.debit(&self.item_id, 1) {
            return false;
        }

        let id = scene.instantiate(proto, pose);
        log::info!("placed {} as node {}", self.item_id, id.0);
        true
    }

    /// Destroy the preview unconditionally and end the session.
    pub fn cancel(self, scene: &mut Scene) {
        if scene.despawn(self.preview) {
            log::info!("placement ended for {}", self.item_id);
        }
    }
}
