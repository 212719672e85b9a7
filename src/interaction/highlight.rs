use smallvec::SmallVec;

use crate::scene::{MaterialId, NodeId, Scene};

struct HighlightRecord {
    surface: NodeId,
    originals: SmallVec<[MaterialId; 4]>,
}

/// Tracks which surfaces currently wear the shared highlight material,
/// keeping their original materials for restoration. Surfaces are
/// tracked by node identity, never by material value: two surfaces with
/// identical materials still get their own records.
pub struct HighlightTracker {
    highlight: MaterialId,
    current: Vec<NodeId>,
    records: Vec<HighlightRecord>,
}

impl HighlightTracker {
    pub fn new(highlight: MaterialId) -> Self {
        Self {
            highlight,
            current: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn highlighted(&self) -> &[NodeId] {
        &self.current
    }

    /// Swap the highlight onto `surfaces`, but only when the set differs
    /// from what is already highlighted. The diff is an order-sensitive
    /// identity comparison, so a stable target costs nothing per step.
    /// Clears always run before applies.
    pub fn apply_if_changed(&mut self, scene: &mut Scene, surfaces: &[NodeId]) {
        if same_identity(&self.current, surfaces) {
            return;
        }
        self.clear_all(scene);
        if !surfaces.is_empty() {
            self.apply(scene, surfaces);
        }
    }

    fn apply(&mut self, scene: &mut Scene, surfaces: &[NodeId]) {
        for &surface in surfaces {
            let Some(node) = scene.get_mut(surface) else {
                continue;
            };
            let Some(mesh) = node.mesh.as_mut() else {
                continue;
            };
            self.records.push(HighlightRecord {
                surface,
                originals: mesh.materials.clone(),
            });
            for slot in mesh.materials.iter_mut() {
                *slot = self.highlight;
            }
        }
        self.current = surfaces.to_vec();
    }

    /// Restore every recorded surface and drop the records. Surfaces
    /// destroyed while highlighted are skipped silently. Safe to call
    /// with nothing highlighted.
    pub fn clear_all(&mut self, scene: &mut Scene) {
        for record in self.records.drain(..) {
            let Some(node) = scene.get_mut(record.surface) else {
                continue;
            };
            let Some(mesh) = node.mesh.as_mut() else {
                continue;
            };
            mesh.materials = record.originals;
        }
        self.current.clear();
    }
}

fn same_identity(a: &[NodeId], b: &[NodeId]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, MeshVisual, SceneNode};

    fn scene_with_surfaces() -> (Scene, MaterialId, MaterialId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let grey = scene.add_material(Material::solid("grey", [0.5, 0.5, 0.5, 1.0]));
        let glow = scene.add_material(Material::solid("glow", [0.2, 1.0, 0.2, 1.0]));

        let mut a = SceneNode::named("a");
        a.mesh = Some(MeshVisual::with_materials(&[grey, grey]));
        let a = scene.spawn(a);

        let mut b = SceneNode::named("b");
        b.mesh = Some(MeshVisual::with_materials(&[grey]));
        let b = scene.spawn(b);

        (scene, grey, glow, a, b)
    }

    fn materials_of(scene: &Scene, id: NodeId) -> Vec<MaterialId> {
        scene
            .get(id)
            .unwrap()
            .mesh
            .as_ref()
            .unwrap()
            .materials
            .to_vec()
    }

    #[test]
    fn apply_swaps_all_slots_and_clear_restores() {
        let (mut scene, grey, glow, a, b) = scene_with_surfaces();
        let mut tracker = HighlightTracker::new(glow);

        tracker.apply_if_changed(&mut scene, &[a, b]);
        assert_eq!(materials_of(&scene, a), vec![glow, glow]);
        assert_eq!(materials_of(&scene, b), vec![glow]);

        tracker.clear_all(&mut scene);
        assert_eq!(materials_of(&scene, a), vec![grey, grey]);
        assert_eq!(materials_of(&scene, b), vec![grey]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn same_sequence_is_a_no_op() {
        let (mut scene, _, glow, a, b) = scene_with_surfaces();
        let mut tracker = HighlightTracker::new(glow);

        tracker.apply_if_changed(&mut scene, &[a, b]);
        tracker.apply_if_changed(&mut scene, &[a, b]);

        // one record per surface, not two
        assert_eq!(tracker.records.len(), 2);
        // originals still restorable, so the second apply never captured
        // the already-swapped materials
        tracker.clear_all(&mut scene);
        assert_ne!(materials_of(&scene, a), vec![glow, glow]);
    }

    #[test]
    fn reordered_sequence_reapplies() {
        let (mut scene, _, glow, a, b) = scene_with_surfaces();
        let mut tracker = HighlightTracker::new(glow);

        tracker.apply_if_changed(&mut scene, &[a, b]);
        tracker.apply_if_changed(&mut scene, &[b, a]);
        assert_eq!(tracker.highlighted(), &[b, a]);
    }

    #[test]
    fn destroyed_surface_is_skipped_on_clear() {
        let (mut scene, grey, glow, a, b) = scene_with_surfaces();
        let mut tracker = HighlightTracker::new(glow);

        tracker.apply_if_changed(&mut scene, &[a, b]);
        scene.despawn(a);

        tracker.clear_all(&mut scene);
        assert!(tracker.is_empty());
        assert_eq!(materials_of(&scene, b), vec![grey]);
    }

    #[test]
    fn clear_with_nothing_highlighted_is_safe() {
        let (mut scene, _, glow, _, _) = scene_with_surfaces();
        let mut tracker = HighlightTracker::new(glow);
        tracker.clear_all(&mut scene);
        tracker.clear_all(&mut scene);
    }
}
