use smallvec::SmallVec;

use crate::config::InteractionConfig;
use crate::scene::{raycast::Ray, NodeId, Scene};

/// Ancestry walks stop here even if parent links somehow go deeper.
pub const MAX_ANCESTRY_DEPTH: usize = 64;

/// A resolved grab target: the root node plus the ordered surface set
/// beneath it, ready for the highlight diff.
#[derive(Debug, Clone)]
pub struct Target {
    pub root: NodeId,
    pub surfaces: SmallVec<[NodeId; 8]>,
}

/// Cast the targeting ray and walk up from the struck node to the
/// grabbable root. Pure query; no scene mutation.
pub fn resolve(scene: &Scene, ray: Ray, config: &InteractionConfig) -> Option<Target> {
    let hit = scene.raycast(ray, config.max_grab_distance, config.grab_layers)?;

    let root = if config.require_tag {
        tagged_root(scene, hit.node, &config.grabbable_tag)?
    } else {
        owning_body_root(scene, hit.node)
    };

    Some(Target {
        root,
        surfaces: scene.collect_surfaces(root),
    })
}

/// Nearest ancestor (including `from` itself) carrying the tag.
fn tagged_root(scene: &Scene, from: NodeId, tag: &str) -> Option<NodeId> {
    let mut current = Some(from);
    for _ in 0..MAX_ANCESTRY_DEPTH {
        let node = scene.get(current?)?;
        if node.tag.as_deref() == Some(tag) {
            return Some(node.id);
        }
        current = node.parent;
    }
    None
}

/// Tag-less policy: the nearest ancestor owning a physics body, or the
/// struck node itself when nothing above it has one.
fn owning_body_root(scene: &Scene, from: NodeId) -> NodeId {
    let mut current = Some(from);
    for _ in 0..MAX_ANCESTRY_DEPTH {
        let Some(node) = current.and_then(|id| scene.get(id)) else {
            break;
        };
        if node.body.is_some() {
            return node.id;
        }
        current = node.parent;
    }
    from
}
