//! Ray queries against scene colliders.
//!
//! A single nearest-hit query drives both targeting (viewpoint-forward
//! ray) and placement (cursor ray). Hits carry the struck node, the
//! world-space contact point and surface normal.

use glam::Vec3A;
use smallvec::{smallvec, SmallVec};

use super::{ColliderShape, NodeId, Scene};

const EPS: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3A,
    pub dir: Vec3A,
}

impl Ray {
    /// `dir` must be non-zero; it is normalized here.
    pub fn new(origin: Vec3A, dir: Vec3A) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub node: NodeId,
    pub point: Vec3A,
    pub normal: Vec3A,
    pub dist: f32,
}

/// Ray vs. sphere, returning the nearest positive distance.
///
/// With a normalized direction the quadratic reduces to
/// `t^2 + 2t(oc.d) + (oc.oc - r^2) = 0`.
fn ray_sphere(origin: Vec3A, dir: Vec3A, center: Vec3A, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_disc = discriminant.sqrt();

    let t1 = -b - sqrt_disc;
    let t2 = -b + sqrt_disc;
    if t1 > EPS {
        Some(t1)
    } else if t2 > EPS {
        Some(t2)
    } else {
        // both intersections are behind us
        None
    }
}

/// Ray vs. axis-aligned box in the box's local space. Returns distance
/// and the local-space face normal. Origins inside the box don't count
/// as a hit; there is no surface to land on from in there.
fn ray_cuboid(origin: Vec3A, dir: Vec3A, half_extents: Vec3A) -> Option<(f32, Vec3A)> {
    let inv = dir.recip();
    let t_lo = (-half_extents - origin) * inv;
    let t_hi = (half_extents - origin) * inv;

    let t_near = t_lo.min(t_hi);
    let t_far = t_lo.max(t_hi);

    let tmin = t_near.max_element();
    let tmax = t_far.min_element();

    if tmax < tmin || tmax < EPS || tmin < EPS {
        return None;
    }

    let normal = if tmin == t_near.x {
        Vec3A::X * -dir.x.signum()
    } else if tmin == t_near.y {
        Vec3A::Y * -dir.y.signum()
    } else {
        Vec3A::Z * -dir.z.signum()
    };

    Some((tmin, normal))
}

impl Scene {
    /// Nearest intersection of `ray` with an enabled collider whose node
    /// matches `mask`, within `max_dist`.
    pub fn raycast(&self, ray: Ray, max_dist: f32, mask: u32) -> Option<RayHit> {
        let mut hits: SmallVec<[RayHit; 8]> = smallvec![];

        for node in self.nodes() {
            let Some(collider) = node.collider.as_ref() else {
                continue;
            };
            if !collider.enabled || node.layers & mask == 0 {
                continue;
            }

            let hit = match collider.shape {
                ColliderShape::Sphere { radius } => {
                    let center = node.transform.translation;
                    ray_sphere(ray.origin, ray.dir, center, radius).map(|t| {
                        let point = ray.origin + ray.dir * t;
                        let normal = (point - center).try_normalize().unwrap_or(Vec3A::Y);
                        RayHit {
                            node: node.id,
                            point,
                            normal,
                            dist: t,
                        }
                    })
                }
                ColliderShape::Cuboid { half_extents } => {
                    let to_local = node.transform.inverse();
                    let local_origin = to_local.transform_point3a(ray.origin);
                    let local_dir = to_local.transform_vector3a(ray.dir);
                    ray_cuboid(local_origin, local_dir, half_extents).map(|(t, local_normal)| {
                        RayHit {
                            node: node.id,
                            point: ray.origin + ray.dir * t,
                            normal: node.transform.transform_vector3a(local_normal),
                            dist: t,
                        }
                    })
                }
            };

            if let Some(hit) = hit {
                if hit.dist.is_finite() && hit.dist <= max_dist {
                    hits.push(hit);
                }
            }
        }

        hits.sort_by(|a, b| a.dist.total_cmp(&b.dist));
        hits.into_iter().next()
    }
}
