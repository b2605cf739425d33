use glam::Vec3;

use crate::splat::Position;


/// Ray in the store's native axis convention. `direction` must be unit
/// length for hit distances to be meaningful.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// Distance along the ray to the splat's perpendicular foot.
    pub distance: f32,
    /// The splat position that was hit.
    pub point: Vec3,
}


/// Every splat within `threshold` of the ray, in front of its origin, sorted
/// nearest first. Point-against-ray only; splat extent is ignored.
pub fn raycast_positions(
    positions: &[Position],
    ray: &Ray,
    threshold: f32,
) -> Vec<RaycastHit> {
    let threshold_squared = threshold * threshold;
    let mut hits = Vec::new();

    for point in positions {
        let point = Vec3::from_array(*point);
        let along = (point - ray.origin).dot(ray.direction);

        if along <= 0.0 {
            continue;
        }

        let foot = ray.origin + ray.direction * along;
        if point.distance_squared(foot) < threshold_squared {
            hits.push(RaycastHit {
                distance: along,
                point,
            });
        }
    }

    hits.sort_unstable_by(|a, b| a.distance.total_cmp(&b.distance));

    hits
}
