use glam::{Vec3, Vec4};
use rand::{
    prelude::Distribution,
    Rng,
};

use crate::splat::{
    covariance::compute_covariance_3d,
    Splat,
    SplatTileData,
};


impl Distribution<Splat> for rand::distributions::Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Splat {
        let rotation = Vec4::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let scale = Vec3::new(
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
        );
        let (covariance_a, covariance_b) = compute_covariance_3d(rotation, scale);

        Splat {
            position: [
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
            ],
            color: [
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..0.8),
            ],
            covariance_a,
            covariance_b,
        }
    }
}

pub fn random_splats(n: usize) -> SplatTileData {
    let mut rng = rand::thread_rng();
    let mut splats: Vec<Splat> = Vec::with_capacity(n);

    for _ in 0..n {
        splats.push(rng.r#gen());
    }

    SplatTileData::from_splats(&splats)
}
