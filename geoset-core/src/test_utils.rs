use nalgebra::Vector3;
use rand::distributions::Uniform;
use rand::prelude::Distribution;
use rand::Rng;

use crate::attributes::AttributeArray;
use crate::geometry::{PointCloud, ID, RADIUS};

/// Samples positions uniformly from the cube [-extent, extent]^3
pub(crate) struct CubeDistribution {
    coordinate: Uniform<f32>,
}

impl CubeDistribution {
    pub(crate) fn new(extent: f32) -> Self {
        Self {
            coordinate: Uniform::new_inclusive(-extent, extent),
        }
    }
}

impl Distribution<Vector3<f32>> for CubeDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f32> {
        Vector3::new(
            self.coordinate.sample(rng),
            self.coordinate.sample(rng),
            self.coordinate.sample(rng),
        )
    }
}

/// Creates a point cloud with `point_count` random positions, random radii and sequential ids
pub(crate) fn random_pointcloud<R: Rng>(rng: &mut R, point_count: usize) -> PointCloud {
    let positions = CubeDistribution::new(100.0)
        .sample_iter(&mut *rng)
        .take(point_count)
        .collect::<Vec<_>>();
    let radii = (0..point_count)
        .map(|_| rng.gen_range(0.01..1.0))
        .collect::<Vec<f32>>();
    let ids = (0..point_count as i32).collect::<Vec<_>>();

    let mut pointcloud = PointCloud::from_positions(positions);
    let point_data = pointcloud.point_data_mut();
    point_data.insert_layer(RADIUS.name(), AttributeArray::from_vec(radii));
    point_data.insert_layer(ID.name(), AttributeArray::from_vec(ids));
    pointcloud
}
