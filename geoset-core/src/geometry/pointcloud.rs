use nalgebra::Vector3;
use once_cell::sync::OnceCell;

use crate::attributes::{
    AttributeAccessor, AttributeArray, AttributeDataType, AttributeDescriptor, AttributeDomain,
    CustomData, MutableAttributeAccessor,
};
use crate::math::AABB;

use super::pointcloud_component::pointcloud_accessor_functions;
use super::GeometryBlock;

/// Builtin attribute for the position of each point
pub const POSITION: AttributeDescriptor<'static> = AttributeDescriptor::new(
    "position",
    AttributeDomain::Point,
    AttributeDataType::Float3,
    false,
);
/// Builtin attribute for the radius of each point
pub const RADIUS: AttributeDescriptor<'static> = AttributeDescriptor::new(
    "radius",
    AttributeDomain::Point,
    AttributeDataType::Float,
    true,
);
/// Builtin attribute for a stable identifier of each point
pub const ID: AttributeDescriptor<'static> =
    AttributeDescriptor::new("id", AttributeDomain::Point, AttributeDataType::Int32, true);

/// Names of all builtin point cloud attributes. Custom attributes can't use these names
pub const BUILTIN_ATTRIBUTE_NAMES: &[&str] = &[POSITION.name(), RADIUS.name(), ID.name()];

/// Derived data that is computed lazily and dropped whenever the data it is derived from changes
#[derive(Debug, Clone, Default)]
struct PointCloudRuntime {
    bounds: OnceCell<Option<AABB<f32>>>,
    bounds_with_radius: OnceCell<Option<AABB<f32>>>,
    positions_version: u64,
    radii_version: u64,
}

/// A set of points with a position each and an arbitrary number of further attributes on the point domain. All
/// attributes, builtin or not, are stored as layers of one [`CustomData`] table
#[derive(Debug, Clone)]
pub struct PointCloud {
    point_count: usize,
    point_data: CustomData,
    runtime: PointCloudRuntime,
}

impl PointCloud {
    /// Creates a new point cloud with `point_count` points. All positions are zero
    /// ```
    /// # use geoset_core::geometry::*;
    /// let pointcloud = PointCloud::new(8);
    /// assert_eq!(8, pointcloud.len());
    /// assert_eq!(8, pointcloud.positions().len());
    /// assert!(pointcloud.radii().is_none());
    /// ```
    pub fn new(point_count: usize) -> Self {
        let mut point_data = CustomData::new();
        point_data.insert_layer(
            POSITION.name(),
            AttributeArray::new(POSITION.data_type(), point_count),
        );
        Self {
            point_count,
            point_data,
            runtime: Default::default(),
        }
    }

    /// Creates a new point cloud from the given positions
    pub fn from_positions(positions: Vec<Vector3<f32>>) -> Self {
        let point_count = positions.len();
        let mut point_data = CustomData::new();
        point_data.insert_layer(POSITION.name(), AttributeArray::from_vec(positions));
        Self {
            point_count,
            point_data,
            runtime: Default::default(),
        }
    }

    /// Returns the number of points
    pub fn len(&self) -> usize {
        self.point_count
    }

    /// Returns `true` if there are no points
    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    /// Changes the number of points. Values of new points are zero
    pub fn resize(&mut self, point_count: usize) {
        self.point_data.resize(point_count);
        self.point_count = point_count;
        self.tag_positions_changed();
        self.tag_radii_changed();
    }

    /// The attribute storage of this point cloud
    pub fn point_data(&self) -> &CustomData {
        &self.point_data
    }

    pub(crate) fn point_data_mut(&mut self) -> &mut CustomData {
        &mut self.point_data
    }

    /// The positions of all points
    pub fn positions(&self) -> &[Vector3<f32>] {
        self.point_data
            .get_layer(POSITION.name())
            .and_then(|layer| layer.data().typed())
            .unwrap_or(&[])
    }

    /// Mutable access to the positions of all points. Tags the positions as changed
    pub fn positions_mut(&mut self) -> &mut [Vector3<f32>] {
        self.tag_positions_changed();
        match self.point_data.get_layer_mut(POSITION.name()) {
            Some(layer) => layer.data_mut().typed_mut().unwrap_or(&mut []),
            None => &mut [],
        }
    }

    /// The radii of all points, if the point cloud has radii
    pub fn radii(&self) -> Option<&[f32]> {
        self.point_data
            .get_layer(RADIUS.name())
            .and_then(|layer| layer.data().typed())
    }

    /// The identifiers of all points, if the point cloud has identifiers
    pub fn ids(&self) -> Option<&[i32]> {
        self.point_data
            .get_layer(ID.name())
            .and_then(|layer| layer.data().typed())
    }

    /// Returns the bounds of all positions, or `None` if there are no points. The bounds are cached until the
    /// positions change
    /// ```
    /// # use geoset_core::geometry::*;
    /// # use nalgebra::{Point3, Vector3};
    /// let mut pointcloud = PointCloud::from_positions(vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(-1.0, 0.0, 5.0)]);
    /// assert_eq!(Point3::new(-1.0, 0.0, 3.0), *pointcloud.bounds().unwrap().min());
    /// pointcloud.positions_mut()[0] = Vector3::new(10.0, 10.0, 10.0);
    /// assert_eq!(Point3::new(10.0, 10.0, 10.0), *pointcloud.bounds().unwrap().max());
    /// ```
    pub fn bounds(&self) -> Option<AABB<f32>> {
        *self
            .runtime
            .bounds
            .get_or_init(|| AABB::from_positions(self.positions()))
    }

    /// Returns the bounds of spheres around all positions with the radius of each point. Falls back to
    /// [`bounds`](PointCloud::bounds) if the point cloud has no radii
    pub fn bounds_with_radius(&self) -> Option<AABB<f32>> {
        *self
            .runtime
            .bounds_with_radius
            .get_or_init(|| match self.radii() {
                Some(radii) => AABB::from_positions_with_radii(self.positions(), radii),
                None => self.bounds(),
            })
    }

    /// Invalidates all data derived from the positions
    pub fn tag_positions_changed(&mut self) {
        self.runtime.positions_version += 1;
        self.runtime.bounds.take();
        self.runtime.bounds_with_radius.take();
    }

    /// Invalidates all data derived from the radii
    pub fn tag_radii_changed(&mut self) {
        self.runtime.radii_version += 1;
        self.runtime.bounds_with_radius.take();
    }

    /// Counts how often the positions were tagged as changed
    pub fn positions_version(&self) -> u64 {
        self.runtime.positions_version
    }

    /// Counts how often the radii were tagged as changed
    pub fn radii_version(&self) -> u64 {
        self.runtime.radii_version
    }

    /// Read access to the attributes of this point cloud
    pub fn attributes(&self) -> AttributeAccessor<'_, PointCloud> {
        AttributeAccessor::new(Some(self), pointcloud_accessor_functions())
    }

    /// Write access to the attributes of this point cloud
    pub fn attributes_for_write(&mut self) -> MutableAttributeAccessor<'_, PointCloud> {
        MutableAttributeAccessor::new(Some(self), pointcloud_accessor_functions())
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GeometryBlock for PointCloud {
    fn copy_for_eval(&self) -> Box<Self> {
        Box::new(self.clone())
    }
}
