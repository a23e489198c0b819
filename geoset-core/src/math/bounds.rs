use nalgebra::{ClosedSub, Point3, Scalar, Vector3};
use rayon::prelude::*;

/// Positions are split into chunks of this size when computing bounds in parallel
const PARALLEL_CHUNK_SIZE: usize = 16 * 1024;

/// 3D axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB<T: Scalar + PartialOrd> {
    min: Point3<T>,
    max: Point3<T>,
}

impl<T: Scalar + ClosedSub + PartialOrd + Copy> AABB<T> {
    /// Creates a new AABB from the given minimum and maximum coordinates. Panics if the minimum position is
    /// not less than or equal to the maximum position
    /// ```
    /// # use geoset_core::math::AABB;
    /// let bounds = AABB::from_min_max(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 1.0, 1.0));
    /// ```
    pub fn from_min_max(min: Point3<T>, max: Point3<T>) -> Self {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            panic!("AABB::from_min_max: Minimum position must be <= maximum position!");
        }
        Self { min, max }
    }

    /// Creates a new AABB from the given minimum and maximum coordinates. Similar to [from_min_max](AABB::from_min_max)
    /// but performs no checks that min <= max
    pub fn from_min_max_unchecked(min: Point3<T>, max: Point3<T>) -> Self {
        Self { min, max }
    }

    /// Creates an AABB that contains only the given point
    pub fn from_point(point: Point3<T>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates the smallest AABB that contains all of the given points. Returns `None` if there are no points
    /// ```
    /// # use geoset_core::math::AABB;
    /// # use nalgebra::Point3;
    /// let bounds = AABB::from_points(vec![Point3::new(1.0, -1.0, 0.0), Point3::new(-1.0, 2.0, 0.5)]).unwrap();
    /// assert_eq!(Point3::new(-1.0, -1.0, 0.0), *bounds.min());
    /// assert_eq!(Point3::new(1.0, 2.0, 0.5), *bounds.max());
    /// assert!(AABB::<f32>::from_points(vec![]).is_none());
    /// ```
    pub fn from_points<I: IntoIterator<Item = Point3<T>>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_point(first), |bounds, point| {
            Self::extend_with_point(&bounds, &point)
        }))
    }

    /// Returns the minimum point of this AABB
    pub fn min(&self) -> &Point3<T> {
        &self.min
    }

    /// Returns the maximum point of this AABB
    pub fn max(&self) -> &Point3<T> {
        &self.max
    }

    /// Returns the extent of this AABB. The extent is the size between the minimum and maximum position of this AABB
    /// ```
    /// # use geoset_core::math::AABB;
    /// let bounds = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 1.0, 1.0));
    /// assert_eq!(bounds.extent(), nalgebra::Vector3::new(1.0, 1.0, 1.0));
    /// ```
    pub fn extent(&self) -> Vector3<T> {
        self.max - self.min
    }

    /// Performs an intersection test between this AABB and the given AABB. Returns true if the two
    /// bounding boxes intersect. If one of the boxes is fully contained within the other, this also
    /// counts as an intersection
    pub fn intersects(&self, other: &AABB<T>) -> bool {
        (self.min.x <= other.max.x && self.max.x >= other.min.x)
            && (self.min.y <= other.max.y && self.max.y >= other.min.y)
            && (self.min.z <= other.max.z && self.max.z >= other.min.z)
    }

    /// Returns true if the given point is contained within this AABB. Points right on the boundary
    /// of this AABB count as contained
    /// ```
    /// # use geoset_core::math::AABB;
    /// let bounds = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 1.0, 1.0));
    /// assert!(bounds.contains(&nalgebra::Point3::new(0.5, 0.5, 1.0)));
    /// assert!(!bounds.contains(&nalgebra::Point3::new(0.5, 1.5, 0.5)));
    /// ```
    pub fn contains(&self, point: &Point3<T>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Computes the union of the given bounding boxes, which is the smallest AABB that fully contains both a and b
    /// ```
    /// # use geoset_core::math::AABB;
    /// let bounds_a = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 1.0, 1.0));
    /// let bounds_b = AABB::from_min_max_unchecked(nalgebra::Point3::new(2.0, 2.0, 2.0), nalgebra::Point3::new(3.0, 3.0, 3.0));
    /// let merged_bounds = AABB::union(&bounds_a, &bounds_b);
    /// assert_eq!(*merged_bounds.min(), nalgebra::Point3::new(0.0, 0.0, 0.0));
    /// assert_eq!(*merged_bounds.max(), nalgebra::Point3::new(3.0, 3.0, 3.0));
    /// ```
    pub fn union(a: &AABB<T>, b: &AABB<T>) -> Self {
        Self {
            min: Point3::new(
                partial_min(a.min.x, b.min.x),
                partial_min(a.min.y, b.min.y),
                partial_min(a.min.z, b.min.z),
            ),
            max: Point3::new(
                partial_max(a.max.x, b.max.x),
                partial_max(a.max.y, b.max.y),
                partial_max(a.max.z, b.max.z),
            ),
        }
    }

    /// Extends the given AABB so that it contains the given point
    pub fn extend_with_point(bounds: &AABB<T>, point: &Point3<T>) -> AABB<T> {
        Self::union(bounds, &Self::from_point(*point))
    }
}

impl AABB<f32> {
    /// Creates the bounds of a sphere with the given `center` and `radius`. Negative radii are treated like their
    /// absolute value
    pub fn from_sphere(center: Point3<f32>, radius: f32) -> Self {
        let radius = Vector3::repeat(radius.abs());
        Self {
            min: center - radius,
            max: center + radius,
        }
    }

    /// Computes the bounds of all `positions` in parallel. Returns `None` if there are no positions
    pub fn from_positions(positions: &[Vector3<f32>]) -> Option<Self> {
        positions
            .par_chunks(PARALLEL_CHUNK_SIZE)
            .filter_map(|chunk| Self::from_points(chunk.iter().map(|position| Point3::from(*position))))
            .reduce_with(|a, b| Self::union(&a, &b))
    }

    /// Computes the bounds of spheres around all `positions` in parallel, where every position has the radius at the
    /// same index in `radii`. Returns `None` if there are no positions
    pub fn from_positions_with_radii(positions: &[Vector3<f32>], radii: &[f32]) -> Option<Self> {
        debug_assert_eq!(positions.len(), radii.len());
        positions
            .par_chunks(PARALLEL_CHUNK_SIZE)
            .zip(radii.par_chunks(PARALLEL_CHUNK_SIZE))
            .filter_map(|(positions, radii)| {
                positions
                    .iter()
                    .zip(radii)
                    .map(|(position, radius)| Self::from_sphere(Point3::from(*position), *radius))
                    .reduce(|a, b| Self::union(&a, &b))
            })
            .reduce_with(|a, b| Self::union(&a, &b))
    }
}

fn partial_min<T: PartialOrd>(a: T, b: T) -> T {
    if a < b {
        a
    } else {
        b
    }
}

fn partial_max<T: PartialOrd>(a: T, b: T) -> T {
    if a > b {
        a
    } else {
        b
    }
}
