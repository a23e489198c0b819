#![warn(clippy::all)]

//! Attribute storage and access for point cloud geometry
//!
//! Geoset stores the per-point data of a point cloud as named, typed attributes. Some attributes are builtin (like the
//! `position` of each point), others are created at runtime. Both kinds are read and written through the same
//! [accessors](crate::attributes::AttributeAccessor), which geometry components hand out on demand. Components keep
//! track of whether they own their data, so that geometry can be shared cheaply and is only copied when it is written
//! to. The best way to get started is to look at the [PointCloudComponent](crate::geometry::PointCloudComponent) type
//! and the [attributes](crate::attributes) module.

pub extern crate nalgebra;

pub mod attributes;
pub mod geometry;
/// Useful mathematical tools when working with point cloud data
pub mod math;

#[cfg(test)]
pub(crate) mod test_utils;
