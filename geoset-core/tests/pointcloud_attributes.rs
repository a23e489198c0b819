use std::sync::Arc;

use anyhow::Result;
use geoset_core::attributes::{
    AttributeArray, AttributeDataType, AttributeDomain, AttributeInit, AttributeValue, GVArray,
};
use geoset_core::geometry::{DataBlock, GeometryOwnershipType, PointCloud, PointCloudComponent};
use nalgebra::Vector3;

fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

fn shared_pointcloud() -> Arc<PointCloud> {
    Arc::new(PointCloud::from_positions(vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 2.0, 0.0),
    ]))
}

#[test]
fn writing_to_a_shared_pointcloud_leaves_other_components_untouched() -> Result<()> {
    init_logging();
    let pointcloud = shared_pointcloud();
    let reader = PointCloudComponent::from_data(DataBlock::Shared(pointcloud.clone()));
    let mut writer = PointCloudComponent::from_data(DataBlock::Shared(pointcloud.clone()));

    {
        let mut attributes = writer.attributes_for_write();
        attributes.add(
            "radius",
            AttributeDomain::Point,
            AttributeDataType::Float,
            AttributeInit::Value(AttributeValue::Float(0.5)),
        )?;
        let positions = attributes
            .lookup_for_write_typed::<Vector3<f32>>("position")
            .unwrap();
        positions[0] = Vector3::new(-4.0, 0.0, 0.0);
    }

    assert_eq!(GeometryOwnershipType::Owned, writer.ownership());
    assert_eq!(GeometryOwnershipType::Shared, reader.ownership());
    assert!(reader.attributes().lookup("radius").is_none());
    assert_eq!(Vector3::zeros(), reader.get().unwrap().positions()[0]);

    let written = writer.get().unwrap();
    assert_eq!(Vector3::new(-4.0, 0.0, 0.0), written.positions()[0]);
    let bounds = written.bounds_with_radius().unwrap();
    assert_eq!(-4.5, bounds.min().x);
    assert_eq!(2.5, bounds.max().y);
    Ok(())
}

#[test]
fn attributes_are_listed_builtin_first() -> Result<()> {
    init_logging();
    let mut component = PointCloudComponent::from_owned(PointCloud::new(2));
    {
        let mut attributes = component.attributes_for_write();
        attributes.add(
            "temperature",
            AttributeDomain::Point,
            AttributeDataType::Float,
            AttributeInit::DefaultValue,
        )?;
        attributes.add(
            "id",
            AttributeDomain::Point,
            AttributeDataType::Int32,
            AttributeInit::Array(AttributeArray::from_vec(vec![10i32, 11])),
        )?;
        attributes.add(
            "selected",
            AttributeDomain::Point,
            AttributeDataType::Bool,
            AttributeInit::DefaultValue,
        )?;
    }

    let attributes = component.attributes();
    assert_eq!(
        vec!["position", "id", "temperature", "selected"],
        attributes.all_names()
    );
    let selected = attributes.descriptor("selected").unwrap();
    assert!(selected.deletable());
    assert!(!attributes.descriptor("position").unwrap().deletable());
    assert!(attributes.is_builtin("radius"));
    assert!(!attributes.contains("radius"));

    let mut visited = 0;
    let finished = attributes.for_all(|_| {
        visited += 1;
        visited < 2
    });
    assert!(!finished);
    assert_eq!(2, visited);
    Ok(())
}

#[test]
fn renamed_attributes_keep_their_values() -> Result<()> {
    init_logging();
    let mut component = PointCloudComponent::from_owned(PointCloud::new(3));
    let mut attributes = component.attributes_for_write();
    attributes.add(
        "weight",
        AttributeDomain::Point,
        AttributeDataType::Float,
        AttributeInit::Value(AttributeValue::Float(2.0)),
    )?;
    attributes.rename("weight", "mass")?;
    assert!(!attributes.contains("weight"));
    assert!(attributes.rename("mass", "radius").is_err());
    assert!(attributes.rename("missing", "other").is_err());

    let mass = component
        .attributes()
        .lookup_typed::<f32>("mass")
        .unwrap();
    assert_eq!(vec![2.0, 2.0, 2.0], mass.to_vec());
    Ok(())
}

#[test]
fn lookup_or_add_for_write_creates_missing_attributes() -> Result<()> {
    init_logging();
    let mut component = PointCloudComponent::from_owned(PointCloud::new(2));
    let mut attributes = component.attributes_for_write();
    {
        let colors = attributes.lookup_or_add_for_write::<nalgebra::Vector4<f32>>(
            "color",
            AttributeDomain::Point,
            AttributeInit::DefaultValue,
        )?;
        colors[1] = nalgebra::Vector4::new(1.0, 0.0, 0.0, 1.0);
    }
    {
        let colors = attributes.lookup_or_add_for_write::<nalgebra::Vector4<f32>>(
            "color",
            AttributeDomain::Point,
            AttributeInit::DefaultValue,
        )?;
        assert_eq!(nalgebra::Vector4::new(1.0, 0.0, 0.0, 1.0), colors[1]);
    }
    assert!(attributes
        .lookup_or_add_for_write::<f32>("color", AttributeDomain::Point, AttributeInit::DefaultValue)
        .is_err());
    assert!(attributes
        .lookup_or_add_for_write::<f32>("on_faces", AttributeDomain::Face, AttributeInit::DefaultValue)
        .is_err());

    let as_float3 = component
        .attributes()
        .lookup_with("color", AttributeDomain::Point, AttributeDataType::Float3)
        .unwrap();
    assert_eq!(
        Some(AttributeValue::Float3(Vector3::new(1.0, 0.0, 0.0))),
        as_float3.get(1)
    );
    Ok(())
}

#[test]
fn empty_pointcloud_reports_no_builtin_values() {
    init_logging();
    let component = PointCloudComponent::from_owned(PointCloud::new(0));
    assert!(component.has_pointcloud());
    assert!(!component.is_empty());
    let attributes = component.attributes();
    assert!(attributes.lookup("position").is_none());
    assert!(attributes.contains("position"));
    let defaults = attributes.lookup_or_default("radius", AttributeDomain::Point, 1.0f32);
    assert!(defaults.is_empty());
    assert_eq!(
        None,
        attributes.adapt_domain(
            GVArray::Single {
                value: AttributeValue::Bool(true),
                len: 0
            },
            AttributeDomain::Point,
            AttributeDomain::Curve
        )
    );
}
