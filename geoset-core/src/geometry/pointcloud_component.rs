use lazy_static::lazy_static;

use crate::attributes::{
    accessor_functions_for_providers, AttributeAccessor, AttributeAccessorFunctions,
    AttributeDomain, BuiltinAttributeProvider, BuiltinCustomDataLayerProvider,
    ComponentAttributeProviders, CustomData, CustomDataAccessInfo, CustomDataAttributeProvider,
    DynamicAttributesProvider, MutableAttributeAccessor, StaticAttributeProviders,
};

use super::{
    DataBlock, GeometryOwnershipType, PointCloud, BUILTIN_ATTRIBUTE_NAMES, ID, POSITION, RADIUS,
};

fn get_custom_data(pointcloud: &mut PointCloud) -> &mut CustomData {
    pointcloud.point_data_mut()
}

fn get_const_custom_data(pointcloud: &PointCloud) -> &CustomData {
    pointcloud.point_data()
}

fn get_element_num(pointcloud: &PointCloud) -> usize {
    pointcloud.len()
}

const POINT_CUSTOM_DATA_ACCESS: CustomDataAccessInfo<PointCloud> = CustomDataAccessInfo {
    get_custom_data,
    get_const_custom_data,
    get_element_num,
};

fn tag_component_positions_changed(pointcloud: &mut PointCloud) {
    pointcloud.tag_positions_changed();
}

fn tag_component_radius_changed(pointcloud: &mut PointCloud) {
    pointcloud.tag_radii_changed();
}

static POSITION_PROVIDER: BuiltinCustomDataLayerProvider<PointCloud> =
    BuiltinCustomDataLayerProvider::new(
        POSITION,
        POINT_CUSTOM_DATA_ACCESS,
        Some(tag_component_positions_changed),
    );
static RADIUS_PROVIDER: BuiltinCustomDataLayerProvider<PointCloud> =
    BuiltinCustomDataLayerProvider::new(
        RADIUS,
        POINT_CUSTOM_DATA_ACCESS,
        Some(tag_component_radius_changed),
    );
static ID_PROVIDER: BuiltinCustomDataLayerProvider<PointCloud> =
    BuiltinCustomDataLayerProvider::new(ID, POINT_CUSTOM_DATA_ACCESS, None);
static POINT_CUSTOM_DATA_PROVIDER: CustomDataAttributeProvider<PointCloud> =
    CustomDataAttributeProvider::new(
        AttributeDomain::Point,
        POINT_CUSTOM_DATA_ACCESS,
        BUILTIN_ATTRIBUTE_NAMES,
    );

/// In this function all the attribute providers for a point cloud component are created. Most data in this function is
/// statically allocated, because it does not change over time
fn create_attribute_providers_for_point_cloud() -> ComponentAttributeProviders<PointCloud> {
    let builtin_providers: Vec<&'static dyn BuiltinAttributeProvider<PointCloud>> =
        vec![&POSITION_PROVIDER, &RADIUS_PROVIDER, &ID_PROVIDER];
    let dynamic_providers: Vec<&'static dyn DynamicAttributesProvider<PointCloud>> =
        vec![&POINT_CUSTOM_DATA_PROVIDER];
    ComponentAttributeProviders::new(builtin_providers, dynamic_providers)
}

/// Names the point cloud attribute provider registry
struct PointCloudProviders;

impl StaticAttributeProviders<PointCloud> for PointCloudProviders {
    fn providers() -> &'static ComponentAttributeProviders<PointCloud> {
        &*POINTCLOUD_PROVIDERS
    }
}

fn pointcloud_domain_size(owner: Option<&PointCloud>, domain: AttributeDomain) -> usize {
    match (owner, domain) {
        (Some(pointcloud), AttributeDomain::Point) => pointcloud.len(),
        _ => 0,
    }
}

fn create_accessor_functions_for_point_cloud() -> AttributeAccessorFunctions<PointCloud> {
    // Points are the only domain with providers, so the default rules already support only points and never
    // interpolate between domains
    let mut functions = accessor_functions_for_providers::<PointCloud, PointCloudProviders>();
    functions.domain_size = pointcloud_domain_size;
    functions
}

lazy_static! {
    static ref POINTCLOUD_PROVIDERS: ComponentAttributeProviders<PointCloud> =
        create_attribute_providers_for_point_cloud();
    static ref POINTCLOUD_ACCESSOR_FUNCTIONS: AttributeAccessorFunctions<PointCloud> =
        create_accessor_functions_for_point_cloud();
}

/// The accessor functions that are shared by all point clouds
pub(crate) fn pointcloud_accessor_functions() -> &'static AttributeAccessorFunctions<PointCloud> {
    &*POINTCLOUD_ACCESSOR_FUNCTIONS
}

/// Geometry component that holds a point cloud. The point cloud is either owned by the component, or it is owned by
/// someone else and referenced read-only or shared. Writing to a point cloud that is not owned copies it first.
#[derive(Debug)]
pub struct PointCloudComponent {
    pointcloud: Option<DataBlock<PointCloud>>,
    /// Ownership of the last point cloud, reported while the component is empty
    detached_ownership: GeometryOwnershipType,
}

impl PointCloudComponent {
    /// Creates a new empty component
    pub fn new() -> Self {
        Self {
            pointcloud: None,
            detached_ownership: GeometryOwnershipType::Owned,
        }
    }

    /// Creates a new component for the given data block
    pub fn from_data(pointcloud: DataBlock<PointCloud>) -> Self {
        Self {
            detached_ownership: pointcloud.ownership(),
            pointcloud: Some(pointcloud),
        }
    }

    /// Creates a new component that owns `pointcloud`
    pub fn from_owned(pointcloud: PointCloud) -> Self {
        Self::from_data(DataBlock::owned(pointcloud))
    }

    /// Creates a copy of this component. The point cloud is copied as well, so the copy always owns its data
    /// ```
    /// # use geoset_core::geometry::*;
    /// # use std::sync::Arc;
    /// let shared = Arc::new(PointCloud::new(3));
    /// let component = PointCloudComponent::from_data(DataBlock::Shared(shared.clone()));
    /// let copy = component.copy();
    /// assert_eq!(GeometryOwnershipType::Owned, copy.ownership());
    /// assert_eq!(3, copy.get().unwrap().len());
    /// assert!(!std::ptr::eq(shared.as_ref(), copy.get().unwrap()));
    /// ```
    pub fn copy(&self) -> Self {
        match &self.pointcloud {
            Some(pointcloud) => Self::from_data(pointcloud.copy_owned()),
            None => Self::new(),
        }
    }

    /// Removes the point cloud from this component. An owned point cloud is dropped, a read-only or shared one is
    /// only detached
    pub fn clear(&mut self) {
        if let Some(pointcloud) = self.pointcloud.take() {
            self.detached_ownership = pointcloud.ownership();
        }
    }

    /// Replaces the point cloud of this component
    pub fn replace(&mut self, pointcloud: DataBlock<PointCloud>) {
        self.clear();
        self.detached_ownership = pointcloud.ownership();
        self.pointcloud = Some(pointcloud);
    }

    /// Moves the point cloud out of this component without dropping it. Returns `None` if the component is empty
    pub fn release(&mut self) -> Option<DataBlock<PointCloud>> {
        let pointcloud = self.pointcloud.take()?;
        self.detached_ownership = pointcloud.ownership();
        Some(pointcloud)
    }

    /// Shared access to the point cloud
    pub fn get(&self) -> Option<&PointCloud> {
        self.pointcloud.as_ref().map(|pointcloud| pointcloud.get())
    }

    /// Mutable access to the point cloud. A point cloud that is not owned by this component is copied first, an owned
    /// point cloud is returned as is
    /// ```
    /// # use geoset_core::geometry::*;
    /// # use std::sync::Arc;
    /// let original = Arc::new(PointCloud::new(3));
    /// let mut component = PointCloudComponent::from_data(DataBlock::ReadOnly(original.clone()));
    /// let copy: *const PointCloud = component.get_for_write().unwrap();
    /// assert!(!std::ptr::eq(original.as_ref(), copy));
    /// assert_eq!(GeometryOwnershipType::Owned, component.ownership());
    /// let again: *const PointCloud = component.get_for_write().unwrap();
    /// assert_eq!(copy, again);
    /// ```
    pub fn get_for_write(&mut self) -> Option<&mut PointCloud> {
        let pointcloud = self.pointcloud.as_mut()?;
        let pointcloud = pointcloud.make_owned();
        self.detached_ownership = GeometryOwnershipType::Owned;
        Some(pointcloud)
    }

    /// Makes sure that this component owns its point cloud, copying it if necessary
    pub fn ensure_owns_direct_data(&mut self) {
        if let Some(pointcloud) = self.pointcloud.as_mut() {
            pointcloud.make_owned();
        }
        self.detached_ownership = GeometryOwnershipType::Owned;
    }

    /// Returns `true` if this component has a point cloud
    pub fn has_pointcloud(&self) -> bool {
        self.pointcloud.is_some()
    }

    /// Returns `true` if this component has no point cloud. A point cloud without points still counts as content
    pub fn is_empty(&self) -> bool {
        self.pointcloud.is_none()
    }

    /// Returns `true` if this component owns its point cloud exclusively
    pub fn owns_direct_data(&self) -> bool {
        self.ownership() == GeometryOwnershipType::Owned
    }

    /// Returns how this component relates to its point cloud
    pub fn ownership(&self) -> GeometryOwnershipType {
        self.pointcloud
            .as_ref()
            .map_or(self.detached_ownership, DataBlock::ownership)
    }

    /// Read access to the attributes of the point cloud. Behaves like a point cloud without points if the component is
    /// empty
    pub fn attributes(&self) -> AttributeAccessor<'_, PointCloud> {
        AttributeAccessor::new(self.get(), pointcloud_accessor_functions())
    }

    /// Write access to the attributes of the point cloud. Copies the point cloud first if it is not owned by this
    /// component
    pub fn attributes_for_write(&mut self) -> MutableAttributeAccessor<'_, PointCloud> {
        MutableAttributeAccessor::new(self.get_for_write(), pointcloud_accessor_functions())
    }
}

impl Default for PointCloudComponent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeDataType, AttributeInit, AttributeValue, GVArray};
    use crate::test_utils::random_pointcloud;
    use anyhow::Result;
    use nalgebra::Vector3;
    use rand::thread_rng;
    use std::sync::Arc;

    fn component_with_points(point_count: usize) -> PointCloudComponent {
        PointCloudComponent::from_owned(PointCloud::new(point_count))
    }

    fn address(component: &PointCloudComponent) -> *const PointCloud {
        component.get().unwrap()
    }

    #[test]
    fn test_domain_size() {
        let component = component_with_points(5);
        let attributes = component.attributes();
        for domain in AttributeDomain::ALL {
            let expected = if domain == AttributeDomain::Point { 5 } else { 0 };
            assert_eq!(expected, attributes.domain_size(domain));
        }
    }

    #[test]
    fn test_domain_supported() {
        let component = component_with_points(1);
        let empty = PointCloudComponent::new();
        for domain in AttributeDomain::ALL {
            let expected = domain == AttributeDomain::Point;
            assert_eq!(expected, component.attributes().domain_supported(domain));
            assert_eq!(expected, empty.attributes().domain_supported(domain));
        }
    }

    #[test]
    fn test_adapt_domain() {
        let component = component_with_points(2);
        let attributes = component.attributes();
        let values = GVArray::Single {
            value: AttributeValue::Float(1.0),
            len: 2,
        };
        for from in AttributeDomain::ALL {
            for to in AttributeDomain::ALL {
                let adapted = attributes.adapt_domain(values.clone(), from, to);
                if from == AttributeDomain::Point && to == AttributeDomain::Point {
                    assert_eq!(Some(values.clone()), adapted);
                } else {
                    assert_eq!(None, adapted);
                }
            }
        }
    }

    #[test]
    fn test_radius_round_trip() -> Result<()> {
        let mut component = component_with_points(3);
        let mut attributes = component.attributes_for_write();
        attributes.add(
            "radius",
            AttributeDomain::Point,
            AttributeDataType::Float,
            AttributeInit::DefaultValue,
        )?;
        let mut writer = attributes.lookup_for_write("radius").unwrap();
        assert_eq!(AttributeDomain::Point, writer.domain);
        writer.span.set(1, &AttributeValue::Float(0.25))?;

        let reader = component.attributes().lookup("radius").unwrap();
        assert_eq!(Some(AttributeValue::Float(0.25)), reader.varray.get(1));
        assert_eq!(Some(&[0.0, 0.25, 0.0][..]), component.get().unwrap().radii());
        Ok(())
    }

    #[test]
    fn test_copy_on_write_from_read_only() {
        let original = Arc::new(PointCloud::from_positions(vec![Vector3::zeros(); 3]));
        let mut component = PointCloudComponent::from_data(DataBlock::ReadOnly(original.clone()));
        assert_eq!(GeometryOwnershipType::ReadOnly, component.ownership());
        assert!(!component.owns_direct_data());

        let pointcloud = component.get_for_write().unwrap();
        pointcloud.positions_mut()[0] = Vector3::new(1.0, 1.0, 1.0);
        let first: *const PointCloud = pointcloud;

        assert_eq!(GeometryOwnershipType::Owned, component.ownership());
        assert_ne!(Arc::as_ptr(&original), first);
        assert_eq!(Vector3::zeros(), original.positions()[0]);

        let second: *const PointCloud = component.get_for_write().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_accessor_copies_shared_data() -> Result<()> {
        let shared = Arc::new(PointCloud::new(2));
        let mut component = PointCloudComponent::from_data(DataBlock::Shared(shared.clone()));
        component.attributes_for_write().add(
            "weight",
            AttributeDomain::Point,
            AttributeDataType::Float,
            AttributeInit::Value(AttributeValue::Float(1.0)),
        )?;
        assert!(component.attributes().contains("weight"));
        assert!(!shared.attributes().contains("weight"));
        // The component dropped its reference when it copied the point cloud
        assert_eq!(1, Arc::strong_count(&shared));
        Ok(())
    }

    #[test]
    fn test_deletability() -> Result<()> {
        let mut component = component_with_points(4);
        let mut attributes = component.attributes_for_write();
        assert!(attributes.remove("position").is_err());
        assert!(attributes.contains("position"));

        attributes.add(
            "radius",
            AttributeDomain::Point,
            AttributeDataType::Float,
            AttributeInit::DefaultValue,
        )?;
        attributes.remove("radius")?;
        assert!(component.attributes().lookup("radius").is_none());
        Ok(())
    }

    #[test]
    fn test_builtin_names_are_reserved() -> Result<()> {
        let mut component = component_with_points(2);
        let mut attributes = component.attributes_for_write();
        assert!(attributes
            .add(
                "position",
                AttributeDomain::Point,
                AttributeDataType::Float,
                AttributeInit::DefaultValue,
            )
            .is_err());
        assert!(attributes
            .add(
                "position",
                AttributeDomain::Point,
                AttributeDataType::Float3,
                AttributeInit::DefaultValue,
            )
            .is_err());
        assert!(attributes.rename("position", "location").is_err());

        let listed = POINT_CUSTOM_DATA_PROVIDER
            .list(component.get().unwrap())
            .map(|descriptor| descriptor.name())
            .collect::<Vec<_>>();
        assert!(listed.is_empty());
        Ok(())
    }

    #[test]
    fn test_change_hooks() -> Result<()> {
        let mut component = component_with_points(3);
        let mut attributes = component.attributes_for_write();
        attributes.add(
            "id",
            AttributeDomain::Point,
            AttributeDataType::Int32,
            AttributeInit::DefaultValue,
        )?;
        {
            let positions = attributes
                .lookup_for_write_typed::<Vector3<f32>>("position")
                .unwrap();
            positions[2] = Vector3::new(0.0, 0.0, 1.0);
        }
        {
            let ids = attributes.lookup_for_write_typed::<i32>("id").unwrap();
            ids.copy_from_slice(&[3, 4, 5]);
        }
        let pointcloud = component.get().unwrap();
        assert_eq!(1, pointcloud.positions_version());
        assert_eq!(0, pointcloud.radii_version());
        assert_eq!(Some(&[3, 4, 5][..]), pointcloud.ids());
        Ok(())
    }

    #[test]
    fn test_empty_component() {
        let mut component = PointCloudComponent::new();
        assert!(!component.has_pointcloud());
        assert!(component.is_empty());
        let attributes = component.attributes();
        assert_eq!(0, attributes.domain_size(AttributeDomain::Point));
        assert!(attributes.lookup("position").is_none());
        assert!(attributes.descriptors().is_empty());

        let mut attributes = component.attributes_for_write();
        assert!(attributes.lookup_for_write("position").is_none());
        assert!(attributes
            .add(
                "weight",
                AttributeDomain::Point,
                AttributeDataType::Float,
                AttributeInit::DefaultValue,
            )
            .is_err());
    }

    #[test]
    fn test_component_without_points_is_not_empty() {
        let mut component = component_with_points(0);
        assert!(component.has_pointcloud());
        assert!(!component.is_empty());
        component.clear();
        assert!(component.is_empty());
        assert_eq!(!component.has_pointcloud(), component.is_empty());
    }

    #[test]
    fn test_owned_component_with_three_points() {
        let mut component = component_with_points(3);
        let first: *const PointCloud = component.get_for_write().unwrap();
        let second: *const PointCloud = component.get_for_write().unwrap();
        assert_eq!(first, second);

        let copy = component.copy();
        assert_eq!(3, copy.get().unwrap().len());
        assert_ne!(address(&component), address(&copy));
    }

    #[test]
    fn test_release_and_replace() {
        let shared = Arc::new(PointCloud::new(1));
        let mut component = PointCloudComponent::from_data(DataBlock::Shared(shared.clone()));
        let released = component.release().unwrap();
        assert!(!component.has_pointcloud());
        assert_eq!(GeometryOwnershipType::Shared, component.ownership());
        assert_eq!(GeometryOwnershipType::Shared, released.ownership());

        component.replace(DataBlock::owned(PointCloud::new(7)));
        assert_eq!(GeometryOwnershipType::Owned, component.ownership());
        assert_eq!(7, component.get().unwrap().len());

        component.clear();
        assert!(!component.has_pointcloud());
        assert_eq!(2, Arc::strong_count(&shared));
        drop(released);
        assert_eq!(1, Arc::strong_count(&shared));
    }

    #[test]
    fn test_ensure_owns_direct_data() {
        let mut empty = PointCloudComponent::from_data(DataBlock::ReadOnly(Arc::new(
            PointCloud::new(1),
        )));
        empty.clear();
        assert_eq!(GeometryOwnershipType::ReadOnly, empty.ownership());
        empty.ensure_owns_direct_data();
        assert!(empty.owns_direct_data());

        let original = Arc::new(random_pointcloud(&mut thread_rng(), 8));
        let mut component = PointCloudComponent::from_data(DataBlock::ReadOnly(original.clone()));
        component.ensure_owns_direct_data();
        assert!(component.owns_direct_data());
        assert_ne!(Arc::as_ptr(&original), address(&component));
        assert_eq!(original.positions(), component.get().unwrap().positions());
    }

    #[test]
    fn test_lookup_or_default() {
        let component = component_with_points(4);
        let radii = component
            .attributes()
            .lookup_or_default("radius", AttributeDomain::Point, 0.5f32);
        assert_eq!(Some(0.5), radii.single());
        assert_eq!(4, radii.len());
    }

    #[test]
    fn test_implicit_conversion() -> Result<()> {
        let mut component = component_with_points(2);
        component.attributes_for_write().add(
            "radius",
            AttributeDomain::Point,
            AttributeDataType::Float,
            AttributeInit::Value(AttributeValue::Float(3.75)),
        )?;
        let radii = component.attributes().lookup_typed::<i32>("radius").unwrap();
        assert_eq!(vec![3, 3], radii.to_vec());
        assert!(component
            .attributes()
            .lookup_with("radius", AttributeDomain::Face, AttributeDataType::Float)
            .is_none());
        Ok(())
    }

    #[test]
    fn test_readded_attribute_has_fresh_values() -> Result<()> {
        let mut component = component_with_points(2);
        let mut attributes = component.attributes_for_write();
        let init = AttributeInit::Value(AttributeValue::Int32(9));
        attributes.add("level", AttributeDomain::Point, AttributeDataType::Int32, init)?;
        attributes.remove("level")?;
        attributes.add(
            "level",
            AttributeDomain::Point,
            AttributeDataType::Int32,
            AttributeInit::DefaultValue,
        )?;
        let levels = component.attributes().lookup_typed::<i32>("level").unwrap();
        assert_eq!(vec![0, 0], levels.to_vec());
        Ok(())
    }
}
