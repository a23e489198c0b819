use std::fmt::Display;

use super::{AttributeDataType, AttributeDomain};

/// The domain and data type of an attribute, without its name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDomainAndType {
    pub domain: AttributeDomain,
    pub data_type: AttributeDataType,
}

/// Describes a single attribute of a geometry. In geoset, attributes are identified by their name, and
/// each attribute stores one value of its data type per element of its domain. Attributes fall into two
/// categories: Built-in attributes (e.g. `position` or `radius` on a point cloud) have a fixed name, domain
/// and data type that are known statically, whereas the descriptors of custom attributes are discovered at
/// runtime from the data that a geometry stores.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttributeDescriptor<'a> {
    name: &'a str,
    domain: AttributeDomain,
    data_type: AttributeDataType,
    deletable: bool,
}

impl<'a> AttributeDescriptor<'a> {
    /// Creates a new `AttributeDescriptor`
    /// ```
    /// # use geoset_core::attributes::*;
    /// let descriptor = AttributeDescriptor::new("temperature", AttributeDomain::Point, AttributeDataType::Float, true);
    /// # assert_eq!("temperature", descriptor.name());
    /// # assert_eq!(AttributeDomain::Point, descriptor.domain());
    /// # assert_eq!(AttributeDataType::Float, descriptor.data_type());
    /// # assert!(descriptor.deletable());
    /// ```
    pub const fn new(
        name: &'a str,
        domain: AttributeDomain,
        data_type: AttributeDataType,
        deletable: bool,
    ) -> Self {
        Self {
            name,
            domain,
            data_type,
            deletable,
        }
    }

    /// Returns the name of the attribute
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the domain of the attribute
    pub const fn domain(&self) -> AttributeDomain {
        self.domain
    }

    /// Returns the data type of the attribute
    pub const fn data_type(&self) -> AttributeDataType {
        self.data_type
    }

    /// Returns `true` if the attribute may be removed from its geometry
    pub const fn deletable(&self) -> bool {
        self.deletable
    }

    /// Returns the domain and data type of the attribute
    pub fn domain_and_type(&self) -> AttributeDomainAndType {
        AttributeDomainAndType {
            domain: self.domain,
            data_type: self.data_type,
        }
    }
}

impl Display for AttributeDescriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.domain, self.data_type)
    }
}
