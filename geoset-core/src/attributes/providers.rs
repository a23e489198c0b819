//! Attribute providers are the objects that know where the values of an attribute are stored inside a data block.
//! There are two kinds of providers:
//! - [`BuiltinAttributeProvider`]s are responsible for exactly one attribute with a fixed name, domain and data type
//! - [`DynamicAttributesProvider`]s are responsible for an open-ended set of attributes that are created at runtime
//!
//! All providers of a geometry kind are combined into one [`ComponentAttributeProviders`] registry, which is built
//! once and then shared by all geometries of that kind.

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;

use super::conversion::convert;
use super::{
    AttributeArray, AttributeDataType, AttributeDescriptor, AttributeDomain, AttributeReader,
    AttributeValue, AttributeWriter, CustomDataAccessInfo, GMutableSpan, GVArray,
};

/// Function that is called on the owner of an attribute after the values of the attribute might have changed. Used to
/// invalidate caches of derived data
pub type UpdateOnChange<O> = fn(&mut O);

/// Describes the initial values of a newly created attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeInit {
    /// Every value is the zero value of the data type
    #[default]
    DefaultValue,
    /// Every value is the given value. The value is converted to the data type of the attribute if necessary
    Value(AttributeValue),
    /// The values are copied from the given array, which must have the data type of the attribute and one value per
    /// element of the domain
    Array(AttributeArray),
}

impl AttributeInit {
    /// Creates the `AttributeArray` with `len` values of type `data_type` that this initializer describes
    /// ```
    /// # use geoset_core::attributes::*;
    /// let array = AttributeInit::Value(AttributeValue::Int32(3)).build(AttributeDataType::Float, 2).unwrap();
    /// assert_eq!(Some(&[3.0f32, 3.0][..]), array.typed::<f32>());
    /// ```
    pub fn build(self, data_type: AttributeDataType, len: usize) -> Result<AttributeArray> {
        match self {
            AttributeInit::DefaultValue => Ok(AttributeArray::new(data_type, len)),
            AttributeInit::Value(value) => {
                let single = GVArray::Single { value, len };
                convert(single, data_type)
                    .map(|values| values.materialize())
                    .ok_or_else(|| {
                        anyhow!(
                            "Can't initialize a {} attribute with a {} value",
                            data_type,
                            value.data_type()
                        )
                    })
            }
            AttributeInit::Array(array) => {
                if array.data_type() != data_type {
                    bail!(
                        "Can't initialize a {} attribute from an array of type {}",
                        data_type,
                        array.data_type()
                    );
                }
                if array.len() != len {
                    bail!(
                        "Initial values have length {} but the domain has {} elements",
                        array.len(),
                        len
                    );
                }
                Ok(array)
            }
        }
    }
}

/// Provider for a single attribute with a fixed descriptor
pub trait BuiltinAttributeProvider<O>: Send + Sync {
    /// The descriptor of the attribute
    fn descriptor(&self) -> AttributeDescriptor<'static>;
    /// Read access to the values of the attribute. Returns `None` if the owner has no elements or if the attribute does
    /// not exist
    fn get_read<'a>(&self, owner: &'a O) -> Option<GVArray<'a>>;
    /// Write access to the values of the attribute. Calls the change hook of the attribute, if there is one
    fn get_write<'a>(&self, owner: &'a mut O) -> Option<GMutableSpan<'a>>;
    /// Removes the attribute from `owner`. Fails if the attribute is not deletable or does not exist
    fn remove(&self, owner: &mut O) -> Result<()>;
    /// Creates the attribute on `owner`. Fails if the attribute already exists
    fn try_create(&self, owner: &mut O, init: AttributeInit) -> Result<()>;
    /// Returns `true` if the attribute currently exists on `owner`
    fn exists(&self, owner: &O) -> bool;
}

/// Provider for a set of attributes that are only known at runtime
pub trait DynamicAttributesProvider<O>: Send + Sync {
    /// Lazily lists the descriptors of all attributes that currently exist on `owner`
    fn list<'a>(&self, owner: &'a O) -> Box<dyn Iterator<Item = AttributeDescriptor<'a>> + 'a>;
    /// Read access to the attribute with the given `name`, if it exists
    fn get_read<'a>(&self, owner: &'a O, name: &str) -> Option<AttributeReader<'a>>;
    /// Write access to the attribute with the given `name`, if it exists
    fn get_write<'a>(&self, owner: &'a mut O, name: &str) -> Option<AttributeWriter<'a>>;
    /// Adds a new attribute to `owner`
    fn add(
        &self,
        owner: &mut O,
        name: &str,
        domain: AttributeDomain,
        data_type: AttributeDataType,
        init: AttributeInit,
    ) -> Result<()>;
    /// Removes the attribute with the given `name` from `owner`
    fn remove(&self, owner: &mut O, name: &str) -> Result<()>;
    /// Renames the attribute `old_name` to `new_name`
    fn rename(&self, owner: &mut O, old_name: &str, new_name: &str) -> Result<()>;
    /// The domain of all attributes of this provider
    fn domain(&self) -> AttributeDomain;
}

/// Builtin attribute whose values are stored in a layer with the same name as the attribute inside the
/// [`CustomData`](super::CustomData) of the owner
pub struct BuiltinCustomDataLayerProvider<O> {
    descriptor: AttributeDescriptor<'static>,
    custom_data_access: CustomDataAccessInfo<O>,
    update_on_change: Option<UpdateOnChange<O>>,
}

impl<O> BuiltinCustomDataLayerProvider<O> {
    pub const fn new(
        descriptor: AttributeDescriptor<'static>,
        custom_data_access: CustomDataAccessInfo<O>,
        update_on_change: Option<UpdateOnChange<O>>,
    ) -> Self {
        Self {
            descriptor,
            custom_data_access,
            update_on_change,
        }
    }

    fn tag_changed(&self, owner: &mut O) {
        if let Some(update_on_change) = self.update_on_change {
            update_on_change(owner);
        }
    }
}

impl<O> BuiltinAttributeProvider<O> for BuiltinCustomDataLayerProvider<O> {
    fn descriptor(&self) -> AttributeDescriptor<'static> {
        self.descriptor
    }

    fn get_read<'a>(&self, owner: &'a O) -> Option<GVArray<'a>> {
        if (self.custom_data_access.get_element_num)(owner) == 0 {
            return None;
        }
        let custom_data = (self.custom_data_access.get_const_custom_data)(owner);
        let layer = custom_data.get_layer(self.descriptor.name())?;
        debug_assert_eq!(self.descriptor.data_type(), layer.data_type());
        Some(GVArray::Span(layer.data()))
    }

    fn get_write<'a>(&self, owner: &'a mut O) -> Option<GMutableSpan<'a>> {
        if !self.exists(owner) || (self.custom_data_access.get_element_num)(owner) == 0 {
            return None;
        }
        // The span borrows the owner for its whole lifetime, so the hook has to run before handing it out
        self.tag_changed(owner);
        let custom_data = (self.custom_data_access.get_custom_data)(owner);
        let layer = custom_data.get_layer_mut(self.descriptor.name())?;
        Some(GMutableSpan::new(layer.data_mut()))
    }

    fn remove(&self, owner: &mut O) -> Result<()> {
        if !self.descriptor.deletable() {
            bail!(
                "The builtin attribute '{}' can't be removed",
                self.descriptor.name()
            );
        }
        let custom_data = (self.custom_data_access.get_custom_data)(owner);
        if !custom_data.remove_layer(self.descriptor.name()) {
            bail!(
                "The builtin attribute '{}' does not exist",
                self.descriptor.name()
            );
        }
        self.tag_changed(owner);
        Ok(())
    }

    fn try_create(&self, owner: &mut O, init: AttributeInit) -> Result<()> {
        if self.exists(owner) {
            bail!(
                "The builtin attribute '{}' already exists",
                self.descriptor.name()
            );
        }
        let len = (self.custom_data_access.get_element_num)(owner);
        let data = init
            .build(self.descriptor.data_type(), len)
            .with_context(|| format!("Can't create builtin attribute '{}'", self.descriptor))?;
        (self.custom_data_access.get_custom_data)(owner).add_layer(self.descriptor.name(), data)?;
        self.tag_changed(owner);
        Ok(())
    }

    fn exists(&self, owner: &O) -> bool {
        (self.custom_data_access.get_const_custom_data)(owner).has_layer(self.descriptor.name())
    }
}

/// Provider for all attributes that are stored as layers inside the [`CustomData`](super::CustomData) of the owner,
/// except for the layers that belong to builtin attributes
pub struct CustomDataAttributeProvider<O> {
    domain: AttributeDomain,
    custom_data_access: CustomDataAccessInfo<O>,
    reserved_names: &'static [&'static str],
}

impl<O> CustomDataAttributeProvider<O> {
    /// Creates a new provider for the given `domain`. Layers named like one of the `reserved_names` are never reported,
    /// created, removed or renamed by this provider
    pub const fn new(
        domain: AttributeDomain,
        custom_data_access: CustomDataAccessInfo<O>,
        reserved_names: &'static [&'static str],
    ) -> Self {
        Self {
            domain,
            custom_data_access,
            reserved_names,
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(&name)
    }
}

impl<O> DynamicAttributesProvider<O> for CustomDataAttributeProvider<O> {
    fn list<'a>(&self, owner: &'a O) -> Box<dyn Iterator<Item = AttributeDescriptor<'a>> + 'a> {
        let domain = self.domain;
        let reserved_names = self.reserved_names;
        let custom_data = (self.custom_data_access.get_const_custom_data)(owner);
        Box::new(
            custom_data
                .layers()
                .filter(move |layer| !reserved_names.contains(&layer.name()))
                .map(move |layer| {
                    AttributeDescriptor::new(layer.name(), domain, layer.data_type(), true)
                }),
        )
    }

    fn get_read<'a>(&self, owner: &'a O, name: &str) -> Option<AttributeReader<'a>> {
        if self.is_reserved(name) {
            return None;
        }
        let layer = (self.custom_data_access.get_const_custom_data)(owner).get_layer(name)?;
        Some(AttributeReader {
            varray: GVArray::Span(layer.data()),
            domain: self.domain,
        })
    }

    fn get_write<'a>(&self, owner: &'a mut O, name: &str) -> Option<AttributeWriter<'a>> {
        if self.is_reserved(name) {
            return None;
        }
        let layer = (self.custom_data_access.get_custom_data)(owner).get_layer_mut(name)?;
        Some(AttributeWriter {
            span: GMutableSpan::new(layer.data_mut()),
            domain: self.domain,
        })
    }

    fn add(
        &self,
        owner: &mut O,
        name: &str,
        domain: AttributeDomain,
        data_type: AttributeDataType,
        init: AttributeInit,
    ) -> Result<()> {
        if self.is_reserved(name) {
            bail!("The name '{}' is reserved for a builtin attribute", name);
        }
        if domain != self.domain {
            bail!(
                "Can't add attribute '{}' on the {} domain, only the {} domain is supported",
                name,
                domain,
                self.domain
            );
        }
        if (self.custom_data_access.get_const_custom_data)(owner).has_layer(name) {
            bail!("An attribute named '{}' already exists", name);
        }
        let len = (self.custom_data_access.get_element_num)(owner);
        let data = init
            .build(data_type, len)
            .with_context(|| format!("Can't create attribute '{}'", name))?;
        (self.custom_data_access.get_custom_data)(owner).add_layer(name, data)
    }

    fn remove(&self, owner: &mut O, name: &str) -> Result<()> {
        if self.is_reserved(name) {
            bail!("The name '{}' is reserved for a builtin attribute", name);
        }
        if !(self.custom_data_access.get_custom_data)(owner).remove_layer(name) {
            bail!("There is no attribute named '{}'", name);
        }
        Ok(())
    }

    fn rename(&self, owner: &mut O, old_name: &str, new_name: &str) -> Result<()> {
        if self.is_reserved(old_name) || self.is_reserved(new_name) {
            bail!(
                "Can't rename '{}' to '{}', builtin attributes can't be renamed",
                old_name,
                new_name
            );
        }
        (self.custom_data_access.get_custom_data)(owner).rename_layer(old_name, new_name)
    }

    fn domain(&self) -> AttributeDomain {
        self.domain
    }
}

/// A reference to one of the providers inside a [`ComponentAttributeProviders`] registry
pub enum AttributeProvider<O: 'static> {
    Builtin(&'static dyn BuiltinAttributeProvider<O>),
    Dynamic(&'static dyn DynamicAttributesProvider<O>),
}

impl<O: 'static> Clone for AttributeProvider<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O: 'static> Copy for AttributeProvider<O> {}

/// The ordered collection of all attribute providers of a geometry kind. Builtin providers come first, in the order in
/// which they were declared, followed by the dynamic providers
pub struct ComponentAttributeProviders<O: 'static> {
    builtin_providers: Vec<&'static dyn BuiltinAttributeProvider<O>>,
    dynamic_providers: Vec<&'static dyn DynamicAttributesProvider<O>>,
    supported_domains: Vec<AttributeDomain>,
}

impl<O: 'static> ComponentAttributeProviders<O> {
    /// Creates a new registry. Panics if two builtin providers have the same name, since builtin names must be unique
    /// for lookups to be unambiguous
    pub fn new(
        builtin_providers: Vec<&'static dyn BuiltinAttributeProvider<O>>,
        dynamic_providers: Vec<&'static dyn DynamicAttributesProvider<O>>,
    ) -> Self {
        assert!(
            builtin_providers
                .iter()
                .map(|provider| provider.descriptor().name())
                .all_unique(),
            "Builtin attribute names must be unique"
        );
        let supported_domains = builtin_providers
            .iter()
            .map(|provider| provider.descriptor().domain())
            .chain(dynamic_providers.iter().map(|provider| provider.domain()))
            .sorted()
            .dedup()
            .collect();
        Self {
            builtin_providers,
            dynamic_providers,
            supported_domains,
        }
    }

    /// All builtin providers in their declared order
    pub fn builtin_providers(&self) -> &[&'static dyn BuiltinAttributeProvider<O>] {
        &self.builtin_providers
    }

    /// All dynamic providers
    pub fn dynamic_providers(&self) -> &[&'static dyn DynamicAttributesProvider<O>] {
        &self.dynamic_providers
    }

    /// Iterate over all providers, builtin providers first
    pub fn providers(&self) -> impl Iterator<Item = AttributeProvider<O>> + '_ {
        self.builtin_providers
            .iter()
            .map(|provider| AttributeProvider::Builtin(*provider))
            .chain(
                self.dynamic_providers
                    .iter()
                    .map(|provider| AttributeProvider::Dynamic(*provider)),
            )
    }

    /// Returns the builtin provider for the attribute with the given `name`
    pub fn builtin_provider(&self, name: &str) -> Option<&'static dyn BuiltinAttributeProvider<O>> {
        self.builtin_providers
            .iter()
            .find(|provider| provider.descriptor().name() == name)
            .copied()
    }

    /// Returns `true` if `name` is the name of a builtin attribute
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin_provider(name).is_some()
    }

    /// All domains that at least one provider stores attributes on, sorted
    pub fn supported_domains(&self) -> &[AttributeDomain] {
        &self.supported_domains
    }
}
