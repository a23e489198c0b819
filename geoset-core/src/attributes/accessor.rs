//! Accessors are the interface through which attributes of a geometry are read and written. An accessor binds the
//! [`AttributeAccessorFunctions`] of a geometry kind to one concrete data block, so that callers never have to know
//! whether an attribute is builtin or custom, or where its values are stored.

use anyhow::{bail, Result};
use itertools::Itertools;
use log::trace;

use super::conversion::convert;
use super::providers::{AttributeInit, AttributeProvider, ComponentAttributeProviders};
use super::{
    AttributeDataType, AttributeDescriptor, AttributeDomain, AttributeType, GMutableSpan, GVArray,
    VArray,
};

/// Read access to the values of an attribute, together with the domain that the values are stored on
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeReader<'a> {
    pub varray: GVArray<'a>,
    pub domain: AttributeDomain,
}

/// Write access to the values of an attribute, together with the domain that the values are stored on
#[derive(Debug, PartialEq)]
pub struct AttributeWriter<'a> {
    pub span: GMutableSpan<'a>,
    pub domain: AttributeDomain,
}

/// The table of functions that implements attribute access for one geometry kind with an owner type `O`. The table
/// only stores plain function pointers, so it can be built once and shared by every geometry of that kind
pub struct AttributeAccessorFunctions<O> {
    pub domain_supported: fn(Option<&O>, AttributeDomain) -> bool,
    pub domain_size: fn(Option<&O>, AttributeDomain) -> usize,
    pub is_builtin: fn(&str) -> bool,
    pub builtin_descriptor: fn(&str) -> Option<AttributeDescriptor<'static>>,
    pub lookup: for<'a> fn(&'a O, &str) -> Option<AttributeReader<'a>>,
    pub adapt_domain: for<'v> fn(
        Option<&O>,
        GVArray<'v>,
        AttributeDomain,
        AttributeDomain,
    ) -> Option<GVArray<'v>>,
    pub for_all: for<'a> fn(&'a O, &mut dyn FnMut(AttributeDescriptor<'a>) -> bool) -> bool,
    pub lookup_for_write: for<'a> fn(&'a mut O, &str) -> Option<AttributeWriter<'a>>,
    pub remove: fn(&mut O, &str) -> Result<()>,
    pub add: fn(&mut O, &str, AttributeDomain, AttributeDataType, AttributeInit) -> Result<()>,
    pub rename: fn(&mut O, &str, &str) -> Result<()>,
}

impl<O> Clone for AttributeAccessorFunctions<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for AttributeAccessorFunctions<O> {}

/// Names the process-wide provider registry of a geometry kind, so that generic accessor functions can be
/// instantiated into plain function pointers for that registry
pub trait StaticAttributeProviders<O: 'static> {
    fn providers() -> &'static ComponentAttributeProviders<O>;
}

fn default_domain_supported<O: 'static, P: StaticAttributeProviders<O>>(
    _owner: Option<&O>,
    domain: AttributeDomain,
) -> bool {
    P::providers().supported_domains().contains(&domain)
}

fn default_domain_size<O>(_owner: Option<&O>, _domain: AttributeDomain) -> usize {
    0
}

fn default_adapt_domain<'v, O: 'static, P: StaticAttributeProviders<O>>(
    _owner: Option<&O>,
    values: GVArray<'v>,
    from_domain: AttributeDomain,
    to_domain: AttributeDomain,
) -> Option<GVArray<'v>> {
    let supported = P::providers().supported_domains();
    (from_domain == to_domain && supported.contains(&from_domain)).then_some(values)
}

fn is_builtin<O: 'static, P: StaticAttributeProviders<O>>(name: &str) -> bool {
    P::providers().is_builtin(name)
}

fn builtin_descriptor<O: 'static, P: StaticAttributeProviders<O>>(
    name: &str,
) -> Option<AttributeDescriptor<'static>> {
    P::providers()
        .builtin_provider(name)
        .map(|provider| provider.descriptor())
}

fn lookup<'a, O: 'static, P: StaticAttributeProviders<O>>(
    owner: &'a O,
    name: &str,
) -> Option<AttributeReader<'a>> {
    let providers = P::providers();
    if let Some(provider) = providers.builtin_provider(name) {
        let domain = provider.descriptor().domain();
        return provider
            .get_read(owner)
            .map(|varray| AttributeReader { varray, domain });
    }
    providers
        .dynamic_providers()
        .iter()
        .find_map(|provider| provider.get_read(owner, name))
}

fn for_all<'a, O: 'static, P: StaticAttributeProviders<O>>(
    owner: &'a O,
    callback: &mut dyn FnMut(AttributeDescriptor<'a>) -> bool,
) -> bool {
    for provider in P::providers().providers() {
        let finished = match provider {
            AttributeProvider::Builtin(builtin) => {
                !builtin.exists(owner) || callback(builtin.descriptor())
            }
            AttributeProvider::Dynamic(dynamic) => dynamic.list(owner).all(&mut *callback),
        };
        if !finished {
            return false;
        }
    }
    true
}

fn lookup_for_write<'a, O: 'static, P: StaticAttributeProviders<O>>(
    owner: &'a mut O,
    name: &str,
) -> Option<AttributeWriter<'a>> {
    let providers = P::providers();
    if let Some(provider) = providers.builtin_provider(name) {
        let domain = provider.descriptor().domain();
        return provider
            .get_write(owner)
            .map(|span| AttributeWriter { span, domain });
    }
    let provider = providers
        .dynamic_providers()
        .iter()
        .find(|provider| provider.get_read(&*owner, name).is_some())?;
    provider.get_write(owner, name)
}

fn remove<O: 'static, P: StaticAttributeProviders<O>>(owner: &mut O, name: &str) -> Result<()> {
    let providers = P::providers();
    if let Some(provider) = providers.builtin_provider(name) {
        return provider.remove(owner);
    }
    match providers
        .dynamic_providers()
        .iter()
        .find(|provider| provider.get_read(&*owner, name).is_some())
    {
        Some(provider) => provider.remove(owner, name),
        None => bail!("There is no attribute named '{}'", name),
    }
}

fn add<O: 'static, P: StaticAttributeProviders<O>>(
    owner: &mut O,
    name: &str,
    domain: AttributeDomain,
    data_type: AttributeDataType,
    init: AttributeInit,
) -> Result<()> {
    let providers = P::providers();
    if let Some(provider) = providers.builtin_provider(name) {
        let descriptor = provider.descriptor();
        if descriptor.domain() != domain || descriptor.data_type() != data_type {
            bail!(
                "The builtin attribute '{}' can't be created as {} on the {} domain",
                descriptor,
                data_type,
                domain
            );
        }
        return provider.try_create(owner, init);
    }
    if lookup::<O, P>(owner, name).is_some() {
        bail!("An attribute named '{}' already exists", name);
    }
    match providers
        .dynamic_providers()
        .iter()
        .find(|provider| provider.domain() == domain)
    {
        Some(provider) => provider.add(owner, name, domain, data_type, init),
        None => bail!(
            "Can't add attribute '{}', the {} domain is not supported",
            name,
            domain
        ),
    }
}

fn rename<O: 'static, P: StaticAttributeProviders<O>>(
    owner: &mut O,
    old_name: &str,
    new_name: &str,
) -> Result<()> {
    let providers = P::providers();
    if providers.is_builtin(old_name) || providers.is_builtin(new_name) {
        bail!(
            "Can't rename '{}' to '{}', builtin attributes can't be renamed",
            old_name,
            new_name
        );
    }
    match providers
        .dynamic_providers()
        .iter()
        .find(|provider| provider.get_read(&*owner, old_name).is_some())
    {
        Some(provider) => provider.rename(owner, old_name, new_name),
        None => bail!("There is no attribute named '{}'", old_name),
    }
}

/// Builds the accessor function table for the provider registry named by `P`. Domain rules fall back to defaults
/// derived from the registry: every domain that a provider stores attributes on is supported, values are only passed
/// through between equal domains, and all domains have zero elements. Geometry kinds that store elements replace at
/// least `domain_size` with their own function.
pub fn accessor_functions_for_providers<O: 'static, P: StaticAttributeProviders<O>>(
) -> AttributeAccessorFunctions<O> {
    trace!(
        "Building attribute accessor functions for builtin attributes [{}]",
        P::providers()
            .builtin_providers()
            .iter()
            .map(|provider| provider.descriptor())
            .join(", ")
    );
    AttributeAccessorFunctions {
        domain_supported: default_domain_supported::<O, P>,
        domain_size: default_domain_size::<O>,
        is_builtin: is_builtin::<O, P>,
        builtin_descriptor: builtin_descriptor::<O, P>,
        lookup: lookup::<O, P>,
        adapt_domain: default_adapt_domain::<O, P>,
        for_all: for_all::<O, P>,
        lookup_for_write: lookup_for_write::<O, P>,
        remove: remove::<O, P>,
        add: add::<O, P>,
        rename: rename::<O, P>,
    }
}

/// Read-only access to the attributes of a data block of type `O`. A missing data block behaves like a geometry
/// without any elements and attributes
pub struct AttributeAccessor<'a, O: 'static> {
    owner: Option<&'a O>,
    functions: &'static AttributeAccessorFunctions<O>,
}

impl<'a, O: 'static> Clone for AttributeAccessor<'a, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, O: 'static> Copy for AttributeAccessor<'a, O> {}

impl<'a, O: 'static> AttributeAccessor<'a, O> {
    pub fn new(owner: Option<&'a O>, functions: &'static AttributeAccessorFunctions<O>) -> Self {
        Self { owner, functions }
    }

    /// Returns `true` if there is a data block behind this accessor
    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// Returns `true` if an attribute with the given `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// Returns the values of the attribute with the given `name`, on the domain they are stored on
    /// ```
    /// # use geoset_core::geometry::*;
    /// let pointcloud = PointCloud::new(4);
    /// let position = pointcloud.attributes().lookup("position").unwrap();
    /// assert_eq!(4, position.varray.len());
    /// assert!(pointcloud.attributes().lookup("radius").is_none());
    /// ```
    pub fn lookup(&self, name: &str) -> Option<AttributeReader<'a>> {
        self.owner
            .and_then(|owner| (self.functions.lookup)(owner, name))
    }

    /// Returns the values of the attribute with the given `name` as `T`, converting them if the attribute stores
    /// another data type
    pub fn lookup_typed<T: AttributeType>(&self, name: &str) -> Option<VArray<'a, T>> {
        let reader = self.lookup(name)?;
        convert(reader.varray, T::data_type())?.into_typed::<T>()
    }

    /// Returns the values of the attribute with the given `name` on `domain` with the given `data_type`. Values are
    /// adapted to `domain` and converted to `data_type` as needed. Returns `None` if the attribute does not exist or
    /// if the values can't be adapted or converted
    /// ```
    /// # use geoset_core::attributes::*;
    /// # use geoset_core::geometry::*;
    /// let mut pointcloud = PointCloud::new(2);
    /// pointcloud.attributes_for_write().add("radius", AttributeDomain::Point, AttributeDataType::Float, AttributeInit::Value(AttributeValue::Float(2.5))).unwrap();
    /// let radii = pointcloud.attributes().lookup_with("radius", AttributeDomain::Point, AttributeDataType::Int32).unwrap();
    /// assert_eq!(Some(AttributeValue::Int32(2)), radii.get(0));
    /// ```
    pub fn lookup_with(
        &self,
        name: &str,
        domain: AttributeDomain,
        data_type: AttributeDataType,
    ) -> Option<GVArray<'a>> {
        let reader = self.lookup(name)?;
        let adapted = self.adapt_domain(reader.varray, reader.domain, domain)?;
        convert(adapted, data_type)
    }

    /// Like [`lookup_with`](AttributeAccessor::lookup_with), but returns `default` for every element of `domain` if
    /// the attribute is not available
    pub fn lookup_or_default<T: AttributeType>(
        &self,
        name: &str,
        domain: AttributeDomain,
        default: T,
    ) -> VArray<'a, T> {
        match self
            .lookup_with(name, domain, T::data_type())
            .and_then(|values| values.into_typed::<T>())
        {
            Some(values) => values,
            None => VArray::Single {
                value: default,
                len: self.domain_size(domain),
            },
        }
    }

    /// Returns the number of elements of `domain`
    pub fn domain_size(&self, domain: AttributeDomain) -> usize {
        (self.functions.domain_size)(self.owner, domain)
    }

    /// Returns `true` if the geometry kind supports attributes on `domain`
    pub fn domain_supported(&self, domain: AttributeDomain) -> bool {
        (self.functions.domain_supported)(self.owner, domain)
    }

    /// Adapts `values` that are stored on `from_domain` to `to_domain`. Returns `None` if there is no way to
    /// interpolate between the two domains
    pub fn adapt_domain<'v>(
        &self,
        values: GVArray<'v>,
        from_domain: AttributeDomain,
        to_domain: AttributeDomain,
    ) -> Option<GVArray<'v>> {
        (self.functions.adapt_domain)(self.owner, values, from_domain, to_domain)
    }

    /// Returns the descriptor of the attribute with the given `name`, if it exists
    pub fn descriptor(&self, name: &str) -> Option<AttributeDescriptor<'a>> {
        let mut found = None;
        self.for_all(|descriptor| {
            if descriptor.name() == name {
                found = Some(descriptor);
                return false;
            }
            true
        });
        found
    }

    /// Returns `true` if `name` is reserved for a builtin attribute of this geometry kind
    pub fn is_builtin(&self, name: &str) -> bool {
        (self.functions.is_builtin)(name)
    }

    /// Returns the descriptor of the builtin attribute with the given `name`, whether it exists or not
    pub fn builtin_descriptor(&self, name: &str) -> Option<AttributeDescriptor<'static>> {
        (self.functions.builtin_descriptor)(name)
    }

    /// Calls `callback` with the descriptor of every attribute, builtin attributes first. Stops as soon as `callback`
    /// returns `false`, in which case this function returns `false` as well
    pub fn for_all<F: FnMut(AttributeDescriptor<'a>) -> bool>(&self, mut callback: F) -> bool {
        match self.owner {
            Some(owner) => (self.functions.for_all)(owner, &mut callback),
            None => true,
        }
    }

    /// Returns the descriptors of all attributes, builtin attributes first
    pub fn descriptors(&self) -> Vec<AttributeDescriptor<'a>> {
        let mut descriptors = vec![];
        self.for_all(|descriptor| {
            descriptors.push(descriptor);
            true
        });
        descriptors
    }

    /// Returns the names of all attributes, builtin attributes first
    pub fn all_names(&self) -> Vec<&'a str> {
        self.descriptors()
            .into_iter()
            .map(|descriptor| descriptor.name())
            .unique()
            .collect()
    }
}

/// Read and write access to the attributes of a data block of type `O`. The accessor assumes that it is allowed to
/// mutate the data block, making the data block exclusive is the job of whoever creates the accessor
pub struct MutableAttributeAccessor<'a, O: 'static> {
    owner: Option<&'a mut O>,
    functions: &'static AttributeAccessorFunctions<O>,
}

impl<'a, O: 'static> MutableAttributeAccessor<'a, O> {
    pub fn new(
        owner: Option<&'a mut O>,
        functions: &'static AttributeAccessorFunctions<O>,
    ) -> Self {
        Self { owner, functions }
    }

    /// Read-only view of this accessor
    pub fn as_read(&self) -> AttributeAccessor<'_, O> {
        AttributeAccessor::new(self.owner.as_deref(), self.functions)
    }

    /// Shorthand for `self.as_read().contains(name)`
    pub fn contains(&self, name: &str) -> bool {
        self.as_read().contains(name)
    }

    /// Shorthand for `self.as_read().domain_size(domain)`
    pub fn domain_size(&self, domain: AttributeDomain) -> usize {
        self.as_read().domain_size(domain)
    }

    /// Returns mutable access to the values of the attribute with the given `name`. For builtin attributes with a
    /// change hook, the hook is called once for every call to this function
    /// ```
    /// # use geoset_core::attributes::*;
    /// # use geoset_core::geometry::*;
    /// let mut pointcloud = PointCloud::new(3);
    /// let mut attributes = pointcloud.attributes_for_write();
    /// let mut writer = attributes.lookup_for_write("position").unwrap();
    /// writer.span.fill(&AttributeValue::Float3(nalgebra::Vector3::new(1.0, 2.0, 3.0))).unwrap();
    /// assert_eq!(1, pointcloud.positions_version());
    /// ```
    pub fn lookup_for_write(&mut self, name: &str) -> Option<AttributeWriter<'_>> {
        let owner = self.owner.as_deref_mut()?;
        (self.functions.lookup_for_write)(owner, name)
    }

    /// Returns mutable, strongly typed access to the values of the attribute with the given `name`. Returns `None` if
    /// the attribute does not exist or does not store values of type `T`
    pub fn lookup_for_write_typed<T: AttributeType>(&mut self, name: &str) -> Option<&mut [T]> {
        self.lookup_for_write(name)?.span.into_typed::<T>()
    }

    /// Returns mutable access to the attribute with the given `name`, adding it with the values from `init` first if it
    /// does not exist. Fails if an attribute with that name exists on another domain or with another data type than `T`
    pub fn lookup_or_add_for_write<T: AttributeType>(
        &mut self,
        name: &str,
        domain: AttributeDomain,
        init: AttributeInit,
    ) -> Result<&mut [T]> {
        let existing = self
            .as_read()
            .descriptor(name)
            .map(|descriptor| descriptor.domain_and_type());
        match existing {
            Some(existing) => {
                if existing.domain != domain || existing.data_type != T::data_type() {
                    bail!(
                        "Attribute '{}' exists as {} on the {} domain, but {} on the {} domain was requested",
                        name,
                        existing.data_type,
                        existing.domain,
                        T::data_type(),
                        domain
                    );
                }
            }
            None => self.add(name, domain, T::data_type(), init)?,
        }
        match self.lookup_for_write_typed::<T>(name) {
            Some(values) => Ok(values),
            None => bail!("Attribute '{}' has no values to write", name),
        }
    }

    /// Adds a new attribute. Fails if there is no data block, if the attribute already exists, if `name` is reserved for
    /// a builtin attribute with another domain or data type, or if `domain` is not supported
    pub fn add(
        &mut self,
        name: &str,
        domain: AttributeDomain,
        data_type: AttributeDataType,
        init: AttributeInit,
    ) -> Result<()> {
        match self.owner.as_deref_mut() {
            Some(owner) => (self.functions.add)(owner, name, domain, data_type, init),
            None => bail!("Can't add attribute '{}' without a data block", name),
        }
    }

    /// Removes the attribute with the given `name`. Fails if the attribute does not exist or can't be removed
    pub fn remove(&mut self, name: &str) -> Result<()> {
        match self.owner.as_deref_mut() {
            Some(owner) => (self.functions.remove)(owner, name),
            None => bail!("Can't remove attribute '{}' without a data block", name),
        }
    }

    /// Renames the custom attribute `old_name` to `new_name`
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        match self.owner.as_deref_mut() {
            Some(owner) => (self.functions.rename)(owner, old_name, new_name),
            None => bail!("Can't rename attribute '{}' without a data block", old_name),
        }
    }
}
