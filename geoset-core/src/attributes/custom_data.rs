use anyhow::{bail, Result};
use log::debug;

use super::{AttributeArray, AttributeDataType};

/// A single named column of attribute values inside a [`CustomData`] table
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDataLayer {
    name: String,
    data: AttributeArray,
}

impl CustomDataLayer {
    /// Returns the name of this layer
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type of the values in this layer
    pub fn data_type(&self) -> AttributeDataType {
        self.data.data_type()
    }

    /// Returns the values of this layer
    pub fn data(&self) -> &AttributeArray {
        &self.data
    }

    /// Returns the values of this layer mutably
    pub fn data_mut(&mut self) -> &mut AttributeArray {
        &mut self.data
    }
}

/// Storage table for all attribute data of one domain of a data block. Each layer is a named column that stores
/// one value per element. The table itself does not know how many elements its owner has, so keeping all layers
/// at the element count of the owner is up to the owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomData {
    layers: Vec<CustomDataLayer>,
}

impl CustomData {
    /// Creates a new empty `CustomData` table
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if there are no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterate over all layers in the order in which they were added
    pub fn layers(&self) -> impl Iterator<Item = &CustomDataLayer> + '_ {
        self.layers.iter()
    }

    /// Returns `true` if there is a layer with the given `name`
    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.name == name)
    }

    /// Returns the layer with the given `name`, if it exists
    pub fn get_layer(&self, name: &str) -> Option<&CustomDataLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Returns the layer with the given `name` mutably, if it exists
    pub fn get_layer_mut(&mut self, name: &str) -> Option<&mut CustomDataLayer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    /// Adds a new layer with the given `name` and values. Fails if `name` is empty or a layer with the same name
    /// already exists
    /// ```
    /// # use geoset_core::attributes::*;
    /// let mut custom_data = CustomData::new();
    /// custom_data.add_layer("weight", AttributeArray::new(AttributeDataType::Float, 8)).unwrap();
    /// assert!(custom_data.has_layer("weight"));
    /// assert!(custom_data.add_layer("weight", AttributeArray::new(AttributeDataType::Int32, 8)).is_err());
    /// ```
    pub fn add_layer(&mut self, name: &str, data: AttributeArray) -> Result<()> {
        if name.is_empty() {
            bail!("Attribute layers must have a name");
        }
        if self.has_layer(name) {
            bail!("An attribute layer named '{}' already exists", name);
        }
        debug!(
            "Adding attribute layer '{}' ({}, {} values)",
            name,
            data.data_type(),
            data.len()
        );
        self.layers.push(CustomDataLayer {
            name: name.to_owned(),
            data,
        });
        Ok(())
    }

    /// Stores `data` under `name`, replacing the values of an existing layer with the same name
    pub(crate) fn insert_layer(&mut self, name: &str, data: AttributeArray) {
        match self.get_layer_mut(name) {
            Some(layer) => layer.data = data,
            None => self.layers.push(CustomDataLayer {
                name: name.to_owned(),
                data,
            }),
        }
    }

    /// Removes the layer with the given `name`. Returns `false` if no such layer exists
    pub fn remove_layer(&mut self, name: &str) -> bool {
        match self.layers.iter().position(|layer| layer.name == name) {
            Some(index) => {
                debug!("Removing attribute layer '{}'", name);
                self.layers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Renames the layer `old_name` to `new_name`. Fails if there is no layer `old_name`, or if `new_name` is
    /// empty or already taken
    pub fn rename_layer(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if new_name.is_empty() {
            bail!("Attribute layers must have a name");
        }
        if !self.has_layer(old_name) {
            bail!("There is no attribute layer named '{}'", old_name);
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.has_layer(new_name) {
            bail!("An attribute layer named '{}' already exists", new_name);
        }
        match self.get_layer_mut(old_name) {
            Some(layer) => {
                debug!("Renaming attribute layer '{}' to '{}'", old_name, new_name);
                layer.name = new_name.to_owned();
                Ok(())
            }
            None => bail!("There is no attribute layer named '{}'", old_name),
        }
    }

    /// Resizes all layers to `len` values. New values are zero
    pub fn resize(&mut self, len: usize) {
        for layer in self.layers.iter_mut() {
            layer.data.resize(len);
        }
    }
}

/// The functions through which attribute providers reach the `CustomData` of an owner of type `O`. This is the
/// only place where providers learn about the concrete layout of the data block they operate on.
pub struct CustomDataAccessInfo<O> {
    pub get_custom_data: fn(&mut O) -> &mut CustomData,
    pub get_const_custom_data: fn(&O) -> &CustomData,
    pub get_element_num: fn(&O) -> usize,
}

impl<O> Clone for CustomDataAccessInfo<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for CustomDataAccessInfo<O> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_data_with_layers(names: &[&str]) -> Result<CustomData> {
        let mut custom_data = CustomData::new();
        for name in names {
            custom_data.add_layer(name, AttributeArray::new(AttributeDataType::Float, 4))?;
        }
        Ok(custom_data)
    }

    #[test]
    fn test_layers_keep_insertion_order() -> Result<()> {
        let custom_data = custom_data_with_layers(&["b", "a", "c"])?;
        let names = custom_data
            .layers()
            .map(|layer| layer.name())
            .collect::<Vec<_>>();
        assert_eq!(vec!["b", "a", "c"], names);
        Ok(())
    }

    #[test]
    fn test_add_layer_rejects_empty_name() {
        let mut custom_data = CustomData::new();
        assert!(custom_data
            .add_layer("", AttributeArray::new(AttributeDataType::Bool, 1))
            .is_err());
        assert!(custom_data.is_empty());
    }

    #[test]
    fn test_remove_layer() -> Result<()> {
        let mut custom_data = custom_data_with_layers(&["a", "b"])?;
        assert!(custom_data.remove_layer("a"));
        assert!(!custom_data.remove_layer("a"));
        assert!(!custom_data.has_layer("a"));
        assert_eq!(1, custom_data.len());
        Ok(())
    }

    #[test]
    fn test_rename_layer() -> Result<()> {
        let mut custom_data = custom_data_with_layers(&["a", "b"])?;
        custom_data.rename_layer("a", "c")?;
        assert!(custom_data.has_layer("c"));
        assert!(!custom_data.has_layer("a"));
        assert!(custom_data.rename_layer("c", "b").is_err());
        assert!(custom_data.rename_layer("missing", "d").is_err());
        assert!(custom_data.rename_layer("c", "").is_err());
        Ok(())
    }

    #[test]
    fn test_rename_layer_to_same_name() -> Result<()> {
        let mut custom_data = custom_data_with_layers(&["a"])?;
        custom_data.rename_layer("a", "a")?;
        assert!(custom_data.has_layer("a"));
        assert!(custom_data.rename_layer("missing", "missing").is_err());
        Ok(())
    }

    #[test]
    fn test_resize_resizes_all_layers() -> Result<()> {
        let mut custom_data = custom_data_with_layers(&["a", "b"])?;
        custom_data.resize(9);
        assert!(custom_data.layers().all(|layer| layer.data().len() == 9));
        Ok(())
    }
}
