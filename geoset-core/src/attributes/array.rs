use anyhow::{bail, Result};
use bytemuck::Zeroable;
use nalgebra::{Vector2, Vector3, Vector4};

use super::{AttributeDataType, AttributeType};

/// Runs `$body` with `$values` bound to the typed vector inside the `AttributeArray` `$array`
macro_rules! with_typed_values {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            AttributeArray::Float($values) => $body,
            AttributeArray::Float2($values) => $body,
            AttributeArray::Float3($values) => $body,
            AttributeArray::ColorFloat($values) => $body,
            AttributeArray::Int8($values) => $body,
            AttributeArray::Int32($values) => $body,
            AttributeArray::Int2($values) => $body,
            AttributeArray::Bool($values) => $body,
        }
    };
}

/// A single, dynamically typed attribute value
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Float2(Vector2<f32>),
    Float3(Vector3<f32>),
    ColorFloat(Vector4<f32>),
    Int8(i8),
    Int32(i32),
    Int2(Vector2<i32>),
    Bool(bool),
}

impl AttributeValue {
    /// Returns the zero value of the given `data_type`. This is the value that new attributes are filled with
    /// ```
    /// # use geoset_core::attributes::*;
    /// assert_eq!(AttributeValue::Float(0.0), AttributeValue::zeroed(AttributeDataType::Float));
    /// assert_eq!(AttributeValue::Bool(false), AttributeValue::zeroed(AttributeDataType::Bool));
    /// ```
    pub fn zeroed(data_type: AttributeDataType) -> Self {
        match data_type {
            AttributeDataType::Float => AttributeValue::Float(Zeroable::zeroed()),
            AttributeDataType::Float2 => AttributeValue::Float2(Zeroable::zeroed()),
            AttributeDataType::Float3 => AttributeValue::Float3(Zeroable::zeroed()),
            AttributeDataType::ColorFloat => AttributeValue::ColorFloat(Zeroable::zeroed()),
            AttributeDataType::Int8 => AttributeValue::Int8(Zeroable::zeroed()),
            AttributeDataType::Int32 => AttributeValue::Int32(Zeroable::zeroed()),
            AttributeDataType::Int2 => AttributeValue::Int2(Zeroable::zeroed()),
            AttributeDataType::Bool => AttributeValue::Bool(Zeroable::zeroed()),
        }
    }

    /// Returns the data type of this value
    pub fn data_type(&self) -> AttributeDataType {
        match self {
            AttributeValue::Float(_) => AttributeDataType::Float,
            AttributeValue::Float2(_) => AttributeDataType::Float2,
            AttributeValue::Float3(_) => AttributeDataType::Float3,
            AttributeValue::ColorFloat(_) => AttributeDataType::ColorFloat,
            AttributeValue::Int8(_) => AttributeDataType::Int8,
            AttributeValue::Int32(_) => AttributeDataType::Int32,
            AttributeValue::Int2(_) => AttributeDataType::Int2,
            AttributeValue::Bool(_) => AttributeDataType::Bool,
        }
    }

    /// Returns the value as `T`, or `None` if the value has a different type
    pub fn get<T: AttributeType>(&self) -> Option<T> {
        T::from_value(self)
    }
}

/// Owning storage for the values of a single attribute. Values are stored in a strongly typed `Vec`, the
/// data type is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArray {
    Float(Vec<f32>),
    Float2(Vec<Vector2<f32>>),
    Float3(Vec<Vector3<f32>>),
    ColorFloat(Vec<Vector4<f32>>),
    Int8(Vec<i8>),
    Int32(Vec<i32>),
    Int2(Vec<Vector2<i32>>),
    Bool(Vec<bool>),
}

impl AttributeArray {
    /// Creates a new `AttributeArray` for `len` values of the given `data_type`. All values are zero
    /// ```
    /// # use geoset_core::attributes::*;
    /// let array = AttributeArray::new(AttributeDataType::Int32, 4);
    /// assert_eq!(4, array.len());
    /// assert_eq!(Some(&[0, 0, 0, 0][..]), array.typed::<i32>());
    /// ```
    pub fn new(data_type: AttributeDataType, len: usize) -> Self {
        Self::from_value(&AttributeValue::zeroed(data_type), len)
    }

    /// Creates a new `AttributeArray` that stores `len` copies of `value`
    pub fn from_value(value: &AttributeValue, len: usize) -> Self {
        match value {
            AttributeValue::Float(value) => AttributeArray::Float(vec![*value; len]),
            AttributeValue::Float2(value) => AttributeArray::Float2(vec![*value; len]),
            AttributeValue::Float3(value) => AttributeArray::Float3(vec![*value; len]),
            AttributeValue::ColorFloat(value) => AttributeArray::ColorFloat(vec![*value; len]),
            AttributeValue::Int8(value) => AttributeArray::Int8(vec![*value; len]),
            AttributeValue::Int32(value) => AttributeArray::Int32(vec![*value; len]),
            AttributeValue::Int2(value) => AttributeArray::Int2(vec![*value; len]),
            AttributeValue::Bool(value) => AttributeArray::Bool(vec![*value; len]),
        }
    }

    /// Creates a new `AttributeArray` from the given strongly typed values
    pub fn from_vec<T: AttributeType>(values: Vec<T>) -> Self {
        T::into_array(values)
    }

    /// Returns the data type of the values in this array
    pub fn data_type(&self) -> AttributeDataType {
        match self {
            AttributeArray::Float(_) => AttributeDataType::Float,
            AttributeArray::Float2(_) => AttributeDataType::Float2,
            AttributeArray::Float3(_) => AttributeDataType::Float3,
            AttributeArray::ColorFloat(_) => AttributeDataType::ColorFloat,
            AttributeArray::Int8(_) => AttributeDataType::Int8,
            AttributeArray::Int32(_) => AttributeDataType::Int32,
            AttributeArray::Int2(_) => AttributeDataType::Int2,
            AttributeArray::Bool(_) => AttributeDataType::Bool,
        }
    }

    /// Returns the number of values in this array
    pub fn len(&self) -> usize {
        with_typed_values!(self, values => values.len())
    }

    /// Returns `true` if this array stores no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the values as a `&[T]`. Returns `None` if `T` does not match the data type of this array
    pub fn typed<T: AttributeType>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Borrow the values as a `&mut [T]`. Returns `None` if `T` does not match the data type of this array
    pub fn typed_mut<T: AttributeType>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(self)
    }

    /// Returns the value at `index`, or `None` if `index` is out of bounds
    pub fn get(&self, index: usize) -> Option<AttributeValue> {
        with_typed_values!(self, values => values.get(index).map(|value| value.into_value()))
    }

    /// Sets the value at `index`. Fails if `index` is out of bounds or if `value` has a different data type
    pub fn set(&mut self, index: usize, value: &AttributeValue) -> Result<()> {
        if index >= self.len() {
            bail!(
                "Index {} is out of bounds for attribute array of length {}",
                index,
                self.len()
            );
        }
        if value.data_type() != self.data_type() {
            bail!(
                "Can't store a {} value in an attribute array of type {}",
                value.data_type(),
                self.data_type()
            );
        }
        with_typed_values!(self, values => {
            if let Some(value) = AttributeType::from_value(value) {
                values[index] = value;
            }
        });
        Ok(())
    }

    /// Sets all values in this array to `value`. Fails if `value` has a different data type
    pub fn fill(&mut self, value: &AttributeValue) -> Result<()> {
        if value.data_type() != self.data_type() {
            bail!(
                "Can't fill an attribute array of type {} with a {} value",
                self.data_type(),
                value.data_type()
            );
        }
        *self = Self::from_value(value, self.len());
        Ok(())
    }

    /// Resizes this array to `new_len` values. New values are zero
    pub fn resize(&mut self, new_len: usize) {
        with_typed_values!(self, values => values.resize(new_len, Zeroable::zeroed()))
    }

    /// Returns the raw memory of the values in this array
    /// ```
    /// # use geoset_core::attributes::*;
    /// let array = AttributeArray::new(AttributeDataType::Float3, 2);
    /// assert_eq!(24, array.as_bytes().len());
    /// ```
    pub fn as_bytes(&self) -> &[u8] {
        with_typed_values!(self, values => bytemuck::cast_slice(values.as_slice()))
    }
}
