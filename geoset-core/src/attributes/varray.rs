//! Virtual arrays are the read-only views through which attribute values are handed out to callers. A virtual
//! array either borrows the storage of an attribute directly, stores a single value that is repeated for every
//! element, or owns values that were computed on the fly (e.g. after a data type conversion). Callers never get
//! to see the storage of a data block itself, only one of these views.

use super::{AttributeArray, AttributeDataType, AttributeType, AttributeValue};

/// Read-only, type-erased virtual array of attribute values
#[derive(Debug, Clone, PartialEq)]
pub enum GVArray<'a> {
    /// Borrows attribute storage
    Span(&'a AttributeArray),
    /// `len` copies of the same value
    Single { value: AttributeValue, len: usize },
    /// Values that were computed and are owned by the virtual array
    Owned(AttributeArray),
}

impl<'a> GVArray<'a> {
    /// Returns the data type of the values in this virtual array
    pub fn data_type(&self) -> AttributeDataType {
        match self {
            GVArray::Span(array) => array.data_type(),
            GVArray::Single { value, .. } => value.data_type(),
            GVArray::Owned(array) => array.data_type(),
        }
    }

    /// Returns the number of values
    pub fn len(&self) -> usize {
        match self {
            GVArray::Span(array) => array.len(),
            GVArray::Single { len, .. } => *len,
            GVArray::Owned(array) => array.len(),
        }
    }

    /// Returns `true` if this virtual array has no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if all values of this virtual array are the same value
    pub fn is_single(&self) -> bool {
        matches!(self, GVArray::Single { .. })
    }

    /// Returns the underlying storage if this virtual array borrows or owns contiguous memory
    pub fn as_array(&self) -> Option<&AttributeArray> {
        match self {
            GVArray::Span(array) => Some(*array),
            GVArray::Single { .. } => None,
            GVArray::Owned(array) => Some(array),
        }
    }

    /// Returns the value at `index`, or `None` if `index` is out of bounds
    pub fn get(&self, index: usize) -> Option<AttributeValue> {
        match self {
            GVArray::Span(array) => array.get(index),
            GVArray::Single { value, len } => (index < *len).then_some(*value),
            GVArray::Owned(array) => array.get(index),
        }
    }

    /// Returns a strongly typed view of this virtual array that borrows from `self`. Returns `None` if `T` does not
    /// match the data type of this virtual array
    /// ```
    /// # use geoset_core::attributes::*;
    /// let array = AttributeArray::from_vec(vec![1.0f32, 2.0]);
    /// let varray = GVArray::Span(&array);
    /// assert_eq!(vec![1.0, 2.0], varray.typed::<f32>().unwrap().to_vec());
    /// assert!(varray.typed::<i32>().is_none());
    /// ```
    pub fn typed<T: AttributeType>(&self) -> Option<VArray<'_, T>> {
        match self {
            GVArray::Span(array) => array.typed::<T>().map(VArray::Span),
            GVArray::Single { value, len } => T::from_value(value).map(|value| VArray::Single {
                value,
                len: *len,
            }),
            GVArray::Owned(array) => array.typed::<T>().map(VArray::Span),
        }
    }

    /// Like [`typed`](GVArray::typed), but consumes the virtual array so that borrowed storage keeps its full
    /// lifetime
    pub fn into_typed<T: AttributeType>(self) -> Option<VArray<'a, T>> {
        match self {
            GVArray::Span(array) => array.typed::<T>().map(VArray::Span),
            GVArray::Single { value, len } => {
                T::from_value(&value).map(|value| VArray::Single { value, len })
            }
            GVArray::Owned(array) => T::into_vec(array).map(VArray::Owned),
        }
    }

    /// Copies all values into a new `AttributeArray`
    pub fn materialize(&self) -> AttributeArray {
        match self {
            GVArray::Span(array) => (*array).clone(),
            GVArray::Single { value, len } => AttributeArray::from_value(value, *len),
            GVArray::Owned(array) => array.clone(),
        }
    }
}

/// Read-only, strongly typed virtual array
#[derive(Debug, Clone, PartialEq)]
pub enum VArray<'a, T: AttributeType> {
    Span(&'a [T]),
    Single { value: T, len: usize },
    Owned(Vec<T>),
}

impl<'a, T: AttributeType> VArray<'a, T> {
    /// Returns the number of values
    pub fn len(&self) -> usize {
        match self {
            VArray::Span(values) => values.len(),
            VArray::Single { len, .. } => *len,
            VArray::Owned(values) => values.len(),
        }
    }

    /// Returns `true` if this virtual array has no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value at `index`, or `None` if `index` is out of bounds
    pub fn get(&self, index: usize) -> Option<T> {
        match self {
            VArray::Span(values) => values.get(index).copied(),
            VArray::Single { value, len } => (index < *len).then_some(*value),
            VArray::Owned(values) => values.get(index).copied(),
        }
    }

    /// Returns the single value if all values are the same by construction
    pub fn single(&self) -> Option<T> {
        match self {
            VArray::Single { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns the values as a slice if they are stored contiguously
    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            VArray::Span(values) => Some(*values),
            VArray::Single { .. } => None,
            VArray::Owned(values) => Some(values.as_slice()),
        }
    }

    /// Iterate over all values by value
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }

    /// Copies all values into a `Vec`
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            VArray::Span(values) => values.to_vec(),
            VArray::Single { value, len } => vec![*value; *len],
            VArray::Owned(values) => values.clone(),
        }
    }
}

/// Mutable, type-erased view of the values of an attribute. The number of values can't be changed through this
/// view, since all attributes on a domain must have the same length
#[derive(Debug, PartialEq)]
pub struct GMutableSpan<'a> {
    array: &'a mut AttributeArray,
}

impl<'a> GMutableSpan<'a> {
    pub(crate) fn new(array: &'a mut AttributeArray) -> Self {
        Self { array }
    }

    /// Returns the data type of the values
    pub fn data_type(&self) -> AttributeDataType {
        self.array.data_type()
    }

    /// Returns the number of values
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns `true` if there are no values
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Returns the value at `index`, or `None` if `index` is out of bounds
    pub fn get(&self, index: usize) -> Option<AttributeValue> {
        self.array.get(index)
    }

    /// Sets the value at `index`. Fails if `index` is out of bounds or `value` has the wrong data type
    pub fn set(&mut self, index: usize, value: &AttributeValue) -> anyhow::Result<()> {
        self.array.set(index, value)
    }

    /// Sets all values to `value`. Fails if `value` has the wrong data type
    pub fn fill(&mut self, value: &AttributeValue) -> anyhow::Result<()> {
        self.array.fill(value)
    }

    /// Read-only access to the values
    pub fn as_varray(&self) -> GVArray<'_> {
        GVArray::Span(&*self.array)
    }

    /// Mutable, strongly typed access to the values that borrows from `self`
    pub fn typed_mut<T: AttributeType>(&mut self) -> Option<&mut [T]> {
        self.array.typed_mut::<T>()
    }

    /// Mutable, strongly typed access to the values for the full lifetime of the underlying storage
    pub fn into_typed<T: AttributeType>(self) -> Option<&'a mut [T]> {
        T::slice_mut(self.array)
    }
}
