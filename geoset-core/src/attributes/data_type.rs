use std::fmt::{Debug, Display};

use nalgebra::{Vector2, Vector3, Vector4};
use static_assertions::const_assert;

use super::{AttributeArray, AttributeValue};

/// Possible data types for the values of a single attribute
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeDataType {
    Float,
    Float2,
    Float3,
    ColorFloat,
    Int8,
    Int32,
    Int2,
    Bool,
}

impl AttributeDataType {
    /// All supported data types
    pub const ALL: [AttributeDataType; 8] = [
        AttributeDataType::Float,
        AttributeDataType::Float2,
        AttributeDataType::Float3,
        AttributeDataType::ColorFloat,
        AttributeDataType::Int8,
        AttributeDataType::Int32,
        AttributeDataType::Int2,
        AttributeDataType::Bool,
    ];

    /// Returns the size in bytes of a single value of this data type
    /// ```
    /// # use geoset_core::attributes::*;
    /// assert_eq!(12, AttributeDataType::Float3.size());
    /// assert_eq!(1, AttributeDataType::Bool.size());
    /// ```
    pub fn size(&self) -> usize {
        match self {
            AttributeDataType::Float => 4,
            AttributeDataType::Float2 => 2 * 4,
            AttributeDataType::Float3 => 3 * 4,
            AttributeDataType::ColorFloat => 4 * 4,
            AttributeDataType::Int8 => 1,
            AttributeDataType::Int32 => 4,
            AttributeDataType::Int2 => 2 * 4,
            AttributeDataType::Bool => 1,
        }
    }

    /// Returns the lowercase name of this data type
    pub fn name(&self) -> &'static str {
        match self {
            AttributeDataType::Float => "float",
            AttributeDataType::Float2 => "float2",
            AttributeDataType::Float3 => "float3",
            AttributeDataType::ColorFloat => "color",
            AttributeDataType::Int8 => "int8",
            AttributeDataType::Int32 => "int32",
            AttributeDataType::Int2 => "int2",
            AttributeDataType::Bool => "bool",
        }
    }
}

impl Display for AttributeDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for all Rust types that can be stored as the values of an attribute. It maps the static Rust type
/// to the dynamic [`AttributeDataType`] and knows how to get at the matching variant of the type-erased
/// [`AttributeArray`] and [`AttributeValue`] containers
pub trait AttributeType:
    Copy + PartialEq + Debug + bytemuck::Zeroable + bytemuck::NoUninit + Send + Sync + 'static
{
    /// The `AttributeDataType` that corresponds to this type
    fn data_type() -> AttributeDataType;
    /// Borrow the values of `array` as a slice of `Self`. Returns `None` if `array` stores another type
    fn slice(array: &AttributeArray) -> Option<&[Self]>;
    /// Mutably borrow the values of `array` as a slice of `Self`. Returns `None` if `array` stores another type
    fn slice_mut(array: &mut AttributeArray) -> Option<&mut [Self]>;
    /// Move the values of `array` out as a `Vec<Self>`. Returns `None` if `array` stores another type
    fn into_vec(array: AttributeArray) -> Option<Vec<Self>>;
    /// Wrap `values` in a type-erased `AttributeArray`
    fn into_array(values: Vec<Self>) -> AttributeArray;
    /// Wrap `self` in a type-erased `AttributeValue`
    fn into_value(self) -> AttributeValue;
    /// Extract a value of type `Self` from `value`. Returns `None` if `value` has another type
    fn from_value(value: &AttributeValue) -> Option<Self>;
}

macro_rules! impl_attribute_type {
    ($type:ty, $variant:ident) => {
        impl AttributeType for $type {
            fn data_type() -> AttributeDataType {
                AttributeDataType::$variant
            }

            fn slice(array: &AttributeArray) -> Option<&[Self]> {
                match array {
                    AttributeArray::$variant(values) => Some(values.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(array: &mut AttributeArray) -> Option<&mut [Self]> {
                match array {
                    AttributeArray::$variant(values) => Some(values.as_mut_slice()),
                    _ => None,
                }
            }

            fn into_vec(array: AttributeArray) -> Option<Vec<Self>> {
                match array {
                    AttributeArray::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn into_array(values: Vec<Self>) -> AttributeArray {
                AttributeArray::$variant(values)
            }

            fn into_value(self) -> AttributeValue {
                AttributeValue::$variant(self)
            }

            fn from_value(value: &AttributeValue) -> Option<Self> {
                match value {
                    AttributeValue::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        }
    };
}

impl_attribute_type!(f32, Float);
impl_attribute_type!(Vector2<f32>, Float2);
impl_attribute_type!(Vector3<f32>, Float3);
impl_attribute_type!(Vector4<f32>, ColorFloat);
impl_attribute_type!(i8, Int8);
impl_attribute_type!(i32, Int32);
impl_attribute_type!(Vector2<i32>, Int2);
impl_attribute_type!(bool, Bool);

// Byte views of attribute storage assume tightly packed vector types
const_assert!(std::mem::size_of::<Vector2<f32>>() == 8);
const_assert!(std::mem::size_of::<Vector3<f32>>() == 12);
const_assert!(std::mem::size_of::<Vector4<f32>>() == 16);
const_assert!(std::mem::size_of::<Vector2<i32>>() == 8);
const_assert!(std::mem::size_of::<bool>() == 1);
