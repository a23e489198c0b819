//! Implicit conversions between attribute data types. When an attribute is requested with a different data type
//! than the one it is stored in, its values are converted on the fly into a new owned virtual array. Conversions
//! exist between the scalar types (`float`, `int8`, `int32`, `bool`) and between the vector types where a sensible
//! mapping exists (e.g. `float2` <-> `float3` by dropping or zero-filling the last component).

use lazy_static::lazy_static;
use nalgebra::{Vector2, Vector3, Vector4};
use num_traits::AsPrimitive;
use std::collections::HashMap;

use super::{AttributeArray, AttributeDataType, AttributeType, GVArray};

/// Function pointer type for functions that convert all values of a virtual array into another data type.
/// Returns `None` if the values of the virtual array do not have the source type of the conversion.
pub type AttributeConversionFn = fn(&GVArray<'_>) -> Option<AttributeArray>;

fn map_values<From: AttributeType, To: AttributeType>(
    values: &GVArray<'_>,
    map: impl Fn(From) -> To,
) -> Option<AttributeArray> {
    let values = values.typed::<From>()?;
    Some(To::into_array(values.iter().map(map).collect()))
}

/// Conversion between scalar values using `as`
fn convert_scalar_using_as<From, To>(values: &GVArray<'_>) -> Option<AttributeArray>
where
    From: AttributeType + AsPrimitive<To>,
    To: AttributeType,
{
    map_values::<From, To>(values, |value| value.as_())
}

fn convert_to_bool<From>(values: &GVArray<'_>) -> Option<AttributeArray>
where
    From: AttributeType,
{
    let zero: From = bytemuck::Zeroable::zeroed();
    map_values::<From, bool>(values, |value| value != zero)
}

fn convert_from_bool<To>(values: &GVArray<'_>) -> Option<AttributeArray>
where
    To: AttributeType,
    u8: AsPrimitive<To>,
{
    map_values::<bool, To>(values, |value| (value as u8).as_())
}

fn float2_to_float3(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector2<f32>, Vector3<f32>>(values, |value| Vector3::new(value.x, value.y, 0.0))
}

fn float3_to_float2(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector3<f32>, Vector2<f32>>(values, |value| value.xy())
}

fn float_to_float2(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<f32, Vector2<f32>>(values, Vector2::repeat)
}

fn float_to_float3(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<f32, Vector3<f32>>(values, Vector3::repeat)
}

fn float2_to_float(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector2<f32>, f32>(values, |value| value.mean())
}

fn float3_to_float(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector3<f32>, f32>(values, |value| value.mean())
}

fn float3_to_color(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector3<f32>, Vector4<f32>>(values, |value| {
        Vector4::new(value.x, value.y, value.z, 1.0)
    })
}

fn color_to_float3(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector4<f32>, Vector3<f32>>(values, |value| value.xyz())
}

fn float_to_color(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<f32, Vector4<f32>>(values, |value| Vector4::new(value, value, value, 1.0))
}

fn color_to_float(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector4<f32>, f32>(values, |value| value.xyz().mean())
}

fn int2_to_float2(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector2<i32>, Vector2<f32>>(values, |value| value.map(|c| c as f32))
}

fn float2_to_int2(values: &GVArray<'_>) -> Option<AttributeArray> {
    map_values::<Vector2<f32>, Vector2<i32>>(values, |value| value.map(|c| c as i32))
}

macro_rules! insert_scalar_converter_using_as {
    ($prim_from:ident, $prim_to:ident, $type_from:ident, $type_to:ident, $map:expr) => {
        // Insert symmetric conversion function from<->to and assert that they are unique
        assert!(($map)
            .insert(
                (AttributeDataType::$type_from, AttributeDataType::$type_to),
                convert_scalar_using_as::<$prim_from, $prim_to> as AttributeConversionFn,
            )
            .is_none());
        assert!(($map)
            .insert(
                (AttributeDataType::$type_to, AttributeDataType::$type_from),
                convert_scalar_using_as::<$prim_to, $prim_from> as AttributeConversionFn,
            )
            .is_none());
    };
}

macro_rules! insert_bool_converter {
    ($prim:ident, $type:ident, $map:expr) => {
        assert!(($map)
            .insert(
                (AttributeDataType::$type, AttributeDataType::Bool),
                convert_to_bool::<$prim> as AttributeConversionFn,
            )
            .is_none());
        assert!(($map)
            .insert(
                (AttributeDataType::Bool, AttributeDataType::$type),
                convert_from_bool::<$prim> as AttributeConversionFn,
            )
            .is_none());
    };
}

macro_rules! insert_converter {
    ($type_from:ident, $type_to:ident, $fn:expr, $map:expr) => {
        assert!(($map)
            .insert(
                (AttributeDataType::$type_from, AttributeDataType::$type_to),
                $fn as AttributeConversionFn,
            )
            .is_none());
    };
}

/// Returns the function that converts values of type `from_type` into `to_type`. Returns `None` if both types are
/// equal or if there is no implicit conversion between the two types
/// ```
/// # use geoset_core::attributes::*;
/// # use geoset_core::attributes::conversion::get_converter;
/// assert!(get_converter(AttributeDataType::Float, AttributeDataType::Int32).is_some());
/// assert!(get_converter(AttributeDataType::Float, AttributeDataType::Float).is_none());
/// assert!(get_converter(AttributeDataType::Float3, AttributeDataType::Bool).is_none());
/// ```
pub fn get_converter(
    from_type: AttributeDataType,
    to_type: AttributeDataType,
) -> Option<AttributeConversionFn> {
    lazy_static! {
        static ref IMPLICIT_CONVERSIONS: HashMap<(AttributeDataType, AttributeDataType), AttributeConversionFn> = {
            let mut converters =
                HashMap::<(AttributeDataType, AttributeDataType), AttributeConversionFn>::new();
            insert_scalar_converter_using_as!(f32, i32, Float, Int32, converters);
            insert_scalar_converter_using_as!(f32, i8, Float, Int8, converters);
            insert_scalar_converter_using_as!(i32, i8, Int32, Int8, converters);

            insert_bool_converter!(f32, Float, converters);
            insert_bool_converter!(i32, Int32, converters);
            insert_bool_converter!(i8, Int8, converters);

            insert_converter!(Float2, Float3, float2_to_float3, converters);
            insert_converter!(Float3, Float2, float3_to_float2, converters);
            insert_converter!(Float, Float2, float_to_float2, converters);
            insert_converter!(Float2, Float, float2_to_float, converters);
            insert_converter!(Float, Float3, float_to_float3, converters);
            insert_converter!(Float3, Float, float3_to_float, converters);
            insert_converter!(Float3, ColorFloat, float3_to_color, converters);
            insert_converter!(ColorFloat, Float3, color_to_float3, converters);
            insert_converter!(Float, ColorFloat, float_to_color, converters);
            insert_converter!(ColorFloat, Float, color_to_float, converters);
            insert_converter!(Int2, Float2, int2_to_float2, converters);
            insert_converter!(Float2, Int2, float2_to_int2, converters);

            converters
        };
    }

    if from_type == to_type {
        return None;
    }
    IMPLICIT_CONVERSIONS.get(&(from_type, to_type)).copied()
}

/// Returns `true` if values of `from_type` can be read as `to_type`, either because the types are equal or because
/// an implicit conversion exists
pub fn can_convert(from_type: AttributeDataType, to_type: AttributeDataType) -> bool {
    from_type == to_type || get_converter(from_type, to_type).is_some()
}

/// Converts `values` into the data type `to_type`. Values that already have the requested type are passed through
/// unchanged. Returns `None` if no implicit conversion into `to_type` exists
pub fn convert<'a>(values: GVArray<'a>, to_type: AttributeDataType) -> Option<GVArray<'a>> {
    let from_type = values.data_type();
    if from_type == to_type {
        return Some(values);
    }
    let converter = get_converter(from_type, to_type)?;
    if let GVArray::Single { value, len } = values {
        if len > 0 {
            // Converting one value is enough, the result stays a single value
            let one = GVArray::Single { value, len: 1 };
            let value = converter(&one)?.get(0)?;
            return Some(GVArray::Single { value, len });
        }
    }
    converter(&values).map(GVArray::Owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;

    #[test]
    fn test_float_to_int32() {
        let array = AttributeArray::from_vec(vec![1.7f32, -2.2, 0.0]);
        let converted = convert(GVArray::Span(&array), AttributeDataType::Int32).unwrap();
        assert_eq!(AttributeDataType::Int32, converted.data_type());
        assert_eq!(vec![1, -2, 0], converted.typed::<i32>().unwrap().to_vec());
    }

    #[test]
    fn test_bool_conversions() {
        let array = AttributeArray::from_vec(vec![0i32, 5, -1]);
        let as_bool = convert(GVArray::Span(&array), AttributeDataType::Bool).unwrap();
        assert_eq!(
            vec![false, true, true],
            as_bool.typed::<bool>().unwrap().to_vec()
        );
        let back = convert(as_bool, AttributeDataType::Float).unwrap();
        assert_eq!(vec![0.0, 1.0, 1.0], back.typed::<f32>().unwrap().to_vec());
    }

    #[test]
    fn test_vector_conversions() {
        let array = AttributeArray::from_vec(vec![Vector3::new(1.0f32, 2.0, 3.0)]);
        let float2 = convert(GVArray::Span(&array), AttributeDataType::Float2).unwrap();
        assert_eq!(
            Some(AttributeValue::Float2(Vector2::new(1.0, 2.0))),
            float2.get(0)
        );
        let float = convert(GVArray::Span(&array), AttributeDataType::Float).unwrap();
        assert_eq!(Some(AttributeValue::Float(2.0)), float.get(0));
        let color = convert(GVArray::Span(&array), AttributeDataType::ColorFloat).unwrap();
        assert_eq!(
            Some(AttributeValue::ColorFloat(Vector4::new(1.0, 2.0, 3.0, 1.0))),
            color.get(0)
        );
    }

    #[test]
    fn test_single_stays_single() {
        let single = GVArray::Single {
            value: AttributeValue::Float(2.5),
            len: 10,
        };
        let converted = convert(single, AttributeDataType::Int32).unwrap();
        assert!(converted.is_single());
        assert_eq!(10, converted.len());
        assert_eq!(Some(AttributeValue::Int32(2)), converted.get(9));
    }

    #[test]
    fn test_missing_conversion() {
        let array = AttributeArray::new(AttributeDataType::Int2, 2);
        assert!(convert(GVArray::Span(&array), AttributeDataType::Bool).is_none());
        assert!(!can_convert(AttributeDataType::Int2, AttributeDataType::Bool));
        assert!(can_convert(AttributeDataType::Int2, AttributeDataType::Int2));
    }
}
