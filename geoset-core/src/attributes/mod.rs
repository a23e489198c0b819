//! Named, typed per-element attributes of geometries, and the machinery to read and write them without knowing how
//! a geometry stores them.

mod domain;
pub use self::domain::*;

mod data_type;
pub use self::data_type::*;

mod array;
pub use self::array::*;

mod varray;
pub use self::varray::*;

mod descriptor;
pub use self::descriptor::*;

mod custom_data;
pub use self::custom_data::*;

pub mod conversion;

mod providers;
pub use self::providers::*;

mod accessor;
pub use self::accessor::*;
