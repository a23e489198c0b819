use std::fmt::Display;

/// The class of geometry elements that an attribute stores one value for. Every attribute lives on
/// exactly one domain, and every geometry kind decides which domains it supports. A point cloud for
/// example only has points, whereas a mesh also has edges, faces and face corners.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeDomain {
    Point,
    Edge,
    Face,
    Corner,
    Curve,
    Instance,
    Layer,
}

impl AttributeDomain {
    /// All domains, in their canonical order
    /// ```
    /// # use geoset_core::attributes::*;
    /// assert_eq!(AttributeDomain::Point, AttributeDomain::ALL[0]);
    /// assert_eq!(7, AttributeDomain::ALL.len());
    /// ```
    pub const ALL: [AttributeDomain; 7] = [
        AttributeDomain::Point,
        AttributeDomain::Edge,
        AttributeDomain::Face,
        AttributeDomain::Corner,
        AttributeDomain::Curve,
        AttributeDomain::Instance,
        AttributeDomain::Layer,
    ];

    /// Returns the lowercase name of this domain
    pub fn name(&self) -> &'static str {
        match self {
            AttributeDomain::Point => "point",
            AttributeDomain::Edge => "edge",
            AttributeDomain::Face => "face",
            AttributeDomain::Corner => "corner",
            AttributeDomain::Curve => "curve",
            AttributeDomain::Instance => "instance",
            AttributeDomain::Layer => "layer",
        }
    }
}

impl Display for AttributeDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
