//! A data block (e.g. a [`PointCloud`]) stores the elements and attributes of one geometry. Components wrap a data
//! block together with an ownership tag, which decides whether the component may mutate the data block in place or has
//! to copy it first.

use std::sync::Arc;

use log::debug;

mod pointcloud;
pub use self::pointcloud::*;

mod pointcloud_component;
pub use self::pointcloud_component::*;

/// How a component relates to the data block it references
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryOwnershipType {
    /// The component owns the data block exclusively and may mutate it in place
    Owned,
    /// The data block is owned by someone else. It must not be mutated, writes copy it first
    ReadOnly,
    /// The data block is shared with other components. It must not be mutated, writes copy it first
    Shared,
}

/// Lifecycle operations that a data block has to provide so that components can manage it
pub trait GeometryBlock {
    /// Creates a deep copy of this data block that is independent from the original
    fn copy_for_eval(&self) -> Box<Self>;
}

/// A data block together with the way in which it is owned. Only [`Owned`](DataBlock::Owned) blocks can be mutated,
/// all other variants have to be copied through [`make_owned`](DataBlock::make_owned) first
#[derive(Debug)]
pub enum DataBlock<T> {
    Owned(Box<T>),
    ReadOnly(Arc<T>),
    Shared(Arc<T>),
}

impl<T: GeometryBlock> DataBlock<T> {
    /// Creates a new data block that is owned exclusively
    pub fn owned(block: T) -> Self {
        DataBlock::Owned(Box::new(block))
    }

    /// Returns the ownership tag of this data block
    pub fn ownership(&self) -> GeometryOwnershipType {
        match self {
            DataBlock::Owned(_) => GeometryOwnershipType::Owned,
            DataBlock::ReadOnly(_) => GeometryOwnershipType::ReadOnly,
            DataBlock::Shared(_) => GeometryOwnershipType::Shared,
        }
    }

    /// Shared access to the data block
    pub fn get(&self) -> &T {
        match self {
            DataBlock::Owned(block) => &**block,
            DataBlock::ReadOnly(block) | DataBlock::Shared(block) => &**block,
        }
    }

    /// Turns this data block into an owned one by copying a read-only or shared data block. Does nothing if the data
    /// block is owned already
    pub fn make_owned(&mut self) -> &mut T {
        if let DataBlock::ReadOnly(block) | DataBlock::Shared(block) = self {
            let copy = block.copy_for_eval();
            debug!(
                "Copied {:?} data block before writing to it",
                self.ownership()
            );
            *self = DataBlock::Owned(copy);
        }
        match self {
            DataBlock::Owned(block) => &mut **block,
            _ => unreachable!("data block was made owned above"),
        }
    }

    /// Returns a deep copy of the data block that is owned exclusively
    pub fn copy_owned(&self) -> Self {
        DataBlock::Owned(self.get().copy_for_eval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_tags() {
        assert_eq!(
            GeometryOwnershipType::Owned,
            DataBlock::owned(PointCloud::new(2)).ownership()
        );
        let shared = DataBlock::Shared(Arc::new(PointCloud::new(2)));
        assert_eq!(GeometryOwnershipType::Shared, shared.ownership());
        assert_eq!(
            GeometryOwnershipType::Owned,
            shared.copy_owned().ownership()
        );
    }

    #[test]
    fn test_make_owned_keeps_owned_block() {
        let mut block = DataBlock::owned(PointCloud::new(1));
        let address: *const PointCloud = block.get();
        let owned: *const PointCloud = block.make_owned();
        assert_eq!(address, owned);
    }

    #[test]
    fn test_make_owned_copies_once() {
        let original = Arc::new(PointCloud::new(4));
        let mut block = DataBlock::ReadOnly(original.clone());
        let first: *const PointCloud = block.make_owned();
        let second: *const PointCloud = block.make_owned();
        assert_eq!(first, second);
        assert_ne!(Arc::as_ptr(&original), first);
        assert_eq!(GeometryOwnershipType::Owned, block.ownership());
        assert_eq!(1, Arc::strong_count(&original));
    }
}
