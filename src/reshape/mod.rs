//! Tree reshaping - recursive sorting and name/children encoding

pub mod sort;
pub mod encode;

pub use sort::{sort, sort_value, SortOrder};
pub use encode::{encode, encode_nodes, EncodedNode, NAME_CHILDREN};
