pub mod comment;
pub mod shared;
pub mod sorting;
pub mod target;
