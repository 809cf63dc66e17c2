pub mod entity;
pub mod errors;
pub mod events;
pub mod permissions;
pub mod repository;
pub mod tree;
pub mod tree_store;
pub mod validation;
