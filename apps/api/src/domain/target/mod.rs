pub mod entity;
pub mod locator;
pub mod registry;
