pub mod database;
pub mod monitoring;
pub mod repositories;
pub mod security;
pub mod targets;
