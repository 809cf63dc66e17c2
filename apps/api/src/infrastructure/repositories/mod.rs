pub mod memory_comment_repository;
pub mod sqlx_comment_repository;
