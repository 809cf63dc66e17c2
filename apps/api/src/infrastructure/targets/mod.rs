pub mod sqlx_target_kind;
pub mod static_target_kind;
