//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required Variables
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `JWT_SECRET`: Secret used to verify bearer tokens
//! - `SECRET_KEY`: Secret the comment form security hash is derived from
//!
//! ## Optional Variables
//! - `RUST_LOG`: Logging filter (default: "info,comment_threads=debug,tower_http=debug")
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 3000)
//! - `DATABASE_MAX_CONNECTIONS`: DB pool size (default: 20)
//! - `DEBUG`: Expose rejection reasons in bad-request responses (default: false)
//! - `COMMENT_MAX_LENGTH`: Maximum body length in characters (default: 3000)
//! - `COMMENTS_PER_PAGE`: Root comments per listing page (default: 10)
//! - `COMMENTS_HIDE_REMOVED`: Hide comments flagged as removed (default: true)
//! - `COMMENTS_ALLOW_PROFANITIES`: Skip the profanity denylist (default: false)
//! - `PROFANITIES_LIST`: Comma separated denylist (default: built-in list)
//! - `ALLOW_ANONYMOUS_COMMENTS`: Let unauthenticated visitors post (default: true)
//! - `ENABLE_AUTO_MODERATION`: Register the keyword moderator (default: true)
//! - `MODERATION_VETO_SCORE`: Keyword score that vetoes a post (default: 80)
//! - `COMMENT_TARGETS`: `tag=table[(column)]:format:url_pattern` entries separated by `;`
//! - `COMMENT_SORTS`: `key=field,-field` entries separated by `;`
//! - `IGNORE_MISSING_MIGRATIONS`: Skip missing migrations (default: true)

use crate::domain::target::entity::{KeyFormat, TypeTag};
use anyhow::anyhow;

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Key material for form security hashes.
    pub secret_key: String,
    pub debug: bool,
    pub comment_max_length: usize,
    pub comments_per_page: i64,
    pub comments_hide_removed: bool,
    pub comments_allow_profanities: bool,
    pub profanities: Vec<String>,
    pub allow_anonymous_comments: bool,
    pub enable_auto_moderation: bool,
    pub moderation_veto_score: i32,
    pub comment_targets: Vec<TargetDefinition>,
    pub comment_sorts: Option<String>,
    pub ignore_missing_migrations: bool,
}

/// Comment behaviour knobs handed to the use cases.
#[derive(Debug, Clone)]
pub struct CommentSettings {
    pub max_length: usize,
    pub per_page: i64,
    pub hide_removed: bool,
    pub allow_profanities: bool,
    pub profanities: Vec<String>,
}

/// One `COMMENT_TARGETS` entry: a host table comments may attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDefinition {
    pub type_tag: TypeTag,
    pub table: String,
    pub key_column: String,
    pub key_format: KeyFormat,
    pub url_pattern: String,
}

impl TargetDefinition {
    fn parse(entry: &str) -> anyhow::Result<Self> {
        let (tag, rest) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("target entry {:?} lacks '='", entry))?;
        let type_tag =
            TypeTag::parse(tag).ok_or_else(|| anyhow!("invalid type tag {:?}", tag.trim()))?;
        let mut parts = rest.splitn(3, ':');
        let (Some(table), Some(format), Some(url_pattern)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(anyhow!("target entry {:?} must be table:format:url", entry));
        };
        let table = table.trim();
        let (table, key_column) = match table.split_once('(') {
            Some((table, column)) => (table, column.trim_end_matches(')')),
            None => (table, "id"),
        };
        Ok(Self {
            type_tag,
            table: table.trim().to_string(),
            key_column: key_column.trim().to_string(),
            key_format: format.parse().map_err(|e: String| anyhow!(e))?,
            url_pattern: url_pattern.trim().to_string(),
        })
    }

    pub fn parse_list(raw: &str) -> anyhow::Result<Vec<Self>> {
        raw.split(';')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a set variable
    /// cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env_required("DATABASE_URL")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 20)?,
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 3000)?,
            jwt_secret: env_required("JWT_SECRET")?,
            secret_key: env_required("SECRET_KEY")?,
            debug: env_or("DEBUG", false)?,
            comment_max_length: env_or("COMMENT_MAX_LENGTH", 3000)?,
            comments_per_page: env_or("COMMENTS_PER_PAGE", 10)?,
            comments_hide_removed: env_or("COMMENTS_HIDE_REMOVED", true)?,
            comments_allow_profanities: env_or("COMMENTS_ALLOW_PROFANITIES", false)?,
            profanities: env_list("PROFANITIES_LIST"),
            allow_anonymous_comments: env_or("ALLOW_ANONYMOUS_COMMENTS", true)?,
            enable_auto_moderation: env_or("ENABLE_AUTO_MODERATION", true)?,
            moderation_veto_score: env_or("MODERATION_VETO_SCORE", 80)?,
            comment_targets: match std::env::var("COMMENT_TARGETS") {
                Ok(raw) => TargetDefinition::parse_list(&raw)?,
                Err(_) => Vec::new(),
            },
            comment_sorts: std::env::var("COMMENT_SORTS").ok(),
            ignore_missing_migrations: env_or("IGNORE_MISSING_MIGRATIONS", true)?,
        })
    }

    pub fn comment_settings(&self) -> CommentSettings {
        CommentSettings {
            max_length: self.comment_max_length,
            per_page: self.comments_per_page.max(1),
            hide_removed: self.comments_hide_removed,
            allow_profanities: self.comments_allow_profanities,
            profanities: self.profanities.clone(),
        }
    }
}

fn env_required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow!("Missing required environment variable: {}", key))
}

/// Parsed variable, or `default` when unset.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow!("Failed to parse {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

/// Comma separated list; empty when unset.
fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
