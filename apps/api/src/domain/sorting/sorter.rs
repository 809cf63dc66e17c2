use crate::domain::comment::entity::Comment;
use serde::Serialize;
use std::{cmp::Ordering, str::FromStr};
use thiserror::Error;
use ts_rs::TS;

pub const DEFAULT_SORT: &str = "oldest";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortSpecError {
    #[error("Unknown sort field {0:?}")]
    UnknownField(String),
    #[error("Sort {0:?} has no fields")]
    Empty(String),
    #[error("Malformed sort definition {0:?}")]
    Malformed(String),
}

/// Comment attributes a sort strategy may order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentField {
    Id,
    Level,
    SubmittedAt,
    TreeId,
    UserName,
}

impl CommentField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Level => "level",
            Self::SubmittedAt => "submitted_at",
            Self::TreeId => "tree_id",
            Self::UserName => "user_name",
        }
    }

    pub fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Level => a.level.cmp(&b.level),
            Self::SubmittedAt => a.submitted_at.cmp(&b.submitted_at),
            Self::TreeId => a.tree_id.cmp(&b.tree_id),
            Self::UserName => a.user_name.cmp(&b.user_name),
        }
    }
}

impl FromStr for CommentField {
    type Err = SortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" | "pk" => Ok(Self::Id),
            "level" => Ok(Self::Level),
            "submit_date" | "submitted_at" => Ok(Self::SubmittedAt),
            "tree_id" => Ok(Self::TreeId),
            "user_name" => Ok(Self::UserName),
            other => Err(SortSpecError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub field: CommentField,
    pub descending: bool,
}

impl FromStr for SortField {
    type Err = SortSpecError;

    /// `-field` sorts descending, `field` ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        Ok(Self {
            field: name.parse()?,
            descending,
        })
    }
}

/// A named ordering strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub verbose_name: String,
    pub fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new(key: &str, verbose_name: &str, fields: &[&str]) -> Result<Self, SortSpecError> {
        if fields.is_empty() {
            return Err(SortSpecError::Empty(key.to_string()));
        }
        let fields = fields
            .iter()
            .map(|f| f.parse())
            .collect::<Result<Vec<SortField>, _>>()?;
        Ok(Self {
            key: key.to_string(),
            verbose_name: verbose_name.to_string(),
            fields,
        })
    }

    pub fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        for sort in &self.fields {
            let ord = sort.field.compare(a, b);
            let ord = if sort.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable multi-key sort in place.
    pub fn apply(&self, comments: &mut [Comment]) {
        comments.sort_by(|a, b| self.compare(a, b));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SortOption {
    pub key: String,
    pub verbose_name: String,
}

/// Ordered, extensible set of sort strategies.
#[derive(Debug, Clone)]
pub struct SortRegistry {
    specs: Vec<SortSpec>,
    default_key: String,
}

impl Default for SortRegistry {
    fn default() -> Self {
        let specs = vec![
            SortSpec {
                key: "newest".into(),
                verbose_name: "Newest".into(),
                fields: vec![
                    SortField { field: CommentField::Level, descending: false },
                    SortField { field: CommentField::SubmittedAt, descending: true },
                ],
            },
            SortSpec {
                key: DEFAULT_SORT.into(),
                verbose_name: "Oldest".into(),
                fields: vec![
                    SortField { field: CommentField::Level, descending: false },
                    SortField { field: CommentField::SubmittedAt, descending: false },
                ],
            },
        ];
        Self {
            specs,
            default_key: DEFAULT_SORT.into(),
        }
    }
}

impl SortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `spec`, replacing any strategy already registered under its key.
    pub fn register(&mut self, spec: SortSpec) -> &mut Self {
        tracing::debug!(key = %spec.key, "registered comment sort");
        match self.specs.iter_mut().find(|s| s.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
        self
    }

    /// Registers every `key=field,-field` entry of a `;` separated list.
    pub fn register_definitions(&mut self, definitions: &str) -> Result<&mut Self, SortSpecError> {
        for entry in definitions.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, fields) = entry
                .split_once('=')
                .ok_or_else(|| SortSpecError::Malformed(entry.to_string()))?;
            let key = key.trim();
            let fields: Vec<&str> = fields.split(',').map(str::trim).filter(|f| !f.is_empty()).collect();
            self.register(SortSpec::new(key, key, &fields)?);
        }
        Ok(self)
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn get(&self, key: &str) -> Option<&SortSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Looks up `key`, falling back to the default strategy for unknown or missing keys.
    pub fn resolve(&self, key: Option<&str>) -> &SortSpec {
        key.and_then(|k| self.get(k.trim()))
            .or_else(|| self.get(&self.default_key))
            .unwrap_or(&self.specs[0])
    }

    pub fn sort(&self, mut comments: Vec<Comment>, key: Option<&str>) -> Vec<Comment> {
        self.resolve(key).apply(&mut comments);
        comments
    }

    pub fn options(&self) -> Vec<SortOption> {
        self.specs
            .iter()
            .map(|s| SortOption {
                key: s.key.clone(),
                verbose_name: s.verbose_name.clone(),
            })
            .collect()
    }
}
