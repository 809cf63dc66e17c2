use crate::domain::comment::{
    errors::CommentError,
    validation::{FieldError, FieldErrorCode},
};

const DEFAULT_PROFANITIES: &[&str] = &[
    "asshole", "bastard", "bitch", "bullshit", "dickhead", "fuck", "motherfucker", "shit",
    "wanker",
];

/// Body and honeypot rules applied to every submission.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    pub max_length: usize,
    pub allow_profanities: bool,
    profanities: Vec<String>,
}

impl ContentPolicy {
    pub fn new(max_length: usize, allow_profanities: bool, profanities: Vec<String>) -> Self {
        let profanities = if profanities.is_empty() {
            DEFAULT_PROFANITIES.iter().map(|w| w.to_string()).collect()
        } else {
            profanities
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            max_length,
            allow_profanities,
            profanities,
        }
    }

    /// The hidden field must come back empty.
    pub fn check_honeypot(&self, honeypot: Option<&str>) -> Result<(), CommentError> {
        match honeypot {
            Some(value) if !value.is_empty() => Err(CommentError::SpamHoneypot),
            _ => Ok(()),
        }
    }

    /// Denylisted words found in `body`, case-insensitive substring match.
    pub fn profanities_in(&self, body: &str) -> Vec<&str> {
        if self.allow_profanities {
            return Vec::new();
        }
        let lowered = body.to_lowercase();
        self.profanities
            .iter()
            .filter(|w| lowered.contains(w.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn validate_body(&self, body: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if body.trim().is_empty() {
            errors.push(FieldError::new("comment", FieldErrorCode::Required, "This field is required."));
            return errors;
        }
        let length = body.chars().count();
        if length > self.max_length {
            errors.push(FieldError::new(
                "comment",
                FieldErrorCode::TooLong,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    self.max_length, length
                ),
            ));
        }
        let found = self.profanities_in(body);
        if !found.is_empty() {
            let masked: Vec<String> = found.iter().map(|w| format!("\"{}\"", mask(w))).collect();
            let message = if masked.len() == 1 {
                format!("Watch your mouth! The word {} is not allowed here.", masked[0])
            } else {
                format!(
                    "Watch your mouth! The words {} are not allowed here.",
                    text_list(&masked)
                )
            };
            errors.push(FieldError::new("comment", FieldErrorCode::ProfanityRejected, message));
        }
        errors
    }
}

/// First and last letter with dashes in between.
fn mask(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => chars[0].to_string(),
        n => format!("{}{}{}", chars[0], "-".repeat(n - 2), chars[n - 1]),
    }
}

fn text_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
