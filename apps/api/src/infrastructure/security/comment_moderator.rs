use crate::domain::comment::events::{CommentEvent, CommentObserver, ObserverResponse};
use async_trait::async_trait;
use tracing::debug;

struct Category {
    flag: &'static str,
    weight: i32,
    terms: &'static [&'static str],
}

const CATEGORIES: &[Category] = &[
    Category {
        flag: "SEVERE",
        weight: 90,
        terms: &["kill yourself", "go die", "genocide", "lynch", "terrorist"],
    },
    Category {
        flag: "HARASSMENT",
        weight: 35,
        terms: &["idiot", "moron", "loser", "shut up", "stupid"],
    },
    Category {
        flag: "SPAM",
        weight: 40,
        terms: &[
            "buy now",
            "click here",
            "free money",
            "crypto giveaway",
            "limited offer",
            "whatsapp me",
        ],
    },
];

/// Keyword score of a comment body, 0 to 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationScore {
    pub score: i32,
    pub flags: Vec<String>,
}

fn normalize(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn score_body(body: &str) -> ModerationScore {
    let normalized = normalize(body);
    let words: Vec<&str> = normalized.split(' ').collect();
    let mut score = 0;
    let mut flags = Vec::new();

    for category in CATEGORIES {
        for term in category.terms {
            let hit = if term.contains(' ') {
                normalized.contains(term)
            } else {
                words.contains(term)
            };
            if hit {
                score += category.weight;
                flags.push(format!("{}:{}", category.flag, term));
            }
        }
    }

    let links = body.matches("http://").count() + body.matches("https://").count();
    if links > 0 {
        score += 20 * links.min(3) as i32;
        flags.push(format!("SPAM:links={}", links));
    }

    let letters = body.chars().filter(|c| c.is_alphabetic()).count();
    let upper = body.chars().filter(|c| c.is_uppercase()).count();
    if letters >= 10 && upper * 10 > letters * 8 {
        score += 15;
        flags.push("ABUSE:shouting".to_string());
    }
    if body.matches('!').count() >= 5 {
        score += 10;
        flags.push("ABUSE:punctuation".to_string());
    }

    ModerationScore {
        score: score.clamp(0, 100),
        flags,
    }
}

/// Vetoes new comments whose keyword score reaches `veto_score`.
pub struct KeywordModerator {
    veto_score: i32,
}

impl KeywordModerator {
    pub fn new(veto_score: i32) -> Self {
        Self { veto_score }
    }
}

#[async_trait]
impl CommentObserver for KeywordModerator {
    fn name(&self) -> &str {
        "keyword_moderator"
    }

    async fn on_event(&self, event: &CommentEvent) -> ObserverResponse {
        let CommentEvent::WillBePosted { comment } = event else {
            return ObserverResponse::Continue;
        };
        let assessment = score_body(&comment.body);
        debug!(comment_id = %comment.id, score = assessment.score, flags = ?assessment.flags, "scored comment");
        if assessment.score >= self.veto_score {
            ObserverResponse::Veto(format!(
                "moderation score {} ({})",
                assessment.score,
                assessment.flags.join(", ")
            ))
        } else {
            ObserverResponse::Continue
        }
    }
}
