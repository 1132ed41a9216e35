pub mod balancer;
pub mod sequencer;
pub mod source;

use serde::Serialize;

/// Reserved category name for the intro row.
pub const INTRO_CATEGORY: &str = "Intro";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Light,
    Deep,
}

impl Depth {
    pub fn from_category(category: &str) -> Self {
        if category.eq_ignore_ascii_case("aktion") {
            Self::Deep
        } else {
            Self::Light
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PromptKind {
    /// "Frage": something to talk or write about.
    #[serde(rename = "Frage")]
    Question,
    /// "Aktion": something to do.
    #[serde(rename = "Aktion")]
    Action,
}

impl PromptKind {
    /// Parse the kind column. Empty and unknown values fall back to `Question`.
    pub fn from_column(value: &str) -> Self {
        match value.trim() {
            v if v.eq_ignore_ascii_case("aktion") => Self::Action,
            "" => Self::Question,
            v if v.eq_ignore_ascii_case("frage") => Self::Question,
            other => {
                tracing::debug!(kind = other, "unknown prompt kind, treating as Frage");
                Self::Question
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Question => "Frage",
            Self::Action => "Aktion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: String,
    pub category: String,
    pub depth: Depth,
    pub kind: PromptKind,
}

impl Question {
    pub fn new(text: impl Into<String>, category: impl Into<String>, kind: PromptKind) -> Self {
        let category = category.into();
        Self {
            text: text.into(),
            depth: Depth::from_category(&category),
            category,
            kind,
        }
    }

    pub fn is_intro(&self) -> bool {
        self.category.eq_ignore_ascii_case(INTRO_CATEGORY)
    }
}

/// One renderable unit in the carousel.
#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Intro(Question),
    Question(Question),
}

impl Slide {
    pub fn question(&self) -> Option<&Question> {
        match self {
            Slide::Question(q) => Some(q),
            Slide::Intro(_) => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Slide::Intro(q) | Slide::Question(q) => &q.text,
        }
    }
}

/// Everything loaded from a question source.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub questions: Vec<Question>,
    pub intro: Option<Question>,
}

impl Deck {
    /// Distinct categories in first-appearance order, without the intro category.
    pub fn categories(&self) -> Vec<String> {
        categories_of(&self.questions)
    }

    pub fn count_in(&self, category: &str) -> usize {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .count()
    }
}

pub fn categories_of(questions: &[Question]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for q in questions {
        if q.is_intro() || seen.iter().any(|c| *c == q.category) {
            continue;
        }
        seen.push(q.category.clone());
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_from_category() {
        assert_eq!(Depth::from_category("Aktion"), Depth::Deep);
        assert_eq!(Depth::from_category("aktion"), Depth::Deep);
        assert_eq!(Depth::from_category("Geistige Intimität"), Depth::Light);
    }

    #[test]
    fn test_kind_from_column() {
        assert_eq!(PromptKind::from_column("Aktion"), PromptKind::Action);
        assert_eq!(PromptKind::from_column(" aktion "), PromptKind::Action);
        assert_eq!(PromptKind::from_column("Frage"), PromptKind::Question);
        assert_eq!(PromptKind::from_column(""), PromptKind::Question);
        assert_eq!(PromptKind::from_column("Sonstiges"), PromptKind::Question);
    }

    #[test]
    fn test_categories_first_appearance_without_intro() {
        let deck = Deck {
            questions: vec![
                Question::new("a", "B", PromptKind::Question),
                Question::new("b", "Intro", PromptKind::Question),
                Question::new("c", "A", PromptKind::Question),
                Question::new("d", "B", PromptKind::Action),
            ],
            intro: None,
        };
        assert_eq!(deck.categories(), vec!["B".to_string(), "A".to_string()]);
        assert_eq!(deck.count_in("B"), 2);
        assert_eq!(deck.count_in("missing"), 0);
    }
}
