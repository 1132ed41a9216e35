use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use super::{Deck, PromptKind, Question};

/// Where questions come from: a spreadsheet CSV export, a local CSV file, or both.
#[derive(Debug, Clone, Default)]
pub struct QuestionSource {
    pub url: Option<String>,
    pub fallback: Option<PathBuf>,
}

impl QuestionSource {
    /// Build a source from a CLI argument that is either a URL or a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self {
                url: Some(arg.to_string()),
                fallback: None,
            }
        } else {
            Self {
                url: None,
                fallback: Some(PathBuf::from(arg)),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.fallback.is_none()
    }

    pub fn describe(&self) -> String {
        match (&self.url, &self.fallback) {
            (Some(url), Some(path)) => format!("{url} (fallback {})", path.display()),
            (Some(url), None) => url.clone(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => "<none>".to_string(),
        }
    }

    /// Load the deck, trying the remote spreadsheet first and the local file second.
    pub fn load(&self) -> Result<Deck> {
        if self.is_empty() {
            anyhow::bail!(
                "No question source configured. Pass a URL or CSV file, or run \
                 `promptdeck config set defaults.source <url>`."
            );
        }

        if let Some(url) = &self.url {
            match fetch_remote(url) {
                Ok(text) => {
                    let deck = parse_csv(&text)?;
                    tracing::info!(questions = deck.questions.len(), "loaded questions from spreadsheet");
                    return Ok(deck);
                }
                Err(e) if self.fallback.is_some() => {
                    tracing::warn!("spreadsheet download failed, using local file: {e:#}");
                }
                Err(e) => return Err(e),
            }
        }

        let path = self
            .fallback
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("No local question file configured"))?;
        let deck = load_file(path)?;
        tracing::info!(
            questions = deck.questions.len(),
            path = %path.display(),
            "loaded questions from local file"
        );
        Ok(deck)
    }
}

fn fetch_remote(url: &str) -> Result<String> {
    let busted = with_cache_bust(url, unix_millis());
    tracing::debug!(url = %busted, "fetching spreadsheet");
    let body = ureq::get(&busted)
        .header("Cache-Control", "no-cache")
        .header("Pragma", "no-cache")
        .call()
        .with_context(|| format!("Failed to fetch {url}"))?
        .body_mut()
        .read_to_string()
        .context("Failed to read spreadsheet response")?;
    Ok(body)
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn with_cache_bust(url: &str, stamp: u128) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}cachebust={stamp}")
}

pub fn load_file(path: &Path) -> Result<Deck> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_csv(&text)
}

/// Parse spreadsheet CSV rows of `category, text[, kind]`.
pub fn parse_csv(text: &str) -> Result<Deck> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut deck = Deck::default();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV at row {}", i + 1))?;
        let field = |n: usize| record.get(n).unwrap_or("");

        if i == 0 && is_header(field(0), field(1)) {
            continue;
        }

        let (category, text) = (field(0), field(1));
        if category.is_empty() || text.is_empty() {
            continue;
        }

        let question = Question::new(text, category, PromptKind::from_column(field(2)));
        if question.is_intro() {
            deck.intro = Some(question);
        } else {
            deck.questions.push(question);
        }
    }
    Ok(deck)
}

fn is_header(first: &str, second: &str) -> bool {
    first.to_lowercase().contains("categor") || second.to_lowercase().contains("question")
}
