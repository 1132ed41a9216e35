use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::cli::FilterArgs;
use crate::config::Config;
use crate::deck::balancer::longest_category_run;
use crate::deck::sequencer::{Mode, Sequencer};
use crate::deck::{Depth, PromptKind, Slide};

#[derive(Serialize)]
struct OrderedPrompt<'a> {
    position: usize,
    category: &'a str,
    kind: PromptKind,
    depth: Depth,
    text: &'a str,
}

pub fn run(source: Option<&str>, filter: &FilterArgs, json: bool) -> Result<()> {
    let config = Config::load_or_default();
    let source = config.question_source(source);
    let deck = source
        .load()
        .with_context(|| format!("Failed to load questions from {}", source.describe()))?;

    let known = deck.categories();
    for name in &filter.categories {
        if !known.contains(name) {
            eprintln!("{}", format!("Unknown category ignored: {name}").yellow());
        }
    }

    let mode = if filter.questions_only {
        Mode::QuestionsOnly
    } else {
        config.mode()
    };
    let selection: Vec<String> = if filter.categories.is_empty() {
        config.categories().map(<[String]>::to_vec).unwrap_or_default()
    } else {
        filter.categories.clone()
    };

    let mut sequencer = Sequencer::new(deck, mode).with_selection(&selection);
    sequencer.rebuild(&mut rand::rng());

    let questions: Vec<_> = sequencer
        .slides()
        .iter()
        .filter_map(Slide::question)
        .cloned()
        .collect();
    tracing::debug!(
        prompts = questions.len(),
        longest_run = longest_category_run(&questions),
        "sequence built"
    );

    let prompts: Vec<OrderedPrompt> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| OrderedPrompt {
            position: i + 1,
            category: &q.category,
            kind: q.kind,
            depth: q.depth,
            text: &q.text,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
        return Ok(());
    }

    if prompts.is_empty() {
        println!("{}", "Keine Fragen verfügbar".yellow());
        return Ok(());
    }
    let width = prompts.len().to_string().len();
    for p in &prompts {
        println!(
            "{:>width$}. {} {} {}",
            p.position,
            format!("[{}]", p.category).cyan(),
            p.kind.label().dimmed(),
            p.text
        );
    }
    Ok(())
}
