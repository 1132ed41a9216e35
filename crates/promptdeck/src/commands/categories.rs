use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::deck::Deck;

pub fn run(source: Option<&str>, pick: bool) -> Result<()> {
    let mut config = Config::load_or_default();
    let source = config.question_source(source);
    let deck = source
        .load()
        .with_context(|| format!("Failed to load questions from {}", source.describe()))?;

    let categories = deck.categories();
    if categories.is_empty() {
        println!("{}", "No categories found.".yellow());
        return Ok(());
    }

    if pick {
        return pick_defaults(&mut config, &deck, &categories);
    }

    let defaults = config.categories();
    println!(
        "{} categories, {} prompts",
        categories.len().to_string().bold(),
        deck.questions.len().to_string().bold()
    );
    for name in &categories {
        let marker = match defaults {
            Some(list) if !list.contains(name) => " ".normal(),
            _ => "*".green().bold(),
        };
        println!("{marker} {name} {}", format!("({})", deck.count_in(name)).dimmed());
    }
    if deck.intro.is_some() {
        println!("{}", "  + intro card".dimmed());
    }
    Ok(())
}

fn pick_defaults(config: &mut Config, deck: &Deck, categories: &[String]) -> Result<()> {
    let labels: Vec<String> = categories
        .iter()
        .map(|name| format!("{name} ({})", deck.count_in(name)))
        .collect();
    let preselected: Vec<usize> = match config.categories() {
        Some(list) => categories
            .iter()
            .enumerate()
            .filter(|(_, name)| list.contains(name))
            .map(|(i, _)| i)
            .collect(),
        None => (0..categories.len()).collect(),
    };

    let chosen = inquire::MultiSelect::new("Default categories:", labels.clone())
        .with_default(&preselected)
        .prompt()?;

    let names: Vec<String> = categories
        .iter()
        .zip(&labels)
        .filter(|(_, label)| chosen.contains(label))
        .map(|(name, _)| name.clone())
        .collect();

    // Everything selected is stored as "no restriction".
    let value = if names.len() == categories.len() {
        String::new()
    } else {
        names.join(",")
    };
    config.set("defaults.categories", &value)?;
    let path = config.save()?;
    println!(
        "{} {} of {} categories selected",
        "Saved".green().bold(),
        names.len(),
        categories.len()
    );
    println!("{}", path.display().to_string().dimmed());
    Ok(())
}
