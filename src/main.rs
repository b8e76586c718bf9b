//! Namedeck terminal front-end
//!
//! Plays the flashcards game in the terminal against a roster export.
//!
//! ## Usage
//!
//! ```bash
//! # Play against a roster export
//! namedeck roster.json
//!
//! # Custom storage location
//! namedeck --storage-dir ~/decks roster.json
//!
//! # Abandon the saved game and start over
//! namedeck --reset roster.json
//!
//! # Forget everything, long-term memory included
//! namedeck --reset-all roster.json
//! ```
//!
//! ## Roster format
//!
//! A JSON array of directory entries:
//!
//! ```json
//! [{"name": "Ada Lovelace", "role": "Engineer",
//!   "location": "London", "photo_url": "https://pics/ada.jpg"}]
//! ```
//!
//! Malformed entries are skipped with a warning.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use namedeck::{
    Card, Config, GameDb, GameEngine, JsonRosterFile, MasteryStore, RosterSource, SessionStore,
    Turn,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "namedeck")]
#[command(about = "Flashcards for learning colleague names")]
struct Args {
    /// Roster export to quiz from (JSON array)
    roster: PathBuf,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage directory
    #[arg(long, env = "NAMEDECK_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Abandon the saved game before starting
    #[arg(long)]
    reset: bool,

    /// Clear the saved game and all long-term mastery records
    #[arg(long)]
    reset_all: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("namedeck=warn".parse()?),
        )
        .init();

    let args = Args::parse();

    // Load config
    let mut config = if let Some(config_path) = &args.config {
        Config::load(config_path).context("failed to load config")?
    } else {
        Config::default()
    };

    // Apply CLI overrides
    if let Some(dir) = args.storage_dir {
        config.storage_dir = dir;
    }

    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .context("failed to create storage directory")?;

    // Save default config if it doesn't exist
    let config_path = config.config_path();
    if !config_path.exists() {
        config.save(&config_path).context("failed to write config")?;
        info!(path = %config_path.display(), "created default config");
    }

    let db = GameDb::open(config.db_path()).context("failed to open progress database")?;

    if args.reset || args.reset_all {
        SessionStore::new(db.clone()).clear();
        println!("Saved game cleared.");
    }
    if args.reset_all {
        MasteryStore::new(db.clone(), &config).clear_all();
        println!("Long-term memory cleared.");
    }

    let source = JsonRosterFile::new(&args.roster);
    let mut engine = GameEngine::new(db, &config);

    let roster = source.fetch().context("failed to read roster")?;
    engine.start(roster)?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    println!("=== Colleague Flashcards ===");
    println!("Pick the matching name by number, or q to quit.\n");

    loop {
        match engine.next()? {
            Turn::Complete(report) => {
                println!("\nGame complete!");
                println!("  People:   {}", report.total);
                println!("  Correct:  {}", report.correct);
                println!("  Accuracy: {}%", report.accuracy);
                if report.perfect {
                    println!("  Perfect score! Every face matched on the first try.");
                } else {
                    println!("\nWorth another look:");
                    for person in &report.missed {
                        println!("  - {} ({})", person.name, person.role);
                    }
                }
                let stats = engine.mastery().stats();
                println!(
                    "\nLong-term memory: {} names tracked, {} currently mastered.",
                    stats.tracked, stats.mastered
                );

                println!("\nPlay again? [y/N]");
                if !matches!(input.next_line().await?, Some(line) if line.trim().eq_ignore_ascii_case("y")) {
                    break;
                }
                let roster = source.fetch().context("failed to read roster")?;
                engine.reset(roster)?;
            }
            Turn::Card(card) => {
                let options = engine.options()?;
                let stats = engine.stats();
                show_card(&card, stats.remaining, stats.correct);
                for (index, option) in options.iter().enumerate() {
                    println!("  {}. {}, {}", index + 1, option.name, option.role);
                }

                let selected = loop {
                    match input.next_line().await? {
                        None => return Ok(()),
                        Some(line) => {
                            let line = line.trim().to_string();
                            if line.eq_ignore_ascii_case("q") {
                                println!("Progress saved. See you next time.");
                                return Ok(());
                            }
                            match line.parse::<usize>() {
                                Ok(n) if n >= 1 && n <= options.len() => break n - 1,
                                _ => println!("Pick a number between 1 and {}.", options.len()),
                            }
                        }
                    }
                };

                let verdict = engine.answer(&options[selected].id)?;
                if verdict.correct {
                    println!("Correct!\n");
                } else {
                    let right = options
                        .iter()
                        .find(|o| o.id == verdict.correct_id)
                        .map(|o| o.name.as_str())
                        .unwrap_or("someone else");
                    println!("Not quite, that was {}. They'll come back around.\n", right);
                }

                tokio::time::sleep(verdict.advance.delay()).await;
                engine.advance(verdict.advance);
            }
        }
    }

    Ok(())
}

fn show_card(card: &Card, remaining: usize, correct: u32) {
    println!("-----------------------------------------");
    println!("Remaining: {}   Correct: {}", remaining + 1, correct);
    let mut badges = Vec::new();
    if card.is_retry {
        badges.push("retry");
    }
    if card.already_mastered {
        badges.push("mastered");
    }
    if badges.is_empty() {
        println!("Photo: {}", card.person.photo_url);
    } else {
        println!("Photo: {} [{}]", card.person.photo_url, badges.join(", "));
    }
    if let Some(location) = &card.person.location {
        println!("Location: {}", location);
    }
    println!("Who is this person?");
}
