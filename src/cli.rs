use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input, Select};

use crate::config::{self, Config};
use crate::core::export;
use crate::core::presets::PRESETS;
use crate::core::session::{self, AppStatus, MoodSession};
use crate::core::themes::{MoodCategory, DEFAULT_THEME, MOOD_KEYWORDS};
use crate::error::SubmitError;
use crate::models::MoodAnalysis;
use crate::sources::{self, MoodSource, Strategy};

#[derive(Parser)]
#[command(name = "moodify", about = "Describe your mood, get a playlist")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch the GUI
    #[arg(long)]
    pub gui: bool,

    /// Service to ask (defaults to the configured strategy)
    #[arg(long, global = true, value_enum)]
    pub source: Option<Strategy>,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a playlist for a mood description
    Discover {
        /// How you feel, in your own words
        #[arg(required = true)]
        text: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Also save the result as JSON
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Pick a preset or type a mood, with retry
    Interactive,
    /// List the quick-fill suggestions
    Presets,
    /// Show the keyword to theme table
    Themes,
    /// Set API credentials
    Config,
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_config();
    let strategy = cli.source.unwrap_or(cfg.strategy);

    match cli.command {
        Some(Commands::Discover { text, json, output }) => {
            cmd_discover(&cfg, strategy, &text.join(" "), json, output.as_deref())
        }
        Some(Commands::Interactive) => cmd_interactive(&cfg, strategy),
        Some(Commands::Presets) => cmd_presets(),
        Some(Commands::Themes) => cmd_themes(),
        Some(Commands::Config) => cmd_config(cfg),
        None => {
            if cli.gui {
                #[cfg(feature = "gui")]
                {
                    crate::gui::launch(sources::build_source(&cfg, strategy));
                    Ok(())
                }
                #[cfg(not(feature = "gui"))]
                {
                    bail!("GUI support is not enabled. Rebuild with: cargo build --features gui");
                }
            } else {
                println!("Usage: moodify <command> or moodify --gui");
                println!("Run moodify --help for details.");
                Ok(())
            }
        }
    }
}

fn print_analysis(analysis: &MoodAnalysis) {
    println!("\n{}", analysis.headline());
    println!("{}  {}", analysis.color, analysis.description);

    for playlist in &analysis.playlists {
        println!("\n{}", playlist.name);
        if !playlist.description.is_empty() {
            println!("{}", playlist.description);
        }

        let mut table = Table::new();
        table.set_header(vec!["#", "Title", "Artist", "Album", "Time"]);
        for (i, track) in playlist.tracks.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&track.title),
                Cell::new(&track.artist),
                Cell::new(&track.album),
                Cell::new(&track.duration),
            ]);
        }
        println!("{table}");
    }
}

fn cmd_discover(
    cfg: &Config,
    strategy: Strategy,
    text: &str,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let source = sources::build_source(cfg, strategy);
    let mut session = MoodSession::new();

    if !json {
        println!("Reading your vibes via {}...", source.name());
    }

    session::analyze(&mut session, source.as_ref(), text)?;

    match session.status() {
        AppStatus::Ready => {
            let Some(analysis) = session.analysis() else {
                bail!("no analysis available");
            };
            if json {
                println!("{}", export::to_json(analysis)?);
            } else {
                print_analysis(analysis);
            }
            if let Some(path) = output {
                export::save_analysis(path, analysis)?;
                if !json {
                    println!("\nSaved to {}", path.display());
                }
            }
            Ok(())
        }
        _ => bail!(
            "{}",
            session
                .error_message()
                .unwrap_or("Something went wrong while analyzing your mood.")
        ),
    }
}

/// Asks for a mood. `None` means the user wants to quit.
fn prompt_mood() -> Result<Option<String>> {
    const OWN: &str = "Describe it myself...";
    const QUIT: &str = "Quit";

    let mut items: Vec<&str> = PRESETS.to_vec();
    items.push(OWN);
    items.push(QUIT);

    let selection = Select::new()
        .with_prompt("How are you feeling right now?")
        .items(&items)
        .default(0)
        .interact()?;

    match items[selection] {
        QUIT => Ok(None),
        OWN => {
            let text: String = Input::new()
                .with_prompt("Your mood")
                .allow_empty(true)
                .interact_text()?;
            Ok(Some(text))
        }
        preset => Ok(Some(preset.to_string())),
    }
}

fn run_interactive(session: &mut MoodSession, source: &dyn MoodSource) -> Result<()> {
    loop {
        match session.status() {
            AppStatus::Idle => {
                let Some(text) = prompt_mood()? else {
                    return Ok(());
                };
                println!("Reading your vibes...");
                match session::analyze(session, source, &text) {
                    Ok(_) => {}
                    Err(SubmitError::EmptyQuery) => {
                        println!("Tell me a little about how you feel first.\n");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            AppStatus::Ready => {
                let Some(analysis) = session.analysis() else {
                    session.reset();
                    continue;
                };
                print_analysis(analysis);

                let choices = ["Try a different mood?", "Save playlist", "Quit"];
                let choice = Select::new().items(&choices).default(0).interact()?;
                match choice {
                    0 => session.reset(),
                    1 => {
                        let path: String = Input::new()
                            .with_prompt("Save as")
                            .with_initial_text(export::default_file_name(analysis))
                            .interact_text()?;
                        match export::save_analysis(Path::new(&path), analysis) {
                            Ok(()) => println!("Saved to {}", path),
                            Err(e) => println!("Save failed: {:#}", e),
                        }
                        session.reset();
                    }
                    _ => return Ok(()),
                }
            }
            AppStatus::Error => {
                println!(
                    "\nOops! Something went wrong\n{}",
                    session.error_message().unwrap_or_default()
                );
                let again = Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !again {
                    return Ok(());
                }
                session.acknowledge();
            }
            // analyze() only returns once the request has completed
            AppStatus::Analyzing => session.reset(),
        }
    }
}

fn cmd_interactive(cfg: &Config, strategy: Strategy) -> Result<()> {
    let source = sources::build_source(cfg, strategy);
    let mut session = MoodSession::new();
    println!("Moodify ({})\n", source.name());
    run_interactive(&mut session, source.as_ref())
}

fn cmd_presets() -> Result<()> {
    for preset in PRESETS {
        println!("{}", preset);
    }
    Ok(())
}

fn cmd_themes() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Keyword", "Category", "Emoji", "Color"]);
    for (keyword, theme) in MOOD_KEYWORDS.iter() {
        table.add_row(vec![
            Cell::new(keyword),
            Cell::new(theme.category),
            Cell::new(theme.emoji),
            Cell::new(theme.color),
        ]);
    }
    table.add_row(vec![
        Cell::new("(no match)"),
        Cell::new(DEFAULT_THEME.category),
        Cell::new(DEFAULT_THEME.emoji),
        Cell::new(DEFAULT_THEME.color),
    ]);
    println!("{table}");
    println!("\nGenerative moods: {}", MoodCategory::joined());
    Ok(())
}

fn optional(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn configured_label(ok: bool) -> &'static str {
    if ok {
        "configured"
    } else {
        "not configured"
    }
}

fn cmd_config(mut cfg: Config) -> Result<()> {
    println!("Moodify settings");
    println!("(leave a field empty to unset it)\n");

    let strategies = [Strategy::Gemini, Strategy::Spotify];
    let labels = ["gemini (generative playlist)", "spotify (catalog search)"];
    let current = strategies
        .iter()
        .position(|s| *s == cfg.strategy)
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Default source")
        .items(&labels)
        .default(current)
        .interact()?;
    cfg.strategy = strategies[picked];

    let gemini_key: String = Input::new()
        .with_prompt("Gemini API key")
        .with_initial_text(cfg.gemini.api_key.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    cfg.gemini.api_key = optional(gemini_key);

    println!("\nSpotify: paste an access token, or client credentials from");
    println!("https://developer.spotify.com/dashboard\n");

    let token: String = Input::new()
        .with_prompt("Spotify access token")
        .with_initial_text(cfg.spotify.access_token.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    cfg.spotify.access_token = optional(token);

    let client_id: String = Input::new()
        .with_prompt("Spotify client ID")
        .with_initial_text(cfg.spotify.client_id.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    cfg.spotify.client_id = optional(client_id);

    let client_secret: String = Input::new()
        .with_prompt("Spotify client secret")
        .with_initial_text(cfg.spotify.client_secret.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    cfg.spotify.client_secret = optional(client_secret);

    config::save_config(&cfg)?;
    println!("\nSettings saved!");
    println!(
        "Gemini: {}, Spotify: {}",
        configured_label(cfg.gemini.is_configured()),
        configured_label(cfg.spotify.is_configured())
    );
    Ok(())
}
