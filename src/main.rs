use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use lingo_widgets::core::transfer;
use lingo_widgets::core::translator::languages::{display_name, LANGUAGES};
use lingo_widgets::{
    AppError, AppResult, AppSettings, LangTag, MyMemoryClient, SessionStore, TranslateSession,
};

#[derive(Parser)]
#[command(name = "lingo-widgets")]
#[command(about = "Translate text with history, favorites, and daily streaks")]
#[command(version)]
struct Cli {
    /// Source language tag, e.g. en-GB
    #[arg(long, global = true)]
    from: Option<String>,

    /// Target language tag, e.g. yo-NG
    #[arg(long, global = true)]
    to: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate text once and print the result
    Translate {
        /// Text to translate (omit when using --file)
        text: Option<String>,

        /// Read the source text from a plain-text file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Save the result as a favorite
        #[arg(long)]
        favorite: bool,

        /// Export the labeled document into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },
    /// Start a line-oriented interactive session
    Interactive,
    /// Show recent translations
    History,
    /// List or remove favorites
    Favorites {
        /// Remove the favorite at this position (as listed)
        #[arg(long, value_name = "N")]
        remove: Option<usize>,
    },
    /// List the supported languages
    Languages,
    /// Show or change preferences
    Prefs {
        /// Turn dark mode on or off
        #[arg(long)]
        dark_mode: Option<bool>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let settings = match AppSettings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("[Cli] Using default settings: {}", e);
            AppSettings::default()
        }
    };

    let source: LangTag = cli
        .from
        .as_deref()
        .unwrap_or(&settings.preferences.default_source_lang)
        .parse()?;
    let target: LangTag = cli
        .to
        .as_deref()
        .unwrap_or(&settings.preferences.default_target_lang)
        .parse()?;

    let store = Arc::new(SessionStore::open());
    let streak = store.record_visit(Local::now().date_naive());

    match cli.command {
        Commands::Translate {
            text,
            file,
            favorite,
            export,
        } => {
            let text = match (text, file) {
                (Some(text), None) => text,
                (None, Some(path)) => transfer::import_source(&path).await?,
                (Some(_), Some(_)) => {
                    return Err(AppError::Validation(
                        "Pass either TEXT or --file, not both".to_string(),
                    ))
                }
                (None, None) => {
                    return Err(AppError::Validation(
                        "Nothing to translate: pass TEXT or --file".to_string(),
                    ))
                }
            };

            let provider = Arc::new(MyMemoryClient::with_endpoint(&settings.provider.endpoint)?);
            let session = TranslateSession::new(provider, Arc::clone(&store), source, target);
            session.set_source_text(text);

            if let Some(translated) = session.translate_now().await? {
                println!("{}", translated);

                if favorite && session.favorite_current() {
                    println!("Saved to favorites.");
                }
                if let Some(dir) = export {
                    let (from, to) = session.languages();
                    let path = transfer::export_translation(
                        &dir,
                        &session.source_text(),
                        &translated,
                        &from,
                        &to,
                    )
                    .await?;
                    println!("Exported to {}", path.display());
                }
            }
        }
        Commands::Interactive => {
            let provider = Arc::new(MyMemoryClient::with_endpoint(&settings.provider.endpoint)?);
            let session = TranslateSession::new(provider, Arc::clone(&store), source, target);
            run_interactive(session, store, streak).await?;
        }
        Commands::History => {
            let history = store.history();
            if history.is_empty() {
                println!("No recent translations yet.");
            }
            for entry in history {
                println!(
                    "{}  {} -> {}",
                    entry.date.format("%Y-%m-%d %H:%M"),
                    display_name(&entry.from),
                    display_name(&entry.to)
                );
                println!("  {}", entry.text);
                println!("  {}", entry.translation);
            }
        }
        Commands::Favorites { remove } => {
            let favorites = store.favorites();
            if let Some(position) = remove {
                if position == 0 || position > favorites.len() {
                    return Err(AppError::Validation(format!(
                        "No favorite at position {}",
                        position
                    )));
                }
                let removed = store.remove_favorite(position - 1);
                println!("Removed: {}", removed.text);
            } else if favorites.is_empty() {
                println!("You haven't saved any translations yet.");
            } else {
                for (i, fav) in favorites.iter().enumerate() {
                    println!(
                        "{}. [{} -> {}] {}",
                        i + 1,
                        fav.from.code(),
                        fav.to.code(),
                        fav.text
                    );
                    println!("   {}", fav.translation);
                }
            }
        }
        Commands::Languages => {
            for (code, name) in LANGUAGES {
                println!("{:<8} {}", code, name);
            }
        }
        Commands::Prefs { dark_mode } => {
            if let Some(enabled) = dark_mode {
                store.set_dark_mode(enabled);
            }
            println!("Streak: {} day{}", streak, if streak == 1 { "" } else { "s" });
            println!(
                "Dark mode: {}",
                if store.dark_mode() { "on" } else { "off" }
            );
            println!("Default languages: {} -> {}", source.code(), target.code());
        }
    }

    Ok(())
}

async fn run_interactive(
    session: TranslateSession,
    store: Arc<SessionStore>,
    streak: u32,
) -> AppResult<()> {
    let (from, to) = session.languages();
    println!("Streak: {} day{}", streak, if streak == 1 { "" } else { "s" });
    println!(
        "Translating {} -> {}. Type text and pause to translate.",
        display_name(&from),
        display_name(&to)
    );
    println!("Commands: :swap  :fav  :history  :recall N  :quit");

    // Print every applied translation as it lands.
    let mut rx = session.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let translated = rx.borrow().clone();
            if !translated.is_empty() {
                println!("-> {}", translated);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":swap" => {
                session.swap_languages();
                let (from, to) = session.languages();
                println!("Now translating {} -> {}", from.code(), to.code());
            }
            ":fav" => {
                if session.favorite_current() {
                    println!("Saved to favorites.");
                } else {
                    println!("Nothing to save.");
                }
            }
            ":history" => {
                for (i, entry) in store.history().iter().enumerate() {
                    println!("{}. {} -> {}", i + 1, entry.text, entry.translation);
                }
            }
            cmd if cmd.starts_with(":recall") => {
                let history = store.history();
                match cmd.trim_start_matches(":recall").trim().parse::<usize>() {
                    Ok(n) if n >= 1 && n <= history.len() => {
                        let entry = &history[n - 1];
                        session.recall(
                            entry.text.clone(),
                            entry.translation.clone(),
                            entry.from.clone(),
                            entry.to.clone(),
                        );
                    }
                    _ => println!("Usage: :recall N (positions as listed by :history)"),
                }
            }
            _ => session.set_source_text(line),
        }
    }

    printer.abort();
    Ok(())
}
