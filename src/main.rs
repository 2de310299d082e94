use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use jotter::config::{self, SummarizeConfig};
use jotter::summarize::HttpSummarizer;
use jotter::theme;
use jotter_core::models::NoteUpdate;
use jotter_core::state::Notebook;
use jotter_core::store::{NoteStore, SqliteStore};
use jotter_core::summarize::Summarizer;

#[derive(Parser)]
#[command(name = "jot")]
#[command(about = "Local-first notes with AI summaries")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new note and select it
    New,
    /// List notes, most recently updated first
    List,
    /// Print a note (defaults to the selected note)
    Show { id: Option<String> },
    /// Update a note's title or content (defaults to the selected note)
    Edit {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Delete a note
    Delete { id: String },
    /// Generate an AI summary (defaults to the selected note)
    Summarize { id: Option<String> },
    /// Toggle between light and dark theme
    Theme,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jotter=info,jotter_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = open_store()?;
    let mut notebook = Notebook::initialize(store, theme::ambient_dark_preference())?;
    tracing::debug!(notes = notebook.notes().len(), "notebook loaded");

    match cli.command {
        Some(Commands::New) => {
            let id = notebook.add_note()?;
            println!("Created note {}", short_id(id));
        }
        Some(Commands::List) | None => list_notes(&notebook),
        Some(Commands::Show { id }) => show_note(&notebook, id.as_deref())?,
        Some(Commands::Edit { title, content, id }) => {
            if title.is_none() && content.is_none() {
                anyhow::bail!("nothing to change; pass --title and/or --content");
            }
            let id = target_id(&notebook, id.as_deref())?;
            notebook.update_note(
                id,
                NoteUpdate {
                    title,
                    content,
                    ..Default::default()
                },
            )?;
            println!("Updated note {}", short_id(id));
        }
        Some(Commands::Delete { id }) => {
            let id = resolve_id(&notebook, &id)?;
            notebook.delete_note(id)?;
            println!("Deleted note {}", short_id(id));
        }
        Some(Commands::Summarize { id }) => {
            let id = target_id(&notebook, id.as_deref())?;
            summarize(&mut notebook, id).await?;
        }
        Some(Commands::Theme) => {
            let dark = notebook.toggle_dark_mode()?;
            println!("Theme: {}", if dark { "dark" } else { "light" });
        }
    }

    Ok(())
}

async fn summarize(notebook: &mut Notebook, id: Uuid) -> anyhow::Result<()> {
    let Some(text) = notebook.begin_summarize(id)? else {
        println!("Nothing to summarize: the note is empty.");
        return Ok(());
    };

    let config = SummarizeConfig::from_env()?;
    let summarizer = HttpSummarizer::new(&config)?;
    let outcome = summarizer.summarize(&text).await;
    let failed = outcome.is_err();
    notebook.finish_summarize(id, outcome)?;

    if failed {
        // The state manager already logged the cause
        println!("Summarization failed; the note is unchanged.");
    } else if let Some(summary) = notebook.get(id).and_then(|note| note.summary.as_deref()) {
        println!("{summary}");
    }
    Ok(())
}

fn open_store() -> anyhow::Result<NoteStore> {
    let backend = match config::data_dir_override() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("could not create {}", dir.display()))?;
            SqliteStore::open(dir.join("jotter.db"))?
        }
        None => SqliteStore::open_default()?,
    };
    Ok(NoteStore::new(backend))
}

fn list_notes(notebook: &Notebook) {
    let notes = notebook.notes_by_recency();
    if notes.is_empty() {
        println!("No notes yet. Create your first note with `jot new`.");
        return;
    }
    for note in notes {
        let marker = if Some(note.id) == notebook.active_note_id() {
            '*'
        } else {
            ' '
        };
        let badge = if note.summary.is_some() {
            "  [summary]"
        } else {
            ""
        };
        println!(
            "{marker} {}  {}  {}{}",
            short_id(note.id),
            note.updated_at.format("%b %e %H:%M"),
            note.title,
            badge
        );
        println!("           {}", preview(&note.content));
    }
}

fn show_note(notebook: &Notebook, id: Option<&str>) -> anyhow::Result<()> {
    let note = match id {
        Some(prefix) => {
            let id = resolve_id(notebook, prefix)?;
            notebook
                .get(id)
                .context("the note disappeared while resolving its id")?
        }
        None => match notebook.active_note() {
            Some(note) => note,
            None => {
                println!("Select a note or create a new one to get started.");
                return Ok(());
            }
        },
    };

    println!("{}", note.title);
    println!(
        "{} · created {} · updated {}",
        short_id(note.id),
        note.created_at.format("%b %e %Y %H:%M"),
        note.updated_at.format("%b %e %Y %H:%M"),
    );
    println!();
    println!("{}", note.content);
    if let Some(summary) = &note.summary {
        println!();
        println!("AI Summary");
        println!("{summary}");
    }
    Ok(())
}

/// NoteCard-style preview: the first 60 characters on one line.
fn preview(content: &str) -> String {
    if content.is_empty() {
        return "Empty note".to_string();
    }
    let flat = content.replace('\n', " ");
    let mut shortened: String = flat.chars().take(60).collect();
    if flat.chars().count() > 60 {
        shortened.push_str("...");
    }
    shortened
}

fn target_id(notebook: &Notebook, id: Option<&str>) -> anyhow::Result<Uuid> {
    match id {
        Some(prefix) => resolve_id(notebook, prefix),
        None => notebook
            .active_note_id()
            .context("no note is selected; pass an id"),
    }
}

/// Accepts a full uuid or an unambiguous prefix of one.
fn resolve_id(notebook: &Notebook, prefix: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(prefix) {
        return Ok(id);
    }
    let prefix = prefix.to_lowercase();
    let matches: Vec<Uuid> = notebook
        .notes()
        .iter()
        .filter(|note| note.id.to_string().starts_with(&prefix))
        .map(|note| note.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => anyhow::bail!("no note matches id `{prefix}`"),
        _ => anyhow::bail!("id `{prefix}` is ambiguous"),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
