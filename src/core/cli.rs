//! CLI-only commands that never call the model: config info, history
//! management, export, and the offline text tools.
//!
//! These produce plain text output; errors are returned to `main`.

use std::error::Error;
use std::io;
use std::path::Path;

use crate::core::api_key;
use crate::core::app;
use crate::core::config::{self, DEFAULT_MODEL};
use crate::core::dates;
use crate::core::export;
use crate::core::history::{self, HistoryError, HistoryStore, storage};
use crate::core::paths;
use crate::core::text::{format_result, normalize_tables, segment, wrap_message};

/// Column width for wrapped terminal output.
pub const WRAP_WIDTH: usize = 100;

type CmdResult = Result<(), Box<dyn Error>>;

/// Read a command argument, or all of stdin when the argument is `-`.
pub fn read_arg_or_stdin(arg: &str) -> io::Result<String> {
    if arg == "-" {
        read_stdin()
    } else {
        Ok(arg.to_string())
    }
}

fn read_stdin() -> io::Result<String> {
    io::read_to_string(io::stdin())
}

/// Print `text` wrapped to the terminal width.
pub fn print_wrapped(text: &str) {
    for line in wrap_message(text, WRAP_WIDTH) {
        println!("{}", line);
    }
}

/// The history slot, bounded to the newest `MAX_SESSIONS` sessions.
pub fn load_store() -> HistoryStore {
    storage::load(history::MAX_SESSIONS)
}

fn display_or_dash(p: Option<std::path::PathBuf>) -> String {
    p.map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// Run the `config` command: display paths, model, and API key status.
pub fn run_config() {
    let model_source = if std::env::var("OPENROUTER_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .is_some()
    {
        "from OPENROUTER_MODEL"
    } else {
        "default"
    };
    let api_key_status = match config::resolve_api_key() {
        Some((_, source)) => format!("set ✓ ({})", source.label()),
        None => "not set".to_string(),
    };

    println!("{} {}", app::NAME, app::VERSION);
    println!("Config:   {}", display_or_dash(paths::config_dir()));
    println!("History:  {}", display_or_dash(storage::slot_path()));
    println!("Exports:  {}", display_or_dash(paths::cache_dir().map(|d| d.join("exports"))));
    println!("Base URL: {}", config::base_url());
    println!("Model:    {} ({})", config::model_id(), model_source);
    if config::model_id() != DEFAULT_MODEL {
        println!("          default is {}", DEFAULT_MODEL);
    }
    println!("API key:  {}", api_key_status);
}

/// Run the `config set-api-key` command: store API key in config directory.
pub fn run_config_set_api_key(api_key: Option<String>) -> CmdResult {
    let key = match api_key {
        Some(k) if !k.trim().is_empty() => k,
        _ => read_stdin()?,
    };
    let path = api_key::store_api_key(&key)?;
    println!("API key saved to {}", path.display());
    Ok(())
}

/// Run the `history list` command: one line per session, newest first.
pub fn run_history_list(limit: Option<usize>) {
    let store = load_store();
    if store.is_empty() {
        println!("No sessions yet.");
        return;
    }
    let take = limit.unwrap_or(store.len());
    for s in store.list().take(take) {
        let status = if s.execution_result.is_some() {
            "executed"
        } else {
            "enhanced"
        };
        println!(
            "{}\t{}\t{}\t{}",
            s.id,
            s.title(50),
            dates::format_local(&s.last_updated_at),
            status
        );
    }
}

/// Run the `history show` command: prompts, rationale, and result of one session.
pub fn run_history_show(id: &str) -> CmdResult {
    let store = load_store();
    let session = store
        .get(id)
        .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
    let segmented = session.segmented();

    println!("Session {}", session.id);
    println!("Created: {}", dates::format_local(&session.created_at));
    println!("Updated: {}", dates::format_local(&session.last_updated_at));
    println!("\n## Original prompt\n");
    print_wrapped(&session.original_prompt);
    println!("\n## Improved prompt\n");
    print_wrapped(&segmented.main_artifact);
    if let Some(rationale) = &segmented.rationale {
        println!("\n## Rationale\n");
        print_wrapped(rationale);
    }
    if let Some(result) = &session.execution_result {
        println!("\n## Result\n");
        print_wrapped(result);
    }
    Ok(())
}

/// Run the `history remove` command.
pub fn run_history_remove(id: &str) -> CmdResult {
    let mut store = load_store();
    let removed = store.remove(id)?;
    storage::save(&store)?;
    println!("Removed session {} ({})", removed.id, removed.title(50));
    Ok(())
}

/// Run the `history clear` command.
pub fn run_history_clear() -> CmdResult {
    let mut store = load_store();
    let count = store.len();
    store.clear();
    storage::save(&store)?;
    println!("Cleared {} session(s)", count);
    Ok(())
}

/// Run the `export` command: write the session page, optionally open it.
pub fn run_export(id: &str, output: Option<&Path>, open: bool) -> CmdResult {
    let store = load_store();
    let session = store
        .get(id)
        .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
    let path = export::write_session_page(session, output)?;
    println!("{}", path.display());
    if open {
        opener::open(&path)?;
    }
    Ok(())
}

/// Run the `segment` command: split stdin into improved prompt and rationale.
pub fn run_segment(json: bool) -> CmdResult {
    let input = read_stdin()?;
    let seg = segment(Some(&input));
    if json {
        println!("{}", serde_json::to_string_pretty(&seg)?);
        return Ok(());
    }
    println!("{}", seg.main_artifact);
    if let Some(rationale) = &seg.rationale {
        println!("\n--- rationale ---\n{}", rationale);
    }
    Ok(())
}

/// Run the `render` command: format stdin as HTML.
pub fn run_render(tables_only: bool) -> CmdResult {
    let input = read_stdin()?;
    let out = if tables_only {
        normalize_tables(&input)
    } else {
        format_result(&input)
    };
    println!("{}", out);
    Ok(())
}
