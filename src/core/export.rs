//! Standalone HTML page for one session: prompts, rationale, and the formatted result.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use askama::Template;

use crate::core::dates;
use crate::core::history::Session;
use crate::core::paths;
use crate::core::text::format_result;

/// Prompts and the title are escaped by the template; rationale and result
/// are already HTML.
#[derive(Template)]
#[template(path = "session.html")]
struct SessionPage<'a> {
    title: String,
    created: String,
    original_prompt: &'a str,
    main_artifact: String,
    rationale: Option<String>,
    result: Option<String>,
}

/// Render the full HTML document for `session`.
pub fn session_page(session: &Session) -> askama::Result<String> {
    let segmented = session.segmented();
    SessionPage {
        title: session.title(80),
        created: dates::format_local(&session.created_at),
        original_prompt: &session.original_prompt,
        main_artifact: segmented.main_artifact,
        rationale: segmented.rationale.as_deref().map(format_result),
        result: session.execution_result.as_deref().map(format_result),
    }
    .render()
}

/// Default export location: `<cache>/exports/session-<id>.html`.
pub fn default_export_path(id: &str) -> Option<PathBuf> {
    paths::cache_dir().map(|d| d.join("exports").join(format!("session-{}.html", id)))
}

/// Write the page for `session` to `output` (or the default location) and return the path.
pub fn write_session_page(session: &Session, output: Option<&Path>) -> io::Result<PathBuf> {
    let path = match output {
        Some(p) => p.to_path_buf(),
        None => default_export_path(&session.id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No cache directory"))?,
    };
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    let page = session_page(session).map_err(io::Error::other)?;
    fs::write(&path, page)?;
    log::info!("Exported session {} to {}", session.id, path.display());
    Ok(path)
}
