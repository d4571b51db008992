//! Application run modes: logger init, command dispatch, and the commands
//! that talk to the model.

use std::error::Error;
use std::io::{self, Write};

use clap::CommandFactory;

use crate::cli::{self, Args, Commands, ConfigSubcommand, HistorySubcommand};
use crate::core;
use crate::core::booster;
use crate::core::cli::{load_store, print_wrapped, read_arg_or_stdin};
use crate::core::config::{self, Config};
use crate::core::history::storage;
use crate::core::llm::OpenRouterModel;
use crate::core::text::format_result;

type CmdResult = Result<(), Box<dyn Error>>;

/// Initialize env_logger on stderr. `RUST_LOG` overrides the -v/-q level.
pub fn init_logger(args: &Args) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level()),
    )
    .try_init();
}

/// Run the parsed command.
pub async fn dispatch(args: Args) -> CmdResult {
    match args.command {
        Commands::Enhance { prompt, copy } => run_enhance(&prompt, copy).await,
        Commands::Execute { id, html, no_stream } => {
            run_execute(id.as_deref(), html, no_stream).await
        }
        Commands::FollowUp { id, prompt } => run_follow_up(&id, &prompt).await,
        Commands::Edit { id, prompt } => run_edit(&id, &prompt),
        Commands::History { subcommand } => match subcommand {
            HistorySubcommand::List { limit } => {
                core::cli::run_history_list(limit);
                Ok(())
            }
            HistorySubcommand::Show { id } => core::cli::run_history_show(&id),
            HistorySubcommand::Remove { id } => core::cli::run_history_remove(&id),
            HistorySubcommand::Clear => core::cli::run_history_clear(),
        },
        Commands::Export { id, output, open } => {
            core::cli::run_export(&id, output.as_deref(), open)
        }
        Commands::Segment { json } => core::cli::run_segment(json),
        Commands::Render { tables_only } => core::cli::run_render(tables_only),
        Commands::Config { subcommand } => match subcommand {
            None => {
                core::cli::run_config();
                Ok(())
            }
            Some(ConfigSubcommand::SetApiKey { api_key }) => {
                core::cli::run_config_set_api_key(api_key)
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut io::stdout());
            Ok(())
        }
    }
}

/// Model client that echoes streamed chunks to stdout when `stream` is set.
fn model_for(config: &Config, stream: bool) -> OpenRouterModel {
    let model = OpenRouterModel::new(config);
    if !stream {
        return model;
    }
    model.with_chunk_callback(Box::new(|s| {
        let _ = io::stdout().write_all(s.as_bytes());
        let _ = io::stdout().flush();
    }))
}

/// Run `enhance`: improve the prompt, save the session, print the result.
pub async fn run_enhance(prompt_arg: &str, copy: bool) -> CmdResult {
    let prompt = read_arg_or_stdin(prompt_arg)?;
    let config = config::load()?;
    let mut store = load_store();
    let model = model_for(&config, false);
    log::info!("Enhancing prompt with {}", model.model());

    let enhanced = booster::enhance(&model, &mut store, &prompt).await?;
    storage::save(&store)?;

    println!("Session {}\n", enhanced.id);
    print_wrapped(&enhanced.segmented.main_artifact);
    if let Some(rationale) = &enhanced.segmented.rationale {
        println!("\n## Rationale\n");
        print_wrapped(rationale);
    }

    if copy {
        match arboard::Clipboard::new()
            .and_then(|mut c| c.set_text(enhanced.segmented.main_artifact.clone()))
        {
            Ok(()) => eprintln!("Improved prompt copied to clipboard."),
            Err(e) => log::warn!("Clipboard unavailable: {}", e),
        }
    }
    Ok(())
}

/// Run `execute`: send a session's improved prompt and store the result.
pub async fn run_execute(id: Option<&str>, html: bool, no_stream: bool) -> CmdResult {
    let config = config::load()?;
    let mut store = load_store();
    let id = match id {
        Some(id) => id.to_string(),
        None => store
            .newest()
            .map(|s| s.id.clone())
            .ok_or("No sessions in history (run `enhance` first)")?,
    };
    let stream = !html && !no_stream;
    let model = model_for(&config, stream);
    log::info!("Executing session {} with {}", id, model.model());

    let result = booster::execute(&model, &mut store, &id).await?;
    storage::save(&store)?;

    if html {
        println!("{}", format_result(&result));
    } else if stream {
        println!();
    } else {
        println!("{}", result);
    }
    Ok(())
}

/// Run `follow-up`: continue an executed session, streaming the new answer.
pub async fn run_follow_up(id: &str, prompt_arg: &str) -> CmdResult {
    let request = read_arg_or_stdin(prompt_arg)?;
    let config = config::load()?;
    let mut store = load_store();
    let model = model_for(&config, true);

    booster::follow_up(&model, &mut store, id, &request).await?;
    storage::save(&store)?;
    println!();
    Ok(())
}

/// Run `edit`: replace the improved prompt of a session. No model call.
pub fn run_edit(id: &str, prompt_arg: &str) -> CmdResult {
    let new_prompt = read_arg_or_stdin(prompt_arg)?;
    let mut store = load_store();
    let edited = booster::edit(&mut store, id, &new_prompt)?;
    storage::save(&store)?;
    println!("Updated session {}\n", id);
    print_wrapped(&edited.main_artifact);
    Ok(())
}
