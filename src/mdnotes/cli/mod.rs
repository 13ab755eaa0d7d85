mod args;
mod print;
mod styles;

use args::{AiCommand, AiConfigArgs, Cli, Commands};
use clap::Parser;
use console::Term;
use log::debug;
use mdnotes::api::NotesApi;
use mdnotes::assist::{Language, SettingsUpdate, Task};
use mdnotes::config::{AppDirs, NotesConfig, ROOT_ENV};
use mdnotes::error::{NotesError, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const LOG_ENV: &str = "MDNOTES_LOG";

struct AppContext {
    api: NotesApi,
    dirs: AppDirs,
    config: NotesConfig,
    json: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if !Term::stdout().features().colors_supported() {
        colored::control::set_override(false);
    }

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Tree) => handle_tree(&ctx),
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Show { id }) => handle_show(&ctx, &id),
        Some(Commands::New {
            title,
            folder,
            content,
        }) => handle_new(&ctx, &title, folder.as_deref(), content.as_deref()),
        Some(Commands::Edit {
            id,
            title,
            content,
            file,
        }) => handle_edit(&ctx, &id, title.as_deref(), content, file),
        Some(Commands::Rm { id }) => {
            ctx.api.delete_note(&id)?;
            print::print_success("Note deleted.");
            Ok(())
        }
        Some(Commands::Mkdir { name, parent }) => {
            let folder = ctx.api.create_folder(&name, parent.as_deref())?;
            if ctx.json {
                return print_json(&folder);
            }
            print::print_folder("Created", &folder);
            Ok(())
        }
        Some(Commands::Mvdir { id, name }) => {
            let folder = ctx.api.rename_folder(&id, &name)?;
            if ctx.json {
                return print_json(&folder);
            }
            print::print_folder("Renamed", &folder);
            Ok(())
        }
        Some(Commands::Rmdir { id }) => {
            ctx.api.delete_folder(&id)?;
            print::print_success("Folder deleted.");
            Ok(())
        }
        Some(Commands::Preview { id, theme, output }) => {
            let theme = theme.unwrap_or(ctx.config.theme);
            let html = ctx.api.preview_note(&id, theme)?;
            match output {
                Some(path) => {
                    fs::write(&path, html).map_err(NotesError::Io)?;
                    print::print_success(&format!("Preview written to {}", path.display()));
                }
                None => println!("{}", html),
            }
            Ok(())
        }
        Some(Commands::Print { id, output }) => {
            // Render fully before touching the destination.
            let mut pdf = Vec::new();
            ctx.api.print_note(&id, &mut pdf)?;
            fs::write(&output, pdf).map_err(NotesError::Io)?;
            print::print_success(&format!("PDF written to {}", output.display()));
            Ok(())
        }
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        Some(Commands::Ai { action }) => handle_ai(&mut ctx, action),
        Some(Commands::Plugins { search }) => {
            let entries = ctx.api.plugins().market(search.as_deref());
            if ctx.json {
                return print_json(&entries);
            }
            print::print_market(&entries);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::new().filter_or(LOG_ENV, default_level);
    // A second init (e.g. from tests) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let dirs = AppDirs::discover()?;
    let config = NotesConfig::load(&dirs.config_dir)?;

    let root = cli
        .root
        .clone()
        .or_else(|| std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| config.resolve_root(&dirs));
    debug!("using notes root {}", root.display());

    Ok(AppContext {
        api: NotesApi::open(root)?,
        dirs,
        config,
        json: cli.json,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(NotesError::Serialization)?;
    println!("{}", text);
    Ok(())
}

fn handle_tree(ctx: &AppContext) -> Result<()> {
    let tree = ctx.api.list_folder_tree()?;
    if ctx.json {
        return print_json(&tree);
    }
    print::print_tree(&tree);
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let notes = ctx.api.list_notes()?;
    if ctx.json {
        return print_json(&notes);
    }
    print::print_notes(&notes);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    let note = ctx.api.get_note(id)?;
    if ctx.json {
        return print_json(&note);
    }
    let words = mdnotes::words::count(&note.content);
    print::print_full_note(&note, words);
    Ok(())
}

fn handle_new(
    ctx: &AppContext,
    title: &str,
    folder: Option<&str>,
    content: Option<&str>,
) -> Result<()> {
    let mut note = ctx.api.create_note(title, folder)?;
    if let Some(content) = content {
        note = ctx.api.update_note(&note.id, None, Some(content))?;
    }
    if ctx.json {
        return print_json(&note);
    }
    print::print_created_note(&note);
    Ok(())
}

fn handle_edit(
    ctx: &AppContext,
    id: &str,
    title: Option<&str>,
    content: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let content = match (content, file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(fs::read_to_string(&path).map_err(NotesError::Io)?),
        (None, None) => None,
    };
    if title.is_none() && content.is_none() {
        return Err(NotesError::BadRequest(
            "nothing to change (use --title, --content or --file)".into(),
        ));
    }

    let note = ctx.api.update_note(id, title, content.as_deref())?;
    if ctx.json {
        return print_json(&note);
    }
    print::print_success(&format!("Updated note: {}", note.title));
    if note.id != id {
        print::print_info(&note.id);
    }
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key.as_deref(), value) {
        (None, _) => {
            print::print_config(&ctx.config, ctx.api.root());
        }
        (Some("root"), None) => println!("{}", ctx.api.root().display()),
        (Some("theme"), None) => println!("{}", ctx.config.theme),
        (Some(key), Some(value)) => {
            ctx.config.set(key, &value)?;
            ctx.config.save(&ctx.dirs.config_dir)?;
            print::print_success(&format!("{} = {}", key, value));
        }
        (Some(other), None) => {
            return Err(NotesError::Config(format!("unknown config key '{}'", other)));
        }
    }
    Ok(())
}

fn handle_ai(ctx: &mut AppContext, action: AiCommand) -> Result<()> {
    let (task, text) = match action {
        AiCommand::Config(args) => return handle_ai_config(ctx, args),
        AiCommand::Continue { text } => (Task::Continue, text),
        AiCommand::Translate { to, text } => (Task::Translate(Language::from_code(&to)), text),
        AiCommand::Grammar { text } => (Task::Grammar, text),
        AiCommand::Chat { text } => (Task::Chat, text),
    };
    let reply = ctx.api.assist(task, &text.join(" "), None)?;
    println!("{}", reply);
    Ok(())
}

fn handle_ai_config(ctx: &mut AppContext, args: AiConfigArgs) -> Result<()> {
    let update = SettingsUpdate {
        provider: args.provider,
        api_key: args.api_key,
        api_url: args.api_url,
        model: args.model,
    };
    let settings = if update.is_empty() {
        ctx.api.assist_settings()
    } else {
        ctx.api.update_assist_settings(update)?
    };
    if ctx.json {
        return print_json(&settings);
    }
    print::print_assist_settings(&settings);
    Ok(())
}
