use clap::{Args, Parser, Subcommand};
use mdnotes::render::Theme;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdnotes", version)]
#[command(about = "Folder-aware markdown notebook with HTML preview and PDF printing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Notes root directory (overrides config and MDNOTES_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print listings as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the folder tree
    Tree,

    /// List all notes, most recently modified first
    #[command(alias = "ls")]
    List,

    /// Print a note
    #[command(alias = "v")]
    Show { id: String },

    /// Create a note
    #[command(alias = "n")]
    New {
        /// Title of the note
        #[arg(default_value = "")]
        title: String,

        /// Folder to create the note in
        #[arg(long, value_name = "ID")]
        folder: Option<String>,

        /// Initial content (replaces the generated heading)
        #[arg(long, allow_hyphen_values = true)]
        content: Option<String>,
    },

    /// Rename a note or replace its content
    #[command(alias = "e")]
    Edit {
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New content
        #[arg(long, conflicts_with = "file", allow_hyphen_values = true)]
        content: Option<String>,

        /// Read the new content from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Delete a note
    Rm { id: String },

    /// Create a folder
    Mkdir {
        name: String,

        /// Parent folder
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },

    /// Rename a folder
    Mvdir { id: String, name: String },

    /// Delete a folder and everything in it
    Rmdir { id: String },

    /// Render a note as HTML
    Preview {
        id: String,

        /// light or dark (defaults to the configured theme)
        #[arg(long)]
        theme: Option<Theme>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a note as PDF
    Print {
        id: String,

        /// Destination PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (root, theme)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Writing assistant
    Ai {
        #[command(subcommand)]
        action: AiCommand,
    },

    /// Browse the plugin market
    Plugins {
        /// Filter by name, description or keyword
        search: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AiCommand {
    /// Show or change assistant settings
    Config(AiConfigArgs),

    /// Continue a text
    Continue {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Translate a text
    Translate {
        /// Target language: zh or en
        #[arg(long, default_value = "zh")]
        to: String,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Fix the grammar of a text
    Grammar {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Ask the assistant anything
    Chat {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct AiConfigArgs {
    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long)]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mdnotes").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["list", "--json", "--root", "/tmp/n"]);
        assert!(cli.json);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/n")));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn preview_parses_theme() {
        let cli = parse(&["preview", "abc", "--theme", "dark"]);
        match cli.command {
            Some(Commands::Preview { theme, .. }) => assert_eq!(theme, Some(Theme::Dark)),
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["mdnotes", "preview", "abc", "--theme", "pink"]).is_err());
    }

    #[test]
    fn edit_content_and_file_conflict() {
        let result = Cli::try_parse_from([
            "mdnotes", "edit", "abc", "--content", "x", "--file", "y.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn ai_text_collects_words() {
        let cli = parse(&["ai", "translate", "--to", "en", "hello", "world"]);
        match cli.command {
            Some(Commands::Ai {
                action: AiCommand::Translate { to, text },
            }) => {
                assert_eq!(to, "en");
                assert_eq!(text, vec!["hello", "world"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn content_may_start_with_a_hyphen() {
        let cli = parse(&["new", "List", "--content", "- milk\n- eggs"]);
        match cli.command {
            Some(Commands::New { content, .. }) => {
                assert_eq!(content.as_deref(), Some("- milk\n- eggs"))
            }
            other => panic!("unexpected {:?}", other),
        }

        let cli = parse(&["edit", "abc", "--content", "-x"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Edit { content: Some(c), .. }) if c == "-x"
        ));
    }

    #[test]
    fn print_requires_output() {
        assert!(Cli::try_parse_from(["mdnotes", "print", "abc"]).is_err());
    }
}
