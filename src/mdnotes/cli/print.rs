use super::styles::STYLES;
use chrono::{DateTime, Utc};
use colored::Colorize;
use mdnotes::assist::MaskedSettings;
use mdnotes::config::NotesConfig;
use mdnotes::model::{FolderNode, Note, NoteSummary};
use mdnotes::plugins::MarketEntry;
use std::path::Path;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 18;

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(super) fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub(super) fn print_tree(nodes: &[FolderNode]) {
    if nodes.is_empty() {
        println!("No notes found.");
        return;
    }
    print_tree_level(nodes, "");
}

fn print_tree_level(nodes: &[FolderNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let branch = if last { "└── " } else { "├── " };
        let name = if node.is_folder() {
            STYLES.folder.apply_to(format!("{}/", node.name)).to_string()
        } else {
            STYLES.note.apply_to(&node.name).to_string()
        };
        println!(
            "{}{}{}  {}",
            prefix,
            branch,
            name,
            STYLES.id.apply_to(&node.id)
        );
        if node.is_folder() {
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            print_tree_level(node.children(), &child_prefix);
        }
    }
}

pub(super) fn print_notes(notes: &[NoteSummary]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    for (i, note) in notes.iter().enumerate() {
        let idx_str = format!("{:>3}. ", i + 1);
        let time_ago = format_time_ago(note.updated_at);
        let id = truncate_to_width(&note.id, ID_WIDTH);

        let fixed_width = idx_str.width() + ID_WIDTH + 2 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&note.title, available);
        let padding = available.saturating_sub(title_display.width());

        println!(
            "{}{}{}  {:<id_width$}{}",
            idx_str,
            title_display,
            " ".repeat(padding),
            STYLES.id.apply_to(id),
            time_ago.dimmed(),
            id_width = ID_WIDTH
        );
    }
}

pub(super) fn print_full_note(note: &Note, words: usize) {
    println!(
        "{} {}",
        STYLES.heading.apply_to(&note.title),
        format!("({} words, updated {})", words, format_time_ago(note.updated_at).trim())
            .dimmed()
    );
    println!("--------------------------------");
    println!("{}", note.content);
}

pub(super) fn print_created_note(note: &Note) {
    print_success(&format!("Created note: {}", note.title));
    print_info(&note.id);
}

pub(super) fn print_folder(action: &str, folder: &FolderNode) {
    print_success(&format!("{} folder: {}", action, folder.name));
    print_info(&folder.id);
}

pub(super) fn print_market(entries: &[MarketEntry]) {
    if entries.is_empty() {
        println!("No plugins found.");
        return;
    }
    for entry in entries {
        let p = &entry.plugin;
        let status = match entry.enabled {
            Some(true) => " [enabled]".green().to_string(),
            Some(false) => " [disabled]".yellow().to_string(),
            None => String::new(),
        };
        println!(
            "{} {} {}{}",
            p.icon,
            p.name.bold(),
            format!("v{} by {}", p.version, p.author).dimmed(),
            status
        );
        println!(
            "   {}  {}",
            p.description,
            format!("({}, ★ {:.1}, {} downloads)", p.id, p.rating, p.downloads).dimmed()
        );
    }
}

pub(super) fn print_config(config: &NotesConfig, root: &Path) {
    println!("root = {}", root.display());
    println!("theme = {}", config.theme);
}

pub(super) fn print_assist_settings(settings: &MaskedSettings) {
    println!("provider = {}", settings.provider);
    println!("api-url = {}", settings.api_url);
    println!("model = {}", settings.model);
    println!(
        "api-key = {}",
        if settings.has_api_key { "(set)" } else { "(not set)" }
    );
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_to_width("short", 10), "short");
    }

    #[test]
    fn truncate_counts_display_width() {
        let out = truncate_to_width("日本語のタイトル", 7);
        assert!(out.ends_with('…'));
        assert!(out.width() <= 7);
    }

    #[test]
    fn time_ago_is_right_aligned() {
        let s = format_time_ago(Utc::now() - Duration::hours(2));
        assert_eq!(s.width(), TIME_WIDTH);
        assert!(s.trim_start().starts_with("2 hours"));
    }
}
