use super::ident::SafePath;
use crate::error::{NotesError, Result};

pub const NOTE_EXTENSION: &str = ".md";

/// How many ` (n)` suffixes are tried before giving up on a name.
const MAX_SUFFIX: usize = 100;

const RESERVED: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Clean a user supplied title or folder name so it can be used as a path segment.
///
/// Reserved characters become `_` and whitespace runs collapse to a single space.
/// Blank input yields `fallback`.
pub fn sanitize_title(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    let replaced: String = trimmed
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.trim().is_empty() {
        fallback.to_string()
    } else {
        collapsed
    }
}

pub fn is_markdown(file_name: &str) -> bool {
    let bytes = file_name.as_bytes();
    bytes.len() >= NOTE_EXTENSION.len()
        && bytes[bytes.len() - NOTE_EXTENSION.len()..]
            .eq_ignore_ascii_case(NOTE_EXTENSION.as_bytes())
}

/// Filename without its extension; the markup extension is matched case-insensitively.
pub fn strip_extension(file_name: &str) -> &str {
    if is_markdown(file_name) {
        return &file_name[..file_name.len() - NOTE_EXTENSION.len()];
    }
    match file_name.rfind('.') {
        Some(index) if index > 0 => &file_name[..index],
        _ => file_name,
    }
}

/// Base filename for a title: a trailing markup extension is dropped so `notes.md`
/// does not become `notes.md.md`.
pub fn file_base_name(title: &str) -> String {
    if is_markdown(title) {
        strip_extension(title).to_string()
    } else {
        title.to_string()
    }
}

/// First free `{base}.md`, `{base} (1).md`, ... inside `folder`.
pub fn unique_note_path(folder: &SafePath, base: &str) -> Result<SafePath> {
    let candidate = folder.child(&format!("{}{}", base, NOTE_EXTENSION))?;
    if !candidate.absolute().exists() {
        return Ok(candidate);
    }
    for n in 1..=MAX_SUFFIX {
        let next = folder.child(&format!("{} ({}){}", base, n, NOTE_EXTENSION))?;
        if !next.absolute().exists() {
            return Ok(next);
        }
    }
    Err(NotesError::NameSpaceExhausted(base.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_title(r#"a\b/c:d*e?f"g<h>i|j"#, "x"), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_title("  Weekly \t  plan\n notes ", "x"), "Weekly plan notes");
    }

    #[test]
    fn sanitize_uses_fallback_for_blank() {
        assert_eq!(sanitize_title("", "Untitled"), "Untitled");
        assert_eq!(sanitize_title(" \t\n", "Untitled"), "Untitled");
    }

    #[test]
    fn markdown_matching_ignores_case() {
        assert!(is_markdown("a.md"));
        assert!(is_markdown("A.MD"));
        assert!(is_markdown("b.Md"));
        assert!(!is_markdown("a.txt"));
        assert!(!is_markdown("md"));
    }

    #[test]
    fn strip_extension_handles_markdown_and_others() {
        assert_eq!(strip_extension("Plan.MD"), "Plan");
        assert_eq!(strip_extension("Plan (2).md"), "Plan (2)");
        assert_eq!(strip_extension("archive.tar"), "archive");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("plain"), "plain");
    }

    #[test]
    fn base_name_drops_markdown_suffix() {
        assert_eq!(file_base_name("notes.md"), "notes");
        assert_eq!(file_base_name("notes"), "notes");
        assert_eq!(file_base_name("v1.2"), "v1.2");
    }

    #[test]
    fn unique_path_appends_counter() {
        let dir = TempDir::new().unwrap();
        let folder = SafePath::root(dir.path());

        let first = unique_note_path(&folder, "Untitled").unwrap();
        assert_eq!(first.file_name(), "Untitled.md");
        fs::write(first.absolute(), "").unwrap();

        let second = unique_note_path(&folder, "Untitled").unwrap();
        assert_eq!(second.file_name(), "Untitled (1).md");
        fs::write(second.absolute(), "").unwrap();

        let third = unique_note_path(&folder, "Untitled").unwrap();
        assert_eq!(third.file_name(), "Untitled (2).md");
    }

    #[test]
    fn unique_path_gives_up_after_budget() {
        let dir = TempDir::new().unwrap();
        let folder = SafePath::root(dir.path());
        fs::write(dir.path().join("Full.md"), "").unwrap();
        for n in 1..=MAX_SUFFIX {
            fs::write(dir.path().join(format!("Full ({}).md", n)), "").unwrap();
        }

        let err = unique_note_path(&folder, "Full").unwrap_err();
        assert!(matches!(err, NotesError::NameSpaceExhausted(_)));
    }
}
