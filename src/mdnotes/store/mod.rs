//! # Storage Layer
//!
//! Notes are plain markdown files laid out in ordinary folders under a single root
//! directory. There is no index file: the directory tree *is* the database, so notes
//! written by other tools show up as soon as they land on disk.
//!
//! ## Identifiers
//!
//! Callers never see filesystem paths. Every note and folder is addressed by an opaque
//! identifier produced by [`ident::encode`]. Turning an identifier back into a location
//! always goes through [`ident::resolve`], which refuses anything outside the root.
//! See [`ident::SafePath`].
//!
//! ## Storage Format
//!
//! ```text
//! notes/
//! ├── Inbox.md
//! ├── Work/
//! │   ├── Plans/
//! │   │   └── Q3.md
//! │   └── Standup (1).md
//! └── .ai-config.json     # assistant settings, invisible to listings
//! ```
//!
//! - The title of a note is its filename without the `.md` extension.
//! - Name collisions are resolved by appending ` (n)`, see [`naming::unique_note_path`].
//! - Removing the last note of a folder removes the folder, and any emptied ancestors.

pub mod fs;
pub mod ident;
pub mod naming;

pub use fs::NoteStore;
pub use ident::SafePath;
