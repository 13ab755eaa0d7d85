//! # mdnotes Architecture
//!
//! mdnotes is a **UI-agnostic markdown notebook library**: notes are `.md` files in ordinary
//! folders, addressed by opaque identifiers, and rendered either as a themed HTML preview
//! or as a printable PDF. The `mdnotes` binary is one client of the library.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade, composes store + parser + renderers         │
//! │  - Owns assistant settings and the plugin registry          │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Storage Layer (store/)       │ │  Rendering (markup.rs,    │
//! │  - Identifier codec, SafePath │ │  render/)                 │
//! │  - NoteStore over a root dir  │ │  - HTML preview, PDF print│
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! The store and the renderers never call each other. A caller reads a note's text from
//! the store and hands it to [`markup::parse`], then to one of the renderers.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments, returns [`error::Result`],
//! never writes to stdout/stderr and never exits the process. Diagnostics go through the
//! `log` facade; the binary decides whether and where they are printed.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`store`]: Identifier codec, path safety and the filesystem note store
//! - [`markup`]: Markdown parsing into a document tree
//! - [`render`]: HTML preview and PDF print renderers
//! - [`model`]: Core data types (`Note`, `NoteSummary`, `FolderNode`)
//! - [`assist`]: Writing assistant and its settings
//! - [`plugins`]: Plugin marketplace catalog and install state
//! - [`words`]: Mixed CJK/latin word counting
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod assist;
pub mod config;
pub mod error;
pub mod markup;
pub mod model;
pub mod plugins;
pub mod render;
pub mod store;
pub mod words;
