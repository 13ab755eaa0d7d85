//! # Rendering
//!
//! The same parsed [`Node`](crate::markup::Node) tree feeds two independent targets:
//!
//! - [`preview`]: a themed, self-contained HTML document.
//! - [`print`]: styled blocks handed to a [`print::PrintSink`]; [`pdf::PdfSink`] lays them
//!   out as an A4 PDF.
//!
//! Both are plain functions with an explicit `match` over the node kinds. Neither holds
//! state between calls, so documents can be rendered in parallel.

pub mod pdf;
pub mod preview;
pub mod print;

pub use pdf::PdfSink;
pub use preview::Theme;
pub use print::{PrintBlock, PrintSink};
