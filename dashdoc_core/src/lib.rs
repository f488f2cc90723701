//! `dashdoc_core` is the core library for [dashdoc](https://github.com/ifiokjr/dashdoc). It maintains a document made of tagged, independently regenerable sections. Each section is produced by a pluggable zero-argument producer, and a regeneration pass rewrites the sections in registry order while leaving surrounding content such as headers untouched.
//!
//! ## Processing Pipeline
//!
//! ```text
//! dashdoc.toml
//!   → Config (ordered [[sections]] entries, header, display settings)
//!   → Section registry (tag + producer pairs, duplicate tags rejected)
//!   → Host (reads the marked dashboard file into blocks)
//!   → Regenerator (locates blocks by tag, regenerates, appends in registry order)
//!   → Host (commits the rendered document in one write)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `dashdoc.toml`.
//! - [`host`]: The document surface the regenerator reads from and writes to, with in-memory and file-backed implementations.
//! - [`producers`]: Built-in producers: literal text, file contents, shell commands and categorized file listings.
//!
//! ## Key Types
//!
//! - [`Document`]: An ordered sequence of [`Block`]s.
//! - [`SectionRegistry`]: The ordered list of [`SectionSpec`]s.
//! - [`Producer`]: A zero-argument content generator that may fail.
//! - [`RegenerationReport`]: Per-section outcomes of a regeneration pass.
//! - [`Dashboard`]: A loaded project ready to refresh its dashboard file.
//!
//! ## Marker Format
//!
//! Generated sections are stored between one-line markers so they can be
//! found again:
//!
//! ```markdown
//! # Dashboard
//! <!-- {@files} -->
//! ## Tracked
//! - ./
//!   - notes.md
//! <!-- {/files} -->
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use dashdoc_core::Document;
//! use dashdoc_core::SectionRegistry;
//! use dashdoc_core::TextProducer;
//! use dashdoc_core::regenerate;
//!
//! let mut registry = SectionRegistry::new();
//! registry
//! 	.register(Some("greeting"), TextProducer::new("greeting", "Hello!"))
//! 	.unwrap();
//!
//! let mut document = Document::with_header("# Dashboard");
//! let report = regenerate(&mut document, &registry);
//!
//! assert!(report.is_ok());
//! assert_eq!(document.text(), "# Dashboard\nHello!");
//! ```

pub use config::*;
pub use dashboard::*;
pub use document::*;
pub use error::*;
pub use host::*;
pub use parser::*;
pub use producers::*;
pub use registry::*;
pub use regenerator::*;

pub mod config;
mod dashboard;
mod document;
#[allow(unused_assignments)]
mod error;
pub mod host;
mod parser;
pub mod producers;
mod registry;
mod regenerator;
