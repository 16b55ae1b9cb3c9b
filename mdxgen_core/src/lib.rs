//! `mdxgen_core` is the library behind the [mdxgen](https://github.com/ifiokjr/mdxgen) documentation preprocessor. It turns a directory of markdown and mdx files into the navigation metadata and cross-links a static documentation site needs.
//!
//! ## Steps
//!
//! ```text
//! normalize        → rename files to URL friendly names
//! fix-frontmatter  → escape single quotes in title/description values
//! meta             → per-directory ordered _meta.json files
//! root-meta        → one hierarchical _meta.tree.json for the whole tree
//! index            → index.mdx rendered from _meta.tree.json
//! nav              → circular previous/next links appended to documents
//! validate         → every file a meta file references exists
//! ```
//!
//! Every step shares the same signature and is registered in [`STEPS`]. Steps
//! take a [`StepOptions`] (including `dry_run`) and a [`StepContext`] which
//! carries the event channel and the cancellation flag, and return a
//! [`StepReport`].
//!
//! ## Key Types
//!
//! - [`MetaDocument`]: a single-key meta document, either hierarchical
//!   ([`TreeMeta`]) or flat ([`FlatMeta`]).
//! - [`Frontmatter`]: the parse state of a document's YAML frontmatter.
//! - [`MdxConfig`]: configuration loaded from `mdxgen.toml`.
//! - [`StepEvent`]: progress and messages emitted while a step runs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use mdxgen_core::MdxConfig;
//! use mdxgen_core::StepContext;
//! use mdxgen_core::StepKind;
//! use mdxgen_core::StepOptions;
//! use mdxgen_core::run_step;
//!
//! let root = Path::new("docs");
//! let mut options = StepOptions::new(MdxConfig::load_or_default(root).unwrap());
//! options.dry_run = true;
//!
//! let report = run_step(StepKind::InjectNavLinks, root, &options, &StepContext::new()).unwrap();
//! println!("{} files would change", report.changes.len());
//! ```

pub use config::*;
pub use error::*;
pub use events::*;
pub use files::*;
pub use fix_frontmatter::*;
pub use flat::*;
pub use frontmatter::*;
pub use index::*;
pub use meta::*;
pub use naming::*;
pub use nav::*;
pub use normalize::*;
pub use step::*;
pub use tree::*;
pub use validate::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
mod events;
pub mod files;
mod fix_frontmatter;
mod flat;
mod frontmatter;
mod index;
mod meta;
pub mod naming;
mod nav;
mod normalize;
mod step;
mod tree;
mod validate;
