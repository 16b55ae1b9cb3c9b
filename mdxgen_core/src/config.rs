use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Deserialize;

use crate::MdxError;
use crate::MdxResult;
use crate::meta::META_FILE_NAME;
use crate::meta::ROOT_META_FILE_NAME;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["mdxgen.toml", ".mdxgen.toml", ".config/mdxgen.toml"];

/// Top-level key of the hierarchical meta document when nothing else is set.
pub const DEFAULT_LABEL: &str = "Documentation";

/// Default name of the rendered index page.
pub const DEFAULT_INDEX_FILE: &str = "index.mdx";

/// Configuration loaded from an `mdxgen.toml` file.
///
/// ```toml
/// label = "Documentation"
/// meta_file = "_meta.json"
/// root_meta_file = "_meta.tree.json"
/// skip_empty = true
///
/// [index]
/// file = "index.mdx"
/// heading = "Documentation"
/// intro = "Everything you need to know."
///
/// [index.descriptions]
/// "Getting Started" = "Install the tools and write your first page."
///
/// [exclude]
/// patterns = ["drafts/", "*.wip.md"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MdxConfig {
	/// Top-level key of the generated hierarchical meta document.
	#[serde(default = "default_label")]
	pub label: String,
	/// File name of the per-directory meta documents.
	#[serde(default = "default_meta_file")]
	pub meta_file: String,
	/// File name of the hierarchical meta document written at the root.
	#[serde(default = "default_root_meta_file")]
	pub root_meta_file: String,
	/// Omit directories without any documents from the hierarchical tree.
	#[serde(default = "default_true")]
	pub skip_empty: bool,
	#[serde(default)]
	pub index: IndexConfig,
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

impl Default for MdxConfig {
	fn default() -> Self {
		Self {
			label: default_label(),
			meta_file: default_meta_file(),
			root_meta_file: default_root_meta_file(),
			skip_empty: true,
			index: IndexConfig::default(),
			exclude: ExcludeConfig::default(),
		}
	}
}

/// Settings for the rendered `index.mdx` page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
	/// Output file name, written next to the meta file.
	#[serde(default)]
	pub file: Option<String>,
	/// The H1 heading. Defaults to the meta document's label.
	#[serde(default)]
	pub heading: Option<String>,
	/// Paragraph shown under the heading.
	#[serde(default)]
	pub intro: Option<String>,
	/// Extra category descriptions, keyed by category title. These take
	/// precedence over the built-in table.
	#[serde(default)]
	pub descriptions: BTreeMap<String, String>,
}

/// Paths skipped by every walk.
///
/// Patterns follow gitignore syntax and are relative to the documentation
/// root. Hidden entries are always skipped regardless of these patterns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_label() -> String {
	DEFAULT_LABEL.to_string()
}

fn default_meta_file() -> String {
	META_FILE_NAME.to_string()
}

fn default_root_meta_file() -> String {
	ROOT_META_FILE_NAME.to_string()
}

fn default_true() -> bool {
	true
}

impl MdxConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> MdxResult<Option<MdxConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content =
			std::fs::read_to_string(&config_path).map_err(|e| MdxError::read(&config_path, e))?;
		let config: MdxConfig =
			toml::from_str(&content).map_err(|e| MdxError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Load the config or fall back to the defaults.
	pub fn load_or_default(root: &Path) -> MdxResult<MdxConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	/// Build the matcher for `[exclude]` patterns rooted at `root`.
	pub fn exclude_matcher(&self, root: &Path) -> MdxResult<Gitignore> {
		build_exclude_matcher(root, &self.exclude.patterns)
	}
}

/// Build a `Gitignore` matcher from exclude patterns specified in
/// `mdxgen.toml` `[exclude]`.
pub fn build_exclude_matcher(root: &Path, patterns: &[String]) -> MdxResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			MdxError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| MdxError::ConfigParse(format!("failed to build exclude rules: {e}")))
}
