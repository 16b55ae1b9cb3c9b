//! Title derivation and filename conventions shared by every step.
//!
//! Two title rules live here and are intentionally distinct:
//!
//! - [`format_title`] is used by the hierarchical tree builder and produces
//!   capitalized words (`03_my_cool-page.md` → `My Cool Page`).
//! - [`parse_flat_name`] is used by the per-directory flat meta generator and
//!   keeps the original casing (`03_my_cool-page.md` → `my cool-page`).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| built_in_regex(r"^\d+_"));
static WORD_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| built_in_regex(r"[_-]+"));
static ORDERED_DOCUMENT: LazyLock<Regex> =
	LazyLock::new(|| built_in_regex(r"^(\d+)_*(.+)\.(mdx?)$"));
static FILENAME_DISALLOWED: LazyLock<Regex> =
	LazyLock::new(|| built_in_regex(r"[^a-zA-Z0-9\-_]"));
static REPEATED_HYPHENS: LazyLock<Regex> = LazyLock::new(|| built_in_regex(r"-+"));

/// Compile one of the crate's literal patterns.
pub(crate) fn built_in_regex(source: &str) -> Regex {
	Regex::new(source).unwrap_or_else(|e| panic!("invalid built-in pattern `{source}`: {e}"))
}

/// Convert a file or directory name into a human readable title.
///
/// A leading `<digits>_` prefix and a trailing `.mdx` / `.md` extension are
/// removed, the remainder is split on runs of `_` and `-`, and every word is
/// capitalized (first character upper-case, the rest lower-case).
///
/// ```
/// use mdxgen_core::format_title;
///
/// assert_eq!(format_title("03_My_Cool-Page.md"), "My Cool Page");
/// assert_eq!(format_title("getting-started"), "Getting Started");
/// ```
pub fn format_title(name: &str) -> String {
	let name = NUMERIC_PREFIX.replace(name, "");
	let name = strip_markdown_extension(&name);

	WORD_SEPARATOR
		.split(name)
		.filter(|word| !word.is_empty())
		.map(capitalize)
		.collect::<Vec<_>>()
		.join(" ")
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	let Some(first) = chars.next() else {
		return String::new();
	};

	first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect()
}

/// Remove a trailing `.mdx` or `.md` extension, if present.
pub fn strip_markdown_extension(name: &str) -> &str {
	name.strip_suffix(".mdx")
		.or_else(|| name.strip_suffix(".md"))
		.unwrap_or(name)
}

/// Split a document filename into its numeric order and flat title.
///
/// Files following the `NN_title.md(x)` convention yield `Some(NN)`. Every
/// other file has no order and uses its extensionless name. In both cases
/// underscores become spaces and the casing is kept. A prefix too large for
/// `u64` is treated as part of the name.
pub fn parse_flat_name(file_name: &str) -> (Option<u64>, String) {
	let ordered = ORDERED_DOCUMENT.captures(file_name).and_then(|captures| {
		let order = captures.get(1)?.as_str().parse::<u64>().ok()?;
		let raw = captures.get(2).map_or("", |m| m.as_str());
		Some((Some(order), raw))
	});
	let (order, raw_title) =
		ordered.unwrap_or_else(|| (None, strip_markdown_extension(file_name)));

	(order, raw_title.replace('_', " ").trim().to_string())
}

/// The top-level key used for a directory's flat `_meta.json`.
pub fn flat_meta_key(dir: &Path, root: &Path) -> String {
	if dir == root {
		return ".".to_string();
	}

	dir.file_name()
		.map(|name| name.to_string_lossy().replace('_', " ").trim().to_string())
		.unwrap_or_else(|| ".".to_string())
}

/// Convert a filename into a URL friendly form without changing its case.
///
/// Spaces become hyphens, anything outside `[A-Za-z0-9_-]` is removed, runs
/// of hyphens collapse into one and leading or trailing hyphens are trimmed.
/// The extension is preserved untouched.
///
/// ```
/// use mdxgen_core::normalize_filename;
///
/// assert_eq!(normalize_filename("My File (v2).md"), "My-File-v2.md");
/// ```
pub fn normalize_filename(file_name: &str) -> String {
	let (stem, extension) = split_extension(file_name);
	let stem = stem.replace(' ', "-");
	let stem = FILENAME_DISALLOWED.replace_all(&stem, "");
	let stem = REPEATED_HYPHENS.replace_all(&stem, "-");

	format!("{}{extension}", stem.trim_matches('-'))
}

/// Split `name` into `(stem, ".ext")`. Leading dots never start an extension.
fn split_extension(name: &str) -> (&str, &str) {
	let leading_dots = name.len() - name.trim_start_matches('.').len();
	match name[leading_dots..].rfind('.') {
		Some(index) => name.split_at(leading_dots + index),
		None => (name, ""),
	}
}

/// Whether a path names a markdown or mdx document.
pub fn is_markdown_file(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| matches!(ext, "md" | "mdx"))
}

/// Entries whose name starts with a dot are never walked.
pub fn is_hidden_name(name: &str) -> bool {
	name.starts_with('.')
}

/// Render a path relative to `root` with forward slashes.
pub fn relative_slash_path(path: &Path, root: &Path) -> String {
	let relative = path.strip_prefix(root).unwrap_or(path);
	relative
		.components()
		.map(|component| component.as_os_str().to_string_lossy())
		.collect::<Vec<_>>()
		.join("/")
}
