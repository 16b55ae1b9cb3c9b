use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

use crate::MdxError;
use crate::MdxResult;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::files::WalkFilter;

const STEP: StepKind = StepKind::ValidateMeta;

/// A single problem found while validating a meta document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationIssue {
	/// A document entry points at a file that does not exist.
	MissingFile {
		location: String,
		path: String,
		title: String,
	},
	/// The document or one of its entries has the wrong shape.
	Format { location: String, reason: String },
}

impl ValidationIssue {
	pub fn is_missing_file(&self) -> bool {
		matches!(self, Self::MissingFile { .. })
	}
}

impl fmt::Display for ValidationIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingFile {
				location,
				path,
				title,
			} => {
				write!(
					f,
					"missing file `{path}` at {location} (referenced by entry titled `{title}`)"
				)
			}
			Self::Format { location, reason } => write!(f, "invalid entry at {location}: {reason}"),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
	pub meta_files: usize,
	pub files_checked: usize,
	pub folders_checked: usize,
	pub valid_files: usize,
	pub missing_files: usize,
	pub format_errors: usize,
}

impl ValidationStats {
	fn absorb(&mut self, other: &Self) {
		self.meta_files += other.meta_files;
		self.files_checked += other.files_checked;
		self.folders_checked += other.folders_checked;
		self.valid_files += other.valid_files;
		self.missing_files += other.missing_files;
		self.format_errors += other.format_errors;
	}
}

/// The result of validating one meta document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
	pub stats: ValidationStats,
	pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
	pub fn is_valid(&self) -> bool {
		self.issues.is_empty()
	}

	fn format_error(&mut self, location: impl Into<String>, reason: impl Into<String>) {
		self.stats.format_errors += 1;
		self.issues.push(ValidationIssue::Format {
			location: location.into(),
			reason: reason.into(),
		});
	}
}

/// Validate a parsed meta document against the files under `base`.
///
/// Both shapes are accepted: hierarchical entries reference files through
/// `path` and flat entries through `file`. When `top_key` is `None` the
/// document must have exactly one key.
pub fn validate_meta_value(
	value: &Value,
	base: &Path,
	top_key: Option<&str>,
) -> ValidationOutcome {
	let mut outcome = ValidationOutcome {
		stats: ValidationStats {
			meta_files: 1,
			..ValidationStats::default()
		},
		issues: Vec::new(),
	};

	let Value::Object(object) = value else {
		outcome.format_error("top level", "expected an object");
		return outcome;
	};

	let (key, entries) = match top_key {
		Some(key) => {
			let Some(entries) = object.get(key) else {
				outcome.format_error("top level", format!("missing top-level key `{key}`"));
				return outcome;
			};
			(key, entries)
		}
		None => {
			let mut keys = object.iter();
			match (keys.next(), keys.next()) {
				(Some((key, entries)), None) => (key.as_str(), entries),
				_ => {
					outcome.format_error(
						"top level",
						format!("expected exactly one top-level key, found {}", object.len()),
					);
					return outcome;
				}
			}
		}
	};

	let Value::Array(entries) = entries else {
		outcome.format_error(key, "expected an array of entries");
		return outcome;
	};

	for (index, entry) in entries.iter().enumerate() {
		let location = format!("{key}[{index}]");
		match entry {
			Value::Object(entry) => validate_entry(entry, base, &location, &mut outcome),
			_ => outcome.format_error(location, "expected an object"),
		}
	}

	outcome
}

fn validate_entry(
	entry: &Map<String, Value>,
	base: &Path,
	location: &str,
	outcome: &mut ValidationOutcome,
) {
	let title = entry
		.get("title")
		.and_then(Value::as_str)
		.unwrap_or("unknown")
		.to_string();

	if let Some(Value::Array(children)) = entry.get("children") {
		outcome.stats.folders_checked += 1;
		for (index, child) in children.iter().enumerate() {
			let child_location = format!("{location}.children[{index}]");
			match child {
				Value::Object(child) => validate_entry(child, base, &child_location, outcome),
				_ => {
					outcome.format_error(
						child_location,
						format!("child of `{title}` is not an object"),
					);
				}
			}
		}
		return;
	}

	let reference = entry
		.get("path")
		.or_else(|| entry.get("file"))
		.and_then(Value::as_str);

	let Some(reference) = reference else {
		outcome.format_error(
			location,
			format!("entry `{title}` has neither `children` nor `path`"),
		);
		return;
	};

	outcome.stats.files_checked += 1;
	if base.join(reference).is_file() {
		outcome.stats.valid_files += 1;
	} else {
		outcome.stats.missing_files += 1;
		outcome.issues.push(ValidationIssue::MissingFile {
			location: location.to_string(),
			path: reference.to_string(),
			title,
		});
	}
}

/// Read and validate one meta file. Paths resolve against `base`, or the
/// meta file's own directory when `base` is `None`.
pub fn validate_meta_file(
	meta_path: &Path,
	base: Option<&Path>,
	top_key: Option<&str>,
) -> MdxResult<ValidationOutcome> {
	if !meta_path.is_file() {
		return Err(MdxError::MetaNotFound(meta_path.display().to_string()));
	}

	let raw = std::fs::read_to_string(meta_path).map_err(|e| MdxError::read(meta_path, e))?;
	let value: Value = serde_json::from_str(&raw).map_err(|e| {
		MdxError::MetaJson {
			path: meta_path.display().to_string(),
			reason: e.to_string(),
		}
	})?;

	let base = base
		.map(Path::to_path_buf)
		.or_else(|| meta_path.parent().map(Path::to_path_buf))
		.unwrap_or_default();

	Ok(validate_meta_value(&value, &base, top_key))
}

/// Every meta file named `meta_file` under `root`, parents before children.
pub fn find_meta_files(
	root: &Path,
	filter: &WalkFilter,
	meta_file: &str,
) -> MdxResult<Vec<PathBuf>> {
	Ok(filter
		.directories(root)?
		.into_iter()
		.map(|dir| dir.join(meta_file))
		.filter(|path| path.is_file())
		.collect())
}

/// Validate the configured meta file, or every meta file under `root`.
pub fn validate_meta(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	let target = options.meta.clone().unwrap_or_else(|| root.to_path_buf());
	let top_key = options.top_key.as_deref();
	let mut report = StepReport::new(STEP, options.dry_run);
	let mut stats = ValidationStats::default();

	if target.is_dir() {
		// Flat meta files list names relative to their own directory, so
		// `base_dir` only applies to the hierarchical file.
		let filter = options.walk_filter(&target)?;
		let mut meta_files = find_meta_files(&target, &filter, &options.meta_file_name())?
			.into_iter()
			.map(|path| (path, None))
			.collect::<Vec<_>>();
		let tree_meta = target.join(options.root_meta_file_name());
		if tree_meta.is_file() {
			meta_files.insert(0, (tree_meta, options.base_dir.as_deref()));
		}

		if meta_files.is_empty() {
			report.fail(format!(
				"no {} or {} files found under {}",
				options.meta_file_name(),
				options.root_meta_file_name(),
				target.display()
			));
		}

		let total = meta_files.len();
		for (position, (meta_path, base)) in meta_files.iter().enumerate() {
			ctx.check_cancelled(STEP)?;
			ctx.progress(STEP, position, total);

			match validate_meta_file(meta_path, *base, top_key) {
				Ok(outcome) => record_outcome(&mut report, &mut stats, meta_path, &outcome, ctx),
				Err(e) => {
					stats.meta_files += 1;
					stats.format_errors += 1;
					ctx.error(STEP, e.to_string());
					report.fail(e.to_string());
				}
			}
		}
		ctx.progress(STEP, total, total);
	} else {
		let outcome = validate_meta_file(&target, options.base_dir.as_deref(), top_key)?;
		record_outcome(&mut report, &mut stats, &target, &outcome, ctx);
	}

	report.stats = StepStats::Validate(stats);
	Ok(report)
}

fn record_outcome(
	report: &mut StepReport,
	stats: &mut ValidationStats,
	meta_path: &Path,
	outcome: &ValidationOutcome,
	ctx: &StepContext,
) {
	stats.absorb(&outcome.stats);

	if outcome.is_valid() {
		ctx.info(
			STEP,
			format!(
				"{}: {} files valid",
				meta_path.display(),
				outcome.stats.valid_files
			),
		);
		return;
	}

	for issue in &outcome.issues {
		let message = format!("{}: {issue}", meta_path.display());
		ctx.error(STEP, message.clone());
		report.fail(message);
	}
}
