use std::path::Path;

use serde_json::Value;

use crate::FlatEntry;
use crate::FlatMeta;
use crate::MdxResult;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::files::ensure_directory;
use crate::files::write_atomic;
use crate::naming::flat_meta_key;
use crate::naming::is_markdown_file;
use crate::parse_flat_name;

const STEP: StepKind = StepKind::GenerateFlatMeta;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlatMetaStats {
	pub dirs_scanned: usize,
	pub dirs_with_documents: usize,
	pub documents_processed: usize,
	pub to_update: usize,
	pub created: usize,
	pub updated: usize,
	pub unchanged: usize,
	pub errors: usize,
}

/// Build the flat entries for the documents directly inside a directory.
///
/// Entries are sorted by `order`, entries without one last, ties broken by
/// file name.
pub fn flat_entries<'a>(file_names: impl IntoIterator<Item = &'a str>) -> Vec<FlatEntry> {
	let mut entries = file_names
		.into_iter()
		.map(|file| {
			let (order, title) = parse_flat_name(file);
			FlatEntry {
				file: file.to_string(),
				title,
				order,
			}
		})
		.collect::<Vec<_>>();

	entries.sort_by(|a, b| a.file.cmp(&b.file));
	entries.sort_by_key(|entry| entry.order.map_or((1, 0), |order| (0, order)));
	entries
}

/// Write one flat `_meta.json` into every directory under `root` that holds
/// markdown documents.
pub fn generate_flat_meta(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	ensure_directory(root)?;

	let filter = options.walk_filter(root)?;
	let index_file = options.index_file_name();
	let directories = filter.directories(root)?;
	let total = directories.len();
	let mut stats = FlatMetaStats::default();
	let mut report = StepReport::new(STEP, options.dry_run);

	for (position, dir) in directories.iter().enumerate() {
		ctx.check_cancelled(STEP)?;
		ctx.progress(STEP, position, total);
		stats.dirs_scanned += 1;

		let listing = match filter.list(dir) {
			Ok(listing) => listing,
			Err(e) => {
				stats.errors += 1;
				ctx.error(STEP, e.to_string());
				continue;
			}
		};

		let names = listing
			.files
			.iter()
			.filter(|path| is_markdown_file(path))
			.filter_map(|path| path.file_name().and_then(|name| name.to_str()))
			.filter(|name| !(dir == root && *name == index_file))
			.collect::<Vec<_>>();

		if names.is_empty() {
			continue;
		}

		stats.dirs_with_documents += 1;
		stats.documents_processed += names.len();

		let document = FlatMeta::new(flat_meta_key(dir, root), flat_entries(names));
		let meta_path = dir.join(options.meta_file_name());
		let exists = meta_path.is_file();

		if exists && existing_matches(&meta_path, &document.to_value()?, ctx) {
			stats.unchanged += 1;
			ctx.debug(STEP, format!("{} is already up to date", meta_path.display()));
			continue;
		}

		stats.to_update += 1;
		report.record_change(&meta_path);
		if options.dry_run {
			continue;
		}

		let json = document.to_pretty_json()?;
		match write_atomic(&meta_path, &json) {
			Ok(()) if exists => {
				stats.updated += 1;
				ctx.info(STEP, format!("updated {}", meta_path.display()));
			}
			Ok(()) => {
				stats.created += 1;
				ctx.info(STEP, format!("created {}", meta_path.display()));
			}
			Err(e) => {
				stats.errors += 1;
				ctx.error(STEP, e.to_string());
			}
		}
	}

	ctx.progress(STEP, total, total);
	report.stats = StepStats::FlatMeta(stats);
	Ok(report)
}

/// Whether the existing meta file parses to exactly `expected`.
fn existing_matches(path: &Path, expected: &Value, ctx: &StepContext) -> bool {
	let existing = std::fs::read_to_string(path)
		.map_err(|e| e.to_string())
		.and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()));

	match existing {
		Ok(existing) => &existing == expected,
		Err(reason) => {
			ctx.warn(
				STEP,
				format!("could not read existing {}: {reason}", path.display()),
			);
			false
		}
	}
}
