use std::path::Path;
use std::path::PathBuf;

use crate::MdxResult;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::files::ensure_directory;
use crate::normalize_filename;

const STEP: StepKind = StepKind::NormalizeFilenames;

/// Renames happen in batches; cancellation is checked between batches.
pub const RENAME_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
	pub total_files: usize,
	pub already_normalized: usize,
	pub to_rename: usize,
	pub renamed: usize,
	pub skipped: usize,
	pub errors: usize,
}

/// A planned rename inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
	pub from: PathBuf,
	pub to: PathBuf,
}

fn is_protected_name(name: &str) -> bool {
	name.starts_with('.') || name.starts_with('_')
}

/// Plan the renames for every file under `root`.
///
/// Files whose name starts with `.` or `_` are left alone, as are files
/// whose normalized name is empty or already taken.
pub fn plan_renames(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
	stats: &mut NormalizeStats,
) -> MdxResult<Vec<Rename>> {
	let filter = options.walk_filter(root)?;
	let mut renames = Vec::new();

	for path in filter.files(root)? {
		let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
			continue;
		};
		if is_protected_name(name) {
			continue;
		}

		stats.total_files += 1;
		let normalized = normalize_filename(name);
		if normalized == name {
			stats.already_normalized += 1;
			continue;
		}

		let target = path.with_file_name(&normalized);
		if normalized.is_empty() || normalized.starts_with('.') {
			stats.skipped += 1;
			ctx.warn(
				STEP,
				format!("cannot normalize {}: nothing left of the name", path.display()),
			);
			continue;
		}

		if target.exists() || renames.iter().any(|rename: &Rename| rename.to == target) {
			stats.skipped += 1;
			ctx.warn(
				STEP,
				format!(
					"cannot rename {} to {normalized}: file already exists",
					path.display()
				),
			);
			continue;
		}

		stats.to_rename += 1;
		renames.push(Rename {
			from: path,
			to: target,
		});
	}

	Ok(renames)
}

/// Rename files under `root` to their URL friendly form.
pub fn normalize_filenames(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	ensure_directory(root)?;
	ctx.check_cancelled(STEP)?;

	let mut stats = NormalizeStats::default();
	let mut report = StepReport::new(STEP, options.dry_run);
	let renames = plan_renames(root, options, ctx, &mut stats)?;

	ctx.info(
		STEP,
		format!(
			"found {} files: {} need renaming, {} already normalized, {} will be skipped",
			stats.total_files, stats.to_rename, stats.already_normalized, stats.skipped
		),
	);

	for rename in &renames {
		report.record_rename(&rename.from, &rename.to);
	}

	if !options.dry_run {
		let total = renames.len();
		for (batch_index, batch) in renames.chunks(RENAME_BATCH_SIZE).enumerate() {
			ctx.check_cancelled(STEP)?;

			for rename in batch {
				apply_rename(rename, &mut stats, ctx);
			}

			ctx.progress(STEP, (batch_index * RENAME_BATCH_SIZE + batch.len()).min(total), total);
		}
	}

	report.stats = StepStats::Normalize(stats);
	Ok(report)
}

fn apply_rename(rename: &Rename, stats: &mut NormalizeStats, ctx: &StepContext) {
	// Another process may have created the target since planning.
	if rename.to.exists() {
		stats.skipped += 1;
		ctx.warn(
			STEP,
			format!("not renaming {}: target appeared", rename.from.display()),
		);
		return;
	}

	match std::fs::rename(&rename.from, &rename.to) {
		Ok(()) => {
			stats.renamed += 1;
			ctx.info(
				STEP,
				format!(
					"renamed {} to {}",
					rename.from.display(),
					rename.to.display()
				),
			);
		}
		Err(e) => {
			stats.errors += 1;
			ctx.error(
				STEP,
				format!("failed to rename {}: {e}", rename.from.display()),
			);
		}
	}
}
