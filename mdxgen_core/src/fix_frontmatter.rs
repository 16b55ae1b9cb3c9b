use std::path::Path;

use crate::MdxError;
use crate::MdxResult;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::files::ensure_directory;
use crate::files::write_atomic;
use crate::locate_frontmatter;
use crate::naming::is_markdown_file;
use crate::parse_frontmatter_body;
use crate::repair_quoted_fields;

const STEP: StepKind = StepKind::FixFrontmatter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixFrontmatterStats {
	pub total_files: usize,
	pub no_frontmatter: usize,
	pub valid: usize,
	pub needing_fix: usize,
	pub fixed: usize,
	pub other_errors: usize,
}

/// What a single document needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterRepair {
	NoFrontmatter,
	Valid,
	/// The repaired document content.
	Fixable(String),
	/// The frontmatter is broken in a way quote doubling does not fix.
	Unfixable(String),
}

/// Decide whether `content` has broken frontmatter that doubling single
/// quotes in `title` / `description` values repairs.
pub fn repair_frontmatter(content: &str) -> FrontmatterRepair {
	let Some(block) = locate_frontmatter(content) else {
		return FrontmatterRepair::NoFrontmatter;
	};

	let body = block.body(content);
	let Err(reason) = parse_frontmatter_body(body) else {
		return FrontmatterRepair::Valid;
	};

	let Some(repaired) = repair_quoted_fields(body) else {
		return FrontmatterRepair::Unfixable(reason);
	};

	if let Err(still_broken) = parse_frontmatter_body(&repaired) {
		return FrontmatterRepair::Unfixable(still_broken);
	}

	FrontmatterRepair::Fixable(format!(
		"{}{repaired}{}",
		&content[..block.body_start],
		&content[block.body_end..]
	))
}

/// Repair single-quote escaping in the frontmatter of every document.
pub fn fix_frontmatter(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	ensure_directory(root)?;

	let filter = options.walk_filter(root)?;
	let documents = filter
		.files(root)?
		.into_iter()
		.filter(|path| is_markdown_file(path))
		.collect::<Vec<_>>();
	let total = documents.len();
	let mut stats = FixFrontmatterStats {
		total_files: total,
		..FixFrontmatterStats::default()
	};
	let mut report = StepReport::new(STEP, options.dry_run);

	for (position, path) in documents.iter().enumerate() {
		ctx.check_cancelled(STEP)?;
		ctx.progress(STEP, position, total);

		let content = match std::fs::read_to_string(path) {
			Ok(content) => content,
			Err(e) => {
				stats.other_errors += 1;
				ctx.error(STEP, MdxError::read(path, e).to_string());
				continue;
			}
		};

		match repair_frontmatter(&content) {
			FrontmatterRepair::NoFrontmatter => stats.no_frontmatter += 1,
			FrontmatterRepair::Valid => stats.valid += 1,
			FrontmatterRepair::Unfixable(reason) => {
				stats.other_errors += 1;
				ctx.warn(
					STEP,
					format!("cannot fix frontmatter in {}: {reason}", path.display()),
				);
			}
			FrontmatterRepair::Fixable(repaired) => {
				stats.needing_fix += 1;
				report.record_content_change(path, &content, &repaired, options.capture_content);
				if options.dry_run {
					continue;
				}

				match write_atomic(path, &repaired) {
					Ok(()) => {
						stats.fixed += 1;
						ctx.info(STEP, format!("fixed frontmatter in {}", path.display()));
					}
					Err(e) => {
						stats.other_errors += 1;
						ctx.error(STEP, e.to_string());
					}
				}
			}
		}
	}

	ctx.progress(STEP, total, total);
	report.stats = StepStats::FixFrontmatter(stats);
	Ok(report)
}
