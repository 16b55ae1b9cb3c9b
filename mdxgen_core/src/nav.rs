//! Circular previous/next navigation for documents listed in flat
//! `_meta.json` files.
//!
//! Every listed document gets a trailing block of the form
//!
//! ```text
//!
//! ---
//!
//! ## Previous Article
//! - [Title](previous.md)
//!
//! ---
//!
//! ## Next Article
//! - [Title](next.md)
//!
//! ---
//! ```
//!
//! Any earlier block is removed first, so repeated runs converge on the same
//! content.

use std::cmp::Ordering;
use std::path::Path;

use serde::Deserialize;

use crate::MdxError;
use crate::MdxResult;
use crate::MetaDocument;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::files::WalkFilter;
use crate::files::ensure_directory;
use crate::files::write_atomic;

const STEP: StepKind = StepKind::InjectNavLinks;

/// Substrings that start a previously injected navigation block.
pub const NAV_MARKERS: [&str; 2] = [
	"\n---\n## Previous Article",
	"\n---\n\n## Previous Article",
];

pub const PREVIOUS_FALLBACK_TITLE: &str = "Previous";
pub const NEXT_FALLBACK_TITLE: &str = "Next";

/// An entry of a flat `_meta.json` as the injector reads it. Every field is
/// optional so that incomplete entries can be skipped instead of rejecting
/// the whole file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NavEntry {
	#[serde(default)]
	pub file: Option<String>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub order: Option<f64>,
}

/// One side of a navigation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
	pub title: String,
	pub file: String,
}

impl NavLink {
	fn from_entry(entry: &NavEntry, fallback: &str) -> Option<Self> {
		let file = entry.file.as_deref().filter(|file| !file.is_empty())?;
		let title = entry
			.title
			.as_deref()
			.filter(|title| !title.is_empty())
			.unwrap_or(fallback);

		Some(Self {
			title: title.to_string(),
			file: file.to_string(),
		})
	}
}

/// The planned navigation of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPlan {
	pub file: String,
	pub previous: NavLink,
	pub next: NavLink,
}

/// Sort entries by `order`. Entries without an order keep their relative
/// position after all ordered entries.
pub fn sort_nav_entries(entries: &mut [NavEntry]) {
	entries.sort_by(|a, b| {
		match (a.order, b.order) {
			(Some(a), Some(b)) => a.total_cmp(&b),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		}
	});
}

/// Resolve the circular neighbours of every entry.
///
/// `entries` must already be sorted. Entries without a file, or whose
/// neighbours have no file, yield `None` at their position.
pub fn plan_navigation(entries: &[NavEntry]) -> Vec<Option<NavPlan>> {
	let count = entries.len();
	(0..count)
		.map(|index| {
			let current = entries[index].file.as_deref().filter(|file| !file.is_empty())?;
			let previous = &entries[(index + count - 1) % count];
			let next = &entries[(index + 1) % count];

			Some(NavPlan {
				file: current.to_string(),
				previous: NavLink::from_entry(previous, PREVIOUS_FALLBACK_TITLE)?,
				next: NavLink::from_entry(next, NEXT_FALLBACK_TITLE)?,
			})
		})
		.collect()
}

/// Render the navigation block, including the blank line that separates it
/// from the document body.
pub fn render_navigation(previous: &NavLink, next: &NavLink) -> String {
	format!(
		"\n\n---\n\n## Previous Article\n- [{}]({})\n\n---\n\n## Next Article\n- [{}]({})\n\n---\n",
		previous.title, previous.file, next.title, next.file
	)
}

/// Remove a previously injected navigation block and trailing whitespace.
pub fn strip_navigation(content: &str) -> &str {
	let cut = NAV_MARKERS
		.iter()
		.filter_map(|marker| content.find(marker))
		.min()
		.unwrap_or(content.len());

	content[..cut].trim_end()
}

/// The document content with a fresh navigation block.
pub fn inject_navigation(content: &str, previous: &NavLink, next: &NavLink) -> String {
	format!("{}{}", strip_navigation(content), render_navigation(previous, next))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavStats {
	pub dirs_scanned: usize,
	pub meta_files: usize,
	pub total_files_found: usize,
	pub files_to_update: usize,
	pub files_updated: usize,
	pub unchanged: usize,
	pub skipped: usize,
	pub errors: usize,
}

/// Inject navigation into every directory under `root`, deepest first.
pub fn inject_nav_links(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	ensure_directory(root)?;

	let filter = options.walk_filter(root)?;
	let mut run = NavRun {
		options,
		ctx,
		filter: &filter,
		stats: NavStats::default(),
		report: StepReport::new(STEP, options.dry_run),
	};

	run.visit(root)?;

	let mut report = run.report;
	report.stats = StepStats::Nav(run.stats);
	Ok(report)
}

struct NavRun<'a> {
	options: &'a StepOptions,
	ctx: &'a StepContext,
	filter: &'a WalkFilter,
	stats: NavStats,
	report: StepReport,
}

impl NavRun<'_> {
	fn visit(&mut self, dir: &Path) -> MdxResult<()> {
		self.ctx.check_cancelled(STEP)?;
		self.stats.dirs_scanned += 1;

		match self.filter.list(dir) {
			Ok(listing) => {
				for child in &listing.dirs {
					self.visit(child)?;
				}
			}
			Err(e) => {
				self.stats.errors += 1;
				self.ctx.error(STEP, e.to_string());
				self.report.fail(e.to_string());
				return Ok(());
			}
		}

		let meta_path = dir.join(self.options.meta_file_name());
		if !meta_path.is_file() {
			return Ok(());
		}

		self.stats.meta_files += 1;
		match MetaDocument::<NavEntry>::load(&meta_path) {
			Ok(meta) => self.apply(dir, meta.entries),
			Err(e) => {
				self.stats.errors += 1;
				self.ctx.error(STEP, e.to_string());
				self.report.fail(e.to_string());
				Ok(())
			}
		}
	}

	fn apply(&mut self, dir: &Path, mut entries: Vec<NavEntry>) -> MdxResult<()> {
		sort_nav_entries(&mut entries);
		self.stats.total_files_found += entries.len();

		if entries.is_empty() {
			self.ctx.info(STEP, format!("no files listed for {}", dir.display()));
			return Ok(());
		}

		for (entry, plan) in entries.iter().zip(plan_navigation(&entries)) {
			self.ctx.check_cancelled(STEP)?;

			let Some(plan) = plan else {
				self.stats.skipped += 1;
				self.ctx.warn(
					STEP,
					format!(
						"skipping entry without a usable file or neighbour in {}: {entry:?}",
						dir.display()
					),
				);
				continue;
			};

			let path = dir.join(&plan.file);
			if !path.is_file() {
				self.stats.skipped += 1;
				self.ctx.warn(STEP, format!("skipping missing file {}", path.display()));
				continue;
			}

			self.update_file(&path, &plan);
		}

		Ok(())
	}

	fn update_file(&mut self, path: &Path, plan: &NavPlan) {
		let content = match std::fs::read_to_string(path) {
			Ok(content) => content,
			Err(e) => {
				self.stats.errors += 1;
				self.ctx.error(STEP, MdxError::read(path, e).to_string());
				return;
			}
		};

		let updated = inject_navigation(&content, &plan.previous, &plan.next);
		if updated == content {
			self.stats.unchanged += 1;
			return;
		}

		self.stats.files_to_update += 1;
		self.report
			.record_content_change(path, &content, &updated, self.options.capture_content);
		if self.options.dry_run {
			self.ctx.debug(
				STEP,
				format!(
					"would add navigation to {} (previous: {}, next: {})",
					path.display(),
					plan.previous.file,
					plan.next.file
				),
			);
			return;
		}

		match write_atomic(path, &updated) {
			Ok(()) => {
				self.stats.files_updated += 1;
				self.ctx.info(STEP, format!("added navigation to {}", path.display()));
			}
			Err(e) => {
				self.stats.errors += 1;
				self.ctx.error(STEP, e.to_string());
			}
		}
	}
}
