use std::path::Path;

use crate::CategoryEntry;
use crate::DocumentEntry;
use crate::Frontmatter;
use crate::MdxError;
use crate::MdxResult;
use crate::MetaEntry;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::TreeMeta;
use crate::TreeTotals;
use crate::extract_frontmatter;
use crate::files::WalkFilter;
use crate::files::ensure_directory;
use crate::files::write_atomic;
use crate::format_title;
use crate::naming::is_markdown_file;
use crate::naming::relative_slash_path;

const STEP: StepKind = StepKind::GenerateRootMeta;

/// Counters collected while walking the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
	pub dirs_scanned: usize,
	pub files_found: usize,
	pub files_processed: usize,
	pub invalid_frontmatter: usize,
	pub errors: usize,
}

/// Summary of the root meta step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootMetaStats {
	pub walk: TreeStats,
	pub totals: TreeTotals,
	pub categories: usize,
	pub written: bool,
	pub unchanged: bool,
}

/// Settings for [`build_meta_tree`].
#[derive(Debug, Clone)]
pub struct TreeOptions {
	pub skip_empty: bool,
	pub filter: WalkFilter,
	/// File names at the root that are never listed, such as the generated
	/// index page.
	pub skip_root_files: Vec<String>,
}

impl Default for TreeOptions {
	fn default() -> Self {
		Self {
			skip_empty: true,
			filter: WalkFilter::default(),
			skip_root_files: Vec::new(),
		}
	}
}

/// The hierarchical entries of a tree together with the walk counters.
#[derive(Debug, Clone, Default)]
pub struct MetaTree {
	pub entries: Vec<MetaEntry>,
	pub stats: TreeStats,
}

/// Walk `root` and build the nested category and document entries.
///
/// Unreadable documents are reported and counted, never fatal. Only a root
/// that cannot be listed fails the build.
pub fn build_meta_tree(
	root: &Path,
	options: &TreeOptions,
	ctx: &StepContext,
) -> MdxResult<MetaTree> {
	ensure_directory(root)?;

	let mut stats = TreeStats::default();
	let entries = build_level(root, root, options, ctx, &mut stats)?;

	Ok(MetaTree { entries, stats })
}

fn build_level(
	root: &Path,
	dir: &Path,
	options: &TreeOptions,
	ctx: &StepContext,
	stats: &mut TreeStats,
) -> MdxResult<Vec<MetaEntry>> {
	ctx.check_cancelled(STEP)?;
	stats.dirs_scanned += 1;

	let listing = match options.filter.list(dir) {
		Ok(listing) => listing,
		Err(e) if dir != root => {
			stats.errors += 1;
			ctx.error(STEP, e.to_string());
			return Ok(Vec::new());
		}
		Err(e) => return Err(e),
	};

	// Directories and files interleave in name order, like a sorted listing.
	let mut paths = listing
		.dirs
		.into_iter()
		.map(|path| (path, true))
		.chain(listing.files.into_iter().map(|path| (path, false)))
		.collect::<Vec<_>>();
	paths.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

	let mut entries = Vec::new();
	for (path, is_dir) in paths {
		let name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();

		if is_dir {
			let children = build_level(root, &path, options, ctx, stats)?;
			if children.is_empty() && options.skip_empty {
				ctx.debug(STEP, format!("skipping empty directory {}", path.display()));
				continue;
			}

			entries.push(MetaEntry::Category(CategoryEntry {
				title: format_title(&name),
				folder: relative_slash_path(&path, root),
				children,
			}));
			continue;
		}

		if !is_markdown_file(&path) || (dir == root && options.skip_root_files.contains(&name)) {
			continue;
		}

		stats.files_found += 1;
		let content = match std::fs::read_to_string(&path) {
			Ok(content) => content,
			Err(e) => {
				stats.errors += 1;
				ctx.error(STEP, MdxError::read(&path, e).to_string());
				continue;
			}
		};

		let frontmatter = extract_frontmatter(&content);
		if let Frontmatter::Invalid(reason) = &frontmatter {
			stats.invalid_frontmatter += 1;
			ctx.warn(
				STEP,
				format!(
					"invalid frontmatter in {}: {reason}",
					relative_slash_path(&path, root)
				),
			);
		}

		entries.push(MetaEntry::Document(DocumentEntry {
			title: frontmatter.title().unwrap_or_else(|| format_title(&name)),
			path: relative_slash_path(&path, root),
			name,
		}));
		stats.files_processed += 1;
	}

	Ok(entries)
}

/// Build the tree under `root` and write it as the hierarchical meta file.
pub fn generate_root_meta(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	let tree_options = TreeOptions {
		skip_empty: options.config.skip_empty,
		filter: options.walk_filter(root)?,
		skip_root_files: vec![options.index_file_name()],
	};
	let tree = build_meta_tree(root, &tree_options, ctx)?;
	let totals = TreeTotals::of(&tree.entries);
	let categories = tree
		.entries
		.iter()
		.filter(|entry| matches!(entry, MetaEntry::Category(_)))
		.count();

	if categories == 0 {
		ctx.warn(STEP, format!("no content directories found in {}", root.display()));
	}

	let output = options.root_meta_path(root);
	let document = TreeMeta::new(options.label(), tree.entries);
	let json = document.to_pretty_json()?;
	let unchanged = std::fs::read_to_string(&output).is_ok_and(|existing| existing == json);

	let mut report = StepReport::new(STEP, options.dry_run);
	if unchanged {
		ctx.info(STEP, format!("{} is already up to date", output.display()));
	} else {
		report.record_change(&output);
		if !options.dry_run {
			if let Some(parent) = output.parent() {
				std::fs::create_dir_all(parent).map_err(|e| MdxError::write(parent, e))?;
			}
			write_atomic(&output, &json)?;
			ctx.info(STEP, format!("generated {}", output.display()));
		}
	}

	report.stats = StepStats::RootMeta(RootMetaStats {
		walk: tree.stats,
		totals,
		categories,
		written: !unchanged && !options.dry_run,
		unchanged,
	});

	Ok(report)
}
