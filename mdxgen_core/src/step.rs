use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::FixFrontmatterStats;
use crate::FlatMetaStats;
use crate::IndexStats;
use crate::MdxConfig;
use crate::MdxError;
use crate::MdxResult;
use crate::NavStats;
use crate::NormalizeStats;
use crate::RootMetaStats;
use crate::StepContext;
use crate::StepEvent;
use crate::ValidationStats;
use crate::config::DEFAULT_INDEX_FILE;
use crate::files::WalkFilter;

/// Every step the tool can run, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
	NormalizeFilenames,
	FixFrontmatter,
	GenerateFlatMeta,
	GenerateRootMeta,
	GenerateIndex,
	InjectNavLinks,
	ValidateMeta,
}

/// The signature shared by all steps.
pub type StepFn = fn(&Path, &StepOptions, &StepContext) -> MdxResult<StepReport>;

/// Static description of a step and the function that runs it.
#[derive(Debug, Clone, Copy)]
pub struct StepDescriptor {
	pub kind: StepKind,
	/// Stable identifier, also the CLI subcommand.
	pub name: &'static str,
	pub title: &'static str,
	pub description: &'static str,
	/// Whether the step writes to the tree.
	pub mutates: bool,
	pub run: StepFn,
}

/// The step registry, in the order the pipeline runs it.
pub static STEPS: [StepDescriptor; 7] = [
	StepDescriptor {
		kind: StepKind::NormalizeFilenames,
		name: "normalize",
		title: "Normalize filenames",
		description: "Rename files to URL friendly names without changing their case.",
		mutates: true,
		run: crate::normalize::normalize_filenames,
	},
	StepDescriptor {
		kind: StepKind::FixFrontmatter,
		name: "fix-frontmatter",
		title: "Fix frontmatter",
		description: "Escape single quotes inside quoted title and description values.",
		mutates: true,
		run: crate::fix_frontmatter::fix_frontmatter,
	},
	StepDescriptor {
		kind: StepKind::GenerateFlatMeta,
		name: "meta",
		title: "Generate per-directory meta",
		description: "Write an ordered _meta.json into every directory with documents.",
		mutates: true,
		run: crate::flat::generate_flat_meta,
	},
	StepDescriptor {
		kind: StepKind::GenerateRootMeta,
		name: "root-meta",
		title: "Generate root meta",
		description: "Write the hierarchical _meta.tree.json describing the whole tree.",
		mutates: true,
		run: crate::tree::generate_root_meta,
	},
	StepDescriptor {
		kind: StepKind::GenerateIndex,
		name: "index",
		title: "Generate index",
		description: "Render index.mdx from the hierarchical _meta.tree.json.",
		mutates: true,
		run: crate::index::generate_index,
	},
	StepDescriptor {
		kind: StepKind::InjectNavLinks,
		name: "nav",
		title: "Inject navigation links",
		description: "Append circular previous/next links to every listed document.",
		mutates: true,
		run: crate::nav::inject_nav_links,
	},
	StepDescriptor {
		kind: StepKind::ValidateMeta,
		name: "validate",
		title: "Validate meta",
		description: "Check that every file referenced by a meta file exists.",
		mutates: false,
		run: crate::validate::validate_meta,
	},
];

impl StepKind {
	pub fn descriptor(self) -> &'static StepDescriptor {
		&STEPS[self as usize]
	}

	pub fn name(self) -> &'static str {
		self.descriptor().name
	}

	pub fn title(self) -> &'static str {
		self.descriptor().title
	}

	pub fn from_name(name: &str) -> Option<Self> {
		STEPS.iter().find(|step| step.name == name).map(|step| step.kind)
	}
}

impl fmt::Display for StepKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Options shared by all steps. Unset overrides fall back to the config.
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
	/// Report what would change without writing anything.
	pub dry_run: bool,
	/// Keep the before/after content of changed documents in the report.
	pub capture_content: bool,
	pub config: MdxConfig,
	/// Top-level key of the hierarchical meta document.
	pub label: Option<String>,
	/// Output file of the root meta or index step.
	pub output: Option<PathBuf>,
	/// Input meta file of the index step, or the validation target.
	pub meta: Option<PathBuf>,
	/// Directory that validated paths resolve against.
	pub base_dir: Option<PathBuf>,
	/// Top-level key the validator requires.
	pub top_key: Option<String>,
}

impl StepOptions {
	pub fn new(config: MdxConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	pub fn label(&self) -> String {
		self.label
			.clone()
			.unwrap_or_else(|| self.config.label.clone())
	}

	pub fn meta_file_name(&self) -> String {
		self.config.meta_file.clone()
	}

	pub fn root_meta_file_name(&self) -> String {
		self.config.root_meta_file.clone()
	}

	pub fn index_file_name(&self) -> String {
		self.config
			.index
			.file
			.clone()
			.unwrap_or_else(|| DEFAULT_INDEX_FILE.to_string())
	}

	pub fn walk_filter(&self, root: &Path) -> MdxResult<WalkFilter> {
		Ok(WalkFilter::new(self.config.exclude_matcher(root)?))
	}

	/// Where the root meta step writes.
	pub fn root_meta_path(&self, root: &Path) -> PathBuf {
		self.output
			.clone()
			.unwrap_or_else(|| root.join(self.root_meta_file_name()))
	}

	/// The hierarchical meta file the index step reads.
	pub fn index_meta_path(&self, root: &Path) -> PathBuf {
		self.meta
			.clone()
			.unwrap_or_else(|| root.join(self.root_meta_file_name()))
	}

	/// Where the index step writes: next to its meta file unless overridden.
	pub fn index_output_path(&self, meta_path: &Path) -> PathBuf {
		self.output.clone().unwrap_or_else(|| {
			meta_path
				.parent()
				.unwrap_or_else(|| Path::new(""))
				.join(self.index_file_name())
		})
	}

	/// The same options with the per-step overrides cleared, as used when
	/// running every step in sequence.
	#[must_use]
	pub fn for_pipeline(&self) -> Self {
		Self {
			dry_run: self.dry_run,
			capture_content: self.capture_content,
			config: self.config.clone(),
			label: self.label.clone(),
			..Self::default()
		}
	}
}

/// Step specific counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStats {
	Normalize(NormalizeStats),
	FixFrontmatter(FixFrontmatterStats),
	FlatMeta(FlatMetaStats),
	RootMeta(RootMetaStats),
	Index(IndexStats),
	Nav(NavStats),
	Validate(ValidationStats),
}

impl StepStats {
	/// Zeroed counters for `step`.
	pub fn empty(step: StepKind) -> Self {
		match step {
			StepKind::NormalizeFilenames => Self::Normalize(NormalizeStats::default()),
			StepKind::FixFrontmatter => Self::FixFrontmatter(FixFrontmatterStats::default()),
			StepKind::GenerateFlatMeta => Self::FlatMeta(FlatMetaStats::default()),
			StepKind::GenerateRootMeta => Self::RootMeta(RootMetaStats::default()),
			StepKind::GenerateIndex => Self::Index(IndexStats::default()),
			StepKind::InjectNavLinks => Self::Nav(NavStats::default()),
			StepKind::ValidateMeta => Self::Validate(ValidationStats::default()),
		}
	}

	/// Labelled counters in display order.
	pub fn fields(&self) -> Vec<(&'static str, usize)> {
		match self {
			Self::Normalize(s) => {
				vec![
					("Files found", s.total_files),
					("Already normalized", s.already_normalized),
					("To rename", s.to_rename),
					("Renamed", s.renamed),
					("Skipped", s.skipped),
					("Errors", s.errors),
				]
			}
			Self::FixFrontmatter(s) => {
				vec![
					("Files found", s.total_files),
					("Without frontmatter", s.no_frontmatter),
					("Valid frontmatter", s.valid),
					("Needing a fix", s.needing_fix),
					("Fixed", s.fixed),
					("Other errors", s.other_errors),
				]
			}
			Self::FlatMeta(s) => {
				vec![
					("Directories scanned", s.dirs_scanned),
					("Directories with documents", s.dirs_with_documents),
					("Documents processed", s.documents_processed),
					("Meta files to update", s.to_update),
					("Created", s.created),
					("Updated", s.updated),
					("Unchanged", s.unchanged),
					("Errors", s.errors),
				]
			}
			Self::RootMeta(s) => {
				vec![
					("Directories scanned", s.walk.dirs_scanned),
					("Documents found", s.walk.files_found),
					("Documents processed", s.walk.files_processed),
					("Invalid frontmatter", s.walk.invalid_frontmatter),
					("Top-level categories", s.categories),
					("Files included", s.totals.files),
					("Directories included", s.totals.folders),
					("Errors", s.walk.errors),
				]
			}
			Self::Index(s) => vec![("Sections", s.sections)],
			Self::Nav(s) => {
				vec![
					("Directories scanned", s.dirs_scanned),
					("Meta files", s.meta_files),
					("Files listed", s.total_files_found),
					("Files to update", s.files_to_update),
					("Files updated", s.files_updated),
					("Unchanged", s.unchanged),
					("Skipped", s.skipped),
					("Errors", s.errors),
				]
			}
			Self::Validate(s) => {
				vec![
					("Meta files", s.meta_files),
					("Files checked", s.files_checked),
					("Folders checked", s.folders_checked),
					("Valid files", s.valid_files),
					("Missing files", s.missing_files),
					("Format errors", s.format_errors),
				]
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
	Create,
	Update,
	Rename { to: PathBuf },
}

/// A file a step changed, or would change in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
	pub path: PathBuf,
	pub kind: ChangeKind,
	/// Content before and after, when requested through
	/// [`StepOptions::capture_content`].
	pub content: Option<(String, String)>,
}

/// The outcome of one step run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
	pub step: StepKind,
	pub dry_run: bool,
	pub stats: StepStats,
	pub changes: Vec<FileChange>,
	/// Input and structural problems. Any issue makes the step unsuccessful.
	pub issues: Vec<String>,
	pub success: bool,
}

impl StepReport {
	pub fn new(step: StepKind, dry_run: bool) -> Self {
		Self {
			step,
			dry_run,
			stats: StepStats::empty(step),
			changes: Vec::new(),
			issues: Vec::new(),
			success: true,
		}
	}

	/// Record a failure that does not stop the step.
	pub fn fail(&mut self, issue: impl Into<String>) {
		self.issues.push(issue.into());
		self.success = false;
	}

	/// Record a write to `path`. Call before writing so creation is detected.
	pub fn record_change(&mut self, path: &Path) {
		let kind = if path.exists() {
			ChangeKind::Update
		} else {
			ChangeKind::Create
		};
		self.changes.push(FileChange {
			path: path.to_path_buf(),
			kind,
			content: None,
		});
	}

	pub fn record_content_change(&mut self, path: &Path, before: &str, after: &str, capture: bool) {
		self.changes.push(FileChange {
			path: path.to_path_buf(),
			kind: ChangeKind::Update,
			content: capture.then(|| (before.to_string(), after.to_string())),
		});
	}

	pub fn record_rename(&mut self, from: &Path, to: &Path) {
		self.changes.push(FileChange {
			path: from.to_path_buf(),
			kind: ChangeKind::Rename { to: to.to_path_buf() },
			content: None,
		});
	}
}

/// Run a single step through the registry.
pub fn run_step(
	kind: StepKind,
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	ctx.emit(StepEvent::StepStarted { step: kind });
	let result = (kind.descriptor().run)(root, options, ctx);
	ctx.emit(StepEvent::StepFinished {
		step: kind,
		success: result.as_ref().is_ok_and(|report| report.success),
	});
	result
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelinePolicy {
	/// Keep going after a failed step.
	pub continue_on_error: bool,
}

/// One entry of a pipeline run.
#[derive(Debug)]
pub struct StepOutcome {
	pub step: StepKind,
	pub result: MdxResult<StepReport>,
}

impl StepOutcome {
	pub fn succeeded(&self) -> bool {
		self.result.as_ref().is_ok_and(|report| report.success)
	}
}

#[derive(Debug, Default)]
pub struct PipelineReport {
	pub outcomes: Vec<StepOutcome>,
}

impl PipelineReport {
	pub fn success(&self) -> bool {
		self.outcomes.len() == STEPS.len() && self.outcomes.iter().all(StepOutcome::succeeded)
	}
}

/// Run every registered step in order.
///
/// The pipeline stops at the first failed step unless
/// `policy.continue_on_error` is set, and always stops once cancelled.
pub fn run_pipeline(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
	policy: PipelinePolicy,
) -> PipelineReport {
	let options = options.for_pipeline();
	let mut report = PipelineReport::default();

	for descriptor in &STEPS {
		let result = run_step(descriptor.kind, root, &options, ctx);
		let cancelled = matches!(result, Err(MdxError::Cancelled(_)));
		let outcome = StepOutcome {
			step: descriptor.kind,
			result,
		};
		let succeeded = outcome.succeeded();
		report.outcomes.push(outcome);

		if cancelled || (!succeeded && !policy.continue_on_error) {
			break;
		}
	}

	report
}
