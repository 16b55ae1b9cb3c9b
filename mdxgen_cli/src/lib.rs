use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Prepare a markdown/mdx documentation tree for a static documentation site.",
	long_about = "mdxgen walks a directory of markdown and mdx documents and generates the \
	              navigation metadata a documentation site needs.\n\nEvery step that changes \
	              files first runs as a dry run, prints what it would do and asks for \
	              confirmation.\n\nQuick start:\n  mdxgen all        Run every step in \
	              order\n  mdxgen root-meta  Generate the hierarchical _meta.tree.json\n  mdxgen nav        \
	              Inject previous/next links\n  mdxgen validate   Check that every referenced \
	              file exists"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct MdxgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the documentation root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Apply changes without asking for confirmation.
	#[arg(long, short, global = true, default_value_t = false)]
	pub yes: bool,

	/// Only report what would change.
	#[arg(long, short, global = true, default_value_t = false)]
	pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Rename files to URL friendly names.
	///
	/// Spaces become hyphens and characters outside `A-Z`, `a-z`, `0-9`, `_`
	/// and `-` are removed. The case and the extension are kept. Files whose
	/// name starts with `.` or `_` are never renamed, and a rename never
	/// overwrites an existing file.
	Normalize,
	/// Escape single quotes inside single-quoted frontmatter values.
	///
	/// Only documents whose frontmatter fails to parse are touched, and only
	/// when doubling the inner quotes of `title` and `description` makes the
	/// frontmatter valid.
	FixFrontmatter,
	/// Generate a flat `_meta.json` in every directory with documents.
	///
	/// Entries are ordered by the numeric `NN_` prefix of their file name.
	/// Files without a prefix come last.
	Meta,
	/// Generate the hierarchical `_meta.tree.json` for the whole tree.
	///
	/// The file name is configurable with `root_meta_file` and is kept apart
	/// from the root directory's own flat `_meta.json`.
	RootMeta {
		/// Write the meta document here instead of `<root>/_meta.tree.json`.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Top-level key of the meta document.
		#[arg(long, short)]
		label: Option<String>,
	},
	/// Render `index.mdx` from the hierarchical `_meta.tree.json`.
	Index {
		/// The hierarchical meta document to read.
		#[arg(long, short)]
		meta: Option<PathBuf>,

		/// Write the page here instead of next to the meta document.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Append circular previous/next links to every listed document.
	///
	/// Reads the flat `_meta.json` of every directory and rewrites the
	/// trailing navigation block of each document. Running it again leaves
	/// documents unchanged.
	Nav {
		/// Show a unified diff of every document that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Check that every file referenced by a meta file exists.
	///
	/// Validates a single meta file when TARGET is a file. When TARGET is a
	/// directory it validates its `_meta.tree.json` and every `_meta.json`
	/// below it. Exits with status 1 when any reference is missing or
	/// malformed.
	Validate {
		/// Meta file or directory to validate. Defaults to the root.
		target: Option<PathBuf>,

		/// Resolve referenced paths against this directory instead of the
		/// directory of the meta file. In directory mode it only applies to
		/// the hierarchical meta file, since flat `_meta.json` files always
		/// resolve against their own directory.
		#[arg(long)]
		base_dir: Option<PathBuf>,

		/// Require this top-level key instead of accepting any single key.
		#[arg(long)]
		top_key: Option<String>,
	},
	/// Run every step in order.
	All {
		/// Keep going after a step fails.
		#[arg(long, default_value_t = false)]
		continue_on_error: bool,
	},
	/// List the available steps.
	Steps,
}
