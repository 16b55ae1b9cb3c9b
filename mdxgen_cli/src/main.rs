use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use dialoguer::Confirm;
use mdxgen_cli::Commands;
use mdxgen_cli::MdxgenCli;
use mdxgen_core::AnyResult;
use mdxgen_core::ChangeKind;
use mdxgen_core::EventLevel;
use mdxgen_core::MdxConfig;
use mdxgen_core::PipelinePolicy;
use mdxgen_core::PipelineReport;
use mdxgen_core::STEPS;
use mdxgen_core::StepContext;
use mdxgen_core::StepEvent;
use mdxgen_core::StepKind;
use mdxgen_core::StepOptions;
use mdxgen_core::StepReport;
use mdxgen_core::ensure_directory;
use mdxgen_core::run_pipeline;
use mdxgen_core::run_step;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MdxgenCli::parse();

	// Respect NO_COLOR, --no-color and terminals without color support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Normalize) => {
			run_mutating(&args, StepKind::NormalizeFilenames, |_| {}, false)
		}
		Some(Commands::FixFrontmatter) => {
			run_mutating(&args, StepKind::FixFrontmatter, |_| {}, false)
		}
		Some(Commands::Meta) => run_mutating(&args, StepKind::GenerateFlatMeta, |_| {}, false),
		Some(Commands::RootMeta { output, label }) => {
			run_mutating(
				&args,
				StepKind::GenerateRootMeta,
				|options| {
					options.output.clone_from(output);
					options.label.clone_from(label);
				},
				false,
			)
		}
		Some(Commands::Index { meta, output }) => {
			run_mutating(
				&args,
				StepKind::GenerateIndex,
				|options| {
					options.meta.clone_from(meta);
					options.output.clone_from(output);
				},
				false,
			)
		}
		Some(Commands::Nav { diff }) => {
			run_mutating(&args, StepKind::InjectNavLinks, |_| {}, *diff)
		}
		Some(Commands::Validate {
			target,
			base_dir,
			top_key,
		}) => run_validate(&args, target.as_ref(), base_dir.as_ref(), top_key.as_ref()),
		Some(Commands::All { continue_on_error }) => run_all(&args, *continue_on_error),
		Some(Commands::Steps) => {
			run_steps();
			Ok(true)
		}
		None => {
			eprintln!("No subcommand specified. Run `mdxgen --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<mdxgen_core::MdxError>() {
				Ok(mdx_err) => {
					let report: miette::Report = (*mdx_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "info" } else { "warn" };
	let filter =
		EnvFilter::try_from_env("MDXGEN_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &MdxgenCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_options(root: &Path) -> AnyResult<StepOptions> {
	ensure_directory(root)?;
	if let Some(path) = MdxConfig::resolve_path(root) {
		tracing::info!(path = %path.display(), "using config file");
	}

	Ok(StepOptions::new(MdxConfig::load_or_default(root)?))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<28} {value}");
}

/// Run `step` with the event channel attached and print events as they
/// arrive.
fn with_events<T>(verbose: bool, warnings: bool, step: impl FnOnce(&StepContext) -> T) -> T {
	let (sender, receiver) = mpsc::channel();
	let printer = thread::spawn(move || {
		for event in receiver {
			print_event(&event, verbose, warnings);
		}
	});

	let ctx = StepContext::new().with_events(sender);
	let result = step(&ctx);
	drop(ctx);

	if printer.join().is_err() {
		tracing::error!("event printer stopped unexpectedly");
	}

	result
}

fn print_event(event: &StepEvent, verbose: bool, warnings: bool) {
	match event {
		StepEvent::StepStarted { step } if verbose => {
			eprintln!("{} {}", colored!("==>", bold), step.title());
		}
		StepEvent::Progress { step, done, total } => {
			tracing::trace!(step = step.name(), done, total, "progress");
		}
		StepEvent::Message { level, text, .. } => {
			match level {
				EventLevel::Error => eprintln!("{} {text}", colored!("error:", red)),
				EventLevel::Warn if warnings => {
					eprintln!("{} {text}", colored!("warning:", yellow));
				}
				EventLevel::Info if verbose => eprintln!("  {text}"),
				EventLevel::Debug => tracing::debug!("{text}"),
				_ => {}
			}
		}
		_ => {}
	}
}

fn confirm(args: &MdxgenCli, prompt: &str) -> AnyResult<bool> {
	if args.yes {
		return Ok(true);
	}

	if !std::io::stdin().is_terminal() {
		return Err("refusing to change files without confirmation in a non-interactive session, \
		            pass `--yes` to apply the changes"
			.into());
	}

	Ok(Confirm::new()
		.with_prompt(prompt)
		.default(false)
		.interact()?)
}

/// Preview a step, ask for confirmation and apply it.
fn run_mutating(
	args: &MdxgenCli,
	kind: StepKind,
	configure: impl FnOnce(&mut StepOptions),
	diff: bool,
) -> AnyResult<bool> {
	let root = resolve_root(args);
	let mut options = load_options(&root)?;
	configure(&mut options);
	options.dry_run = true;
	options.capture_content = diff;

	let preview = with_events(args.verbose, true, |ctx| run_step(kind, &root, &options, ctx))?;
	print_report(&preview, &root, diff);

	if preview.changes.is_empty() {
		if preview.success {
			println!();
			println!("{} nothing to change", colored!("ok:", green));
		}
		return Ok(preview.success);
	}

	if args.dry_run {
		return Ok(preview.success);
	}

	let prompt = format!("Apply {} change(s)?", preview.changes.len());
	if !confirm(args, &prompt)? {
		return Err("aborted, no files were changed".into());
	}

	options.dry_run = false;
	options.capture_content = false;
	let report = with_events(args.verbose, false, |ctx| run_step(kind, &root, &options, ctx))?;
	print_report(&report, &root, false);

	Ok(report.success)
}

fn run_validate(
	args: &MdxgenCli,
	target: Option<&PathBuf>,
	base_dir: Option<&PathBuf>,
	top_key: Option<&String>,
) -> AnyResult<bool> {
	let root = resolve_root(args);
	let mut options = load_options(&root)?;
	options.meta = target.cloned();
	options.base_dir = base_dir.cloned();
	options.top_key = top_key.cloned();

	let report = with_events(args.verbose, true, |ctx| {
		run_step(StepKind::ValidateMeta, &root, &options, ctx)
	})?;
	print_report(&report, &root, false);

	println!();
	if report.success {
		println!("{} all referenced files exist", colored!("ok:", green));
	} else {
		println!("{} validation failed", colored!("error:", red));
	}

	Ok(report.success)
}

fn run_all(args: &MdxgenCli, continue_on_error: bool) -> AnyResult<bool> {
	let root = resolve_root(args);
	let mut options = load_options(&root)?;
	options.dry_run = true;

	// Later steps preview against the unchanged tree, so a preview failure
	// does not stop the remaining previews.
	let preview = with_events(args.verbose, true, |ctx| {
		run_pipeline(
			&root,
			&options,
			ctx,
			PipelinePolicy {
				continue_on_error: true,
			},
		)
	});
	let pending = print_pipeline(&preview, &root);

	if args.dry_run {
		return Ok(true);
	}

	if pending == 0 && preview.success() {
		println!();
		println!("{} nothing to change", colored!("ok:", green));
		return Ok(true);
	}

	let prompt = format!("Apply {pending} change(s) across all steps?");
	if !confirm(args, &prompt)? {
		return Err("aborted, no files were changed".into());
	}

	options.dry_run = false;
	let report = with_events(args.verbose, false, |ctx| {
		run_pipeline(&root, &options, ctx, PipelinePolicy { continue_on_error })
	});
	print_pipeline(&report, &root);

	println!();
	if report.success() {
		println!("{} all steps completed", colored!("ok:", green));
	} else {
		println!(
			"{} {} of {} steps completed successfully",
			colored!("error:", red),
			report
				.outcomes
				.iter()
				.filter(|outcome| outcome.succeeded())
				.count(),
			STEPS.len()
		);
	}

	Ok(report.success())
}

fn run_steps() {
	for step in &STEPS {
		let name = format!("{:<16}", step.name);
		let note = if step.mutates { "" } else { " (read-only)" };
		println!("{} {}{note}", colored!(name, bold), step.description);
	}
}

/// Print every step outcome and return the number of pending changes.
fn print_pipeline(report: &PipelineReport, root: &Path) -> usize {
	let mut pending = 0;
	for outcome in &report.outcomes {
		match &outcome.result {
			Ok(step_report) => {
				print_report(step_report, root, false);
				pending += step_report.changes.len();
			}
			Err(e) => {
				print_section(outcome.step.title());
				println!("  {} {e}", colored!("error:", red));
			}
		}
	}

	pending
}

fn print_report(report: &StepReport, root: &Path, diff: bool) {
	let title = if report.dry_run {
		format!("{} (dry run)", report.step.title())
	} else {
		report.step.title().to_string()
	};
	print_section(&title);

	for (label, value) in report.stats.fields() {
		print_field(label, value);
	}

	if !report.changes.is_empty() {
		println!();
	}

	for change in &report.changes {
		let rel = make_relative(&change.path, root);
		let line = match (&change.kind, report.dry_run) {
			(ChangeKind::Create, true) => format!("would create {rel}"),
			(ChangeKind::Create, false) => format!("created {rel}"),
			(ChangeKind::Update, true) => format!("would update {rel}"),
			(ChangeKind::Update, false) => format!("updated {rel}"),
			(ChangeKind::Rename { to }, true) => {
				format!("would rename {rel} -> {}", make_relative(to, root))
			}
			(ChangeKind::Rename { to }, false) => {
				format!("renamed {rel} -> {}", make_relative(to, root))
			}
		};
		println!("  {line}");

		if let Some((before, after)) = change.content.as_ref().filter(|_| diff) {
			print_diff(before, after);
		}
	}

	for issue in &report.issues {
		println!("  {} {issue}", colored!("x", red));
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
