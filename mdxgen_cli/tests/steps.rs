mod common;

use std::path::PathBuf;

use clap::Parser;
use mdxgen_cli::Commands;
use mdxgen_cli::MdxgenCli;
use mdxgen_core::AnyEmptyResult;
use rstest::rstest;

#[test]
fn steps_lists_the_registry() -> AnyEmptyResult {
	let mut cmd = common::mdxgen_cmd();
	cmd.arg("steps")
		.assert()
		.success()
		.stdout(predicates::str::contains("normalize"))
		.stdout(predicates::str::contains("root-meta"))
		.stdout(predicates::str::contains("validate"));

	Ok(())
}

#[test]
fn missing_subcommand_fails() -> AnyEmptyResult {
	let mut cmd = common::mdxgen_cmd();
	cmd.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));

	Ok(())
}

#[test]
fn missing_root_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mdxgen_cmd();
	cmd.arg("meta")
		.arg("--path")
		.arg(tmp.path().join("missing"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("not a directory"));

	Ok(())
}

#[test]
fn parse_validate_arguments() -> AnyEmptyResult {
	let cli = MdxgenCli::try_parse_from([
		"mdxgen",
		"validate",
		"docs/_meta.json",
		"--top-key",
		"Docs",
		"--base-dir",
		"docs",
	])?;

	let Some(Commands::Validate {
		target,
		base_dir,
		top_key,
	}) = cli.command
	else {
		panic!("expected the validate command");
	};

	assert_eq!(target, Some(PathBuf::from("docs/_meta.json")));
	assert_eq!(base_dir, Some(PathBuf::from("docs")));
	assert_eq!(top_key.as_deref(), Some("Docs"));

	Ok(())
}

#[rstest]
#[case::short(&["mdxgen", "-y", "-d", "nav"])]
#[case::long(&["mdxgen", "nav", "--yes", "--dry-run"])]
fn global_flags_parse_anywhere(#[case] args: &[&str]) -> AnyEmptyResult {
	let cli = MdxgenCli::try_parse_from(args.iter().copied())?;
	assert!(cli.yes);
	assert!(cli.dry_run);
	assert!(matches!(cli.command, Some(Commands::Nav { diff: false })));

	Ok(())
}
