mod common;

use mdxgen_core::AnyEmptyResult;

#[test]
fn normalize_renames_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("My Page (draft).md"), "# Page\n")?;
	std::fs::write(tmp.path().join("_meta.json"), "{}")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["normalize", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"would rename My Page (draft).md -> My-Page-draft.md",
		));

	assert!(tmp.path().join("My-Page-draft.md").is_file());
	assert!(tmp.path().join("_meta.json").is_file());

	Ok(())
}

#[test]
fn normalize_dry_run_keeps_names() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a b.md"), "# Page\n")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["normalize", "--dry-run", "--path"])
		.arg(tmp.path())
		.assert()
		.success();

	assert!(tmp.path().join("a b.md").is_file());
	assert!(!tmp.path().join("a-b.md").exists());

	Ok(())
}

#[test]
fn fix_frontmatter_repairs_quotes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("page.md"),
		"---\ntitle: 'Saturn's Rings'\n---\n\nBody\n",
	)?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["fix-frontmatter", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("page.md"))?,
		"---\ntitle: 'Saturn''s Rings'\n---\n\nBody\n"
	);

	Ok(())
}
