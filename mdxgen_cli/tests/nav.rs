mod common;

use std::path::Path;

use mdxgen_core::AnyEmptyResult;

fn write_guide(root: &Path) -> AnyEmptyResult {
	std::fs::write(root.join("a.md"), "# A\n")?;
	std::fs::write(root.join("b.md"), "# B\n")?;
	std::fs::write(
		root.join("_meta.json"),
		r#"{ "guide": [
			{ "file": "a.md", "title": "A", "order": 1 },
			{ "file": "b.md", "title": "B", "order": 2 }
		] }"#,
	)?;

	Ok(())
}

#[test]
fn nav_dry_run_leaves_files_alone() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_guide(tmp.path())?;

	let mut cmd = common::mdxgen_cmd();
	cmd.arg("nav")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Inject navigation links (dry run)"))
		.stdout(predicates::str::contains("would update a.md"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("a.md"))?, "# A\n");

	Ok(())
}

#[test]
fn nav_diff_shows_added_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_guide(tmp.path())?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["nav", "--dry-run", "--diff", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("+## Previous Article"));

	Ok(())
}

#[test]
fn nav_applies_with_yes_and_converges() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_guide(tmp.path())?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["nav", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("updated b.md"));

	let content = std::fs::read_to_string(tmp.path().join("a.md"))?;
	similar_asserts::assert_eq!(
		content,
		"# A\n\n---\n\n## Previous Article\n- [B](b.md)\n\n---\n\n## Next Article\n- \
		 [B](b.md)\n\n---\n"
	);

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["nav", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("nothing to change"));

	Ok(())
}

#[test]
fn nav_refuses_to_write_without_confirmation() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_guide(tmp.path())?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["nav", "--path"])
		.arg(tmp.path())
		.write_stdin("")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("--yes"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("a.md"))?, "# A\n");

	Ok(())
}

#[test]
fn nav_fails_on_malformed_meta() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.md"), "# A\n")?;
	std::fs::write(tmp.path().join("_meta.json"), "{ broken")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["nav", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("invalid JSON"));

	Ok(())
}
