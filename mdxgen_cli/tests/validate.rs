mod common;

use mdxgen_core::AnyEmptyResult;

#[test]
fn validate_passes_for_existing_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("page.md"), "# Page\n")?;
	std::fs::write(
		tmp.path().join("_meta.json"),
		r#"{ "Docs": [{ "name": "page.md", "title": "Page", "path": "page.md" }] }"#,
	)?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["validate", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("all referenced files exist"));

	Ok(())
}

#[test]
fn validate_reports_missing_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("_meta.json"),
		r#"{ "Docs": [{ "name": "gone.md", "title": "Gone", "path": "gone.md" }] }"#,
	)?;

	let mut cmd = common::mdxgen_cmd();
	cmd.arg("validate")
		.arg(tmp.path().join("_meta.json"))
		.args(["--top-key", "Docs"])
		.assert()
		.code(1)
		.stdout(predicates::str::contains("missing file `gone.md`"))
		.stdout(predicates::str::contains("validation failed"));

	Ok(())
}

#[test]
fn validate_resolves_against_base_dir() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("content"))?;
	std::fs::create_dir_all(tmp.path().join("meta"))?;
	std::fs::write(tmp.path().join("content/page.md"), "# Page\n")?;
	std::fs::write(
		tmp.path().join("meta/_meta.json"),
		r#"{ "Docs": [{ "title": "Page", "path": "page.md" }] }"#,
	)?;

	let mut cmd = common::mdxgen_cmd();
	cmd.arg("validate")
		.arg(tmp.path().join("meta/_meta.json"))
		.arg("--base-dir")
		.arg(tmp.path().join("content"))
		.assert()
		.success();

	Ok(())
}

#[test]
fn validate_rejects_invalid_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("_meta.json"), "{ nope")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.arg("validate")
		.arg(tmp.path().join("_meta.json"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("invalid JSON"));

	Ok(())
}
