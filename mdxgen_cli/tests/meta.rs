mod common;

use mdxgen_core::AnyEmptyResult;
use serde_json::Value;

fn read_json(path: &std::path::Path) -> Result<Value, Box<dyn std::error::Error>> {
	Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

#[test]
fn meta_writes_flat_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("house_lords"))?;
	std::fs::write(tmp.path().join("house_lords/02_second.md"), "# Second\n")?;
	std::fs::write(tmp.path().join("house_lords/01_first.md"), "# First\n")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["meta", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("would create house_lords/_meta.json"));

	let meta = read_json(&tmp.path().join("house_lords/_meta.json"))?;
	assert_eq!(
		meta,
		serde_json::json!({
			"house lords": [
				{ "file": "01_first.md", "title": "first", "order": 1 },
				{ "file": "02_second.md", "title": "second", "order": 2 }
			]
		})
	);

	Ok(())
}

#[test]
fn root_meta_uses_label_override() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("guide"))?;
	std::fs::write(tmp.path().join("guide/page.md"), "---\ntitle: The Page\n---\n")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["root-meta", "--yes", "--label", "Handbook", "--path"])
		.arg(tmp.path())
		.assert()
		.success();

	let meta = read_json(&tmp.path().join("_meta.tree.json"))?;
	assert_eq!(meta["Handbook"][0]["folder"], "guide");
	assert_eq!(meta["Handbook"][0]["children"][0]["title"], "The Page");

	Ok(())
}

#[test]
fn root_meta_reads_label_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("guide"))?;
	std::fs::write(tmp.path().join("guide/page.md"), "# Page\n")?;
	std::fs::write(tmp.path().join("mdxgen.toml"), "label = \"Guide Book\"\n")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["root-meta", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success();

	let meta = read_json(&tmp.path().join("_meta.tree.json"))?;
	assert!(meta.get("Guide Book").is_some());

	Ok(())
}

#[test]
fn invalid_config_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("mdxgen.toml"), "labels = 3\n")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["root-meta", "--dry-run", "--path"])
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn index_requires_root_meta() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["index", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("meta file not found"));

	Ok(())
}

#[test]
fn index_is_rendered_from_root_meta() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("planets"))?;
	std::fs::write(tmp.path().join("planets/01_sun.md"), "# Sun\n")?;

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["root-meta", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success();

	let mut cmd = common::mdxgen_cmd();
	cmd.args(["index", "--yes", "--path"])
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("would create index.mdx"));

	let index = std::fs::read_to_string(tmp.path().join("index.mdx"))?;
	assert!(index.starts_with("# Documentation\n"));
	assert!(index.contains("### [Planets](planets)\n_The planets are"));
	assert!(index.contains("- [Sun](planets/01_sun.md)"));

	Ok(())
}
