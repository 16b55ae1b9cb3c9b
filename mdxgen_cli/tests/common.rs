use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn mdxgen_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("mdxgen"));
	cmd.env("NO_COLOR", "1").env_remove("MDXGEN_LOG");
	cmd
}
