#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const GREETING_CONFIG: &str = "header = \"# Dashboard\"\n\n[[sections]]\ntag = \
                                   \"greeting\"\ntext = \"Hello!\"\n";

pub const GREETING_DASHBOARD: &str =
	"# Dashboard\n<!-- {@greeting} -->\nHello!\n<!-- {/greeting} -->\n";

pub fn dashdoc_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("dashdoc"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("DASHDOC_LOG");
	cmd
}

pub fn write_config(root: &Path, content: &str) -> std::io::Result<()> {
	std::fs::write(root.join("dashdoc.toml"), content)
}
