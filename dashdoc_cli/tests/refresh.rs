mod common;

use dashdoc_core::AnyEmptyResult;
use similar_asserts::assert_eq;

#[test]
fn refresh_creates_dashboard_with_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(tmp.path(), common::GREETING_CONFIG)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created dashboard.md with 1 section(s)."));

	let content = std::fs::read_to_string(tmp.path().join("dashboard.md"))?;
	assert_eq!(content, common::GREETING_DASHBOARD);

	Ok(())
}

#[test]
fn refresh_replaces_stale_content_and_keeps_surroundings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(tmp.path(), common::GREETING_CONFIG)?;
	std::fs::write(
		tmp.path().join("dashboard.md"),
		"# My notes\n<!-- {@greeting} -->\nOld content.\n<!-- {/greeting} -->\n",
	)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Refreshed 1 section(s) in dashboard.md."));

	let content = std::fs::read_to_string(tmp.path().join("dashboard.md"))?;
	assert_eq!(
		content,
		"# My notes\n<!-- {@greeting} -->\nHello!\n<!-- {/greeting} -->\n"
	);

	Ok(())
}

#[test]
fn refresh_noop_when_in_sync() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(tmp.path(), common::GREETING_CONFIG)?;
	std::fs::write(tmp.path().join("dashboard.md"), common::GREETING_DASHBOARD)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn refresh_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(tmp.path(), common::GREETING_CONFIG)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Dry run: would refresh 1 section(s) in dashboard.md.",
		));

	assert!(!tmp.path().join("dashboard.md").exists());

	Ok(())
}

#[test]
fn refresh_prune_removes_unconfigured_sections() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(tmp.path(), common::GREETING_CONFIG)?;
	std::fs::write(
		tmp.path().join("dashboard.md"),
		"# Dashboard\n<!-- {@old} -->\nstale\n<!-- {/old} -->\n<!-- {@greeting} -->\nHello!\n<!-- \
		 {/greeting} -->\n",
	)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--prune")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Pruned section `old`"));

	let content = std::fs::read_to_string(tmp.path().join("dashboard.md"))?;
	assert_eq!(content, common::GREETING_DASHBOARD);

	Ok(())
}

#[cfg(unix)]
#[test]
fn refresh_reports_failing_section_and_keeps_others() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(
		tmp.path(),
		"[[sections]]\ntag = \"broken\"\ncommand = \"exit 3\"\n\n[[sections]]\ntag = \
		 \"greeting\"\ntext = \"Hello!\"\n",
	)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains(
			"warning: section producer `broken` failed: command exited with status 3",
		));

	let content = std::fs::read_to_string(tmp.path().join("dashboard.md"))?;
	assert_eq!(
		content,
		"<!-- {@broken} -->\n[dashdoc] section producer `broken` failed: command exited with \
		 status 3\n<!-- {/broken} -->\n<!-- {@greeting} -->\nHello!\n<!-- {/greeting} -->\n"
	);

	Ok(())
}

#[test]
fn refresh_without_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("dashdoc::missing_config"));

	Ok(())
}

#[test]
fn refresh_rejects_duplicate_tags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(
		tmp.path(),
		"[[sections]]\ntag = \"a\"\ntext = \"one\"\n\n[[sections]]\ntag = \"a\"\ntext = \"two\"\n",
	)?;

	common::dashdoc_cmd()
		.arg("refresh")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("dashdoc::duplicate_tag"));

	assert!(!tmp.path().join("dashboard.md").exists());

	Ok(())
}
