use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use dashdoc_cli::Commands;
use dashdoc_cli::DashdocCli;
use dashdoc_cli::DisplayModeArg;
use dashdoc_cli::OutputFormat;
use dashdoc_cli::layout_for;
use dashdoc_core::CONFIG_FILE_CANDIDATES;
use dashdoc_core::Dashboard;
use dashdoc_core::DashdocConfig;
use dashdoc_core::RefreshOptions;
use dashdoc_core::RefreshResult;
use dashdoc_core::SectionStatus;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "DASHDOC_LOG";

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
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DashdocCli::parse();

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

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Refresh {
			dry_run,
			prune,
			watch,
		}) => run_refresh(&args, RefreshOptions { dry_run, prune }, watch),
		Some(Commands::Check { diff, format }) => run_check(&args, diff, format),
		Some(Commands::Show {
			mode,
			columns,
			refresh,
		}) => run_show(&args, mode, columns, refresh),
		Some(Commands::List { format }) => run_list(&args, format),
		None => {
			eprintln!("No subcommand specified. Run `dashdoc --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<dashdoc_core::DashdocError>() {
			Ok(dashdoc_err) => {
				let report: miette::Report = (*dashdoc_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. The filter comes from `DASHDOC_LOG` and falls back to
/// `debug` with `--verbose` and `error` otherwise.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "error" };
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &DashdocCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_init(args: &DashdocCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = DashdocConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join(CONFIG_FILE_CANDIDATES[0]);
	let sample_config = "# dashdoc configuration\n\n# The dashboard file, relative to this \
	                     directory.\noutput = \"dashboard.md\"\n\n# Written once when the \
	                     dashboard is created.\nheader = \"# Dashboard\"\n\n[display]\nmode = \
	                     \"stacked\"\n\n[[sections]]\ntag = \"notes\"\nfiles = [{ label = \
	                     \"Notes\", patterns = [\"**/*.md\"] }]\n\n# [[sections]]\n# tag = \
	                     \"status\"\n# command = \"git status --short\"\n";

	std::fs::write(&config_path, sample_config)?;
	println!("Created {}", CONFIG_FILE_CANDIDATES[0]);
	println!();
	println!("Next steps:");
	println!("  1. Edit {} to describe your sections", config_path.display());
	println!("  2. Run `dashdoc refresh` to generate the dashboard");

	Ok(())
}

fn run_refresh(
	args: &DashdocCli,
	options: RefreshOptions,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let dashboard = Dashboard::load(&resolve_root(args))?;
	run_refresh_once(args, &dashboard, options)?;

	if !watch || options.dry_run {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let output = dashboard.output_path();
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_)
						| notify::EventKind::Create(_)
						| notify::EventKind::Remove(_)
				) && !event.paths.iter().all(|path| is_output_file(path, &output))
				{
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, refreshing...");
		// Reload so edits to the config are picked up.
		let result = Dashboard::load(&root)
			.map_err(Into::into)
			.and_then(|dashboard| run_refresh_once(args, &dashboard, options));
		if let Err(e) = result {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// The dashboard file and the temporary files used to write it atomically.
fn is_output_file(path: &Path, output: &Path) -> bool {
	let (Some(name), Some(output_name)) = (path.file_name(), output.file_name()) else {
		return false;
	};

	if name == output_name {
		return true;
	}

	let stem = output
		.file_stem()
		.map(|stem| stem.to_string_lossy().to_string())
		.unwrap_or_default();

	name.to_string_lossy().starts_with(&format!("{stem}.tmp-"))
}

fn run_refresh_once(
	args: &DashdocCli,
	dashboard: &Dashboard,
	options: RefreshOptions,
) -> Result<RefreshResult, Box<dyn std::error::Error>> {
	let result = dashboard.refresh(options)?;
	let rel = make_relative(&result.path, dashboard.root());

	print_failures(&result);

	for tag in &result.pruned {
		println!("Pruned section `{tag}`");
	}

	if !result.changed() {
		println!("Dashboard is already up to date.");
		return Ok(result);
	}

	let count = result.report.sections.len();
	if options.dry_run {
		println!("Dry run: would refresh {count} section(s) in {rel}.");
	} else if result.created {
		println!("Created {rel} with {count} section(s).");
	} else {
		println!("Refreshed {count} section(s) in {rel}.");
	}

	if args.verbose {
		for outcome in &result.report.sections {
			let tag = outcome.tag.as_deref().unwrap_or("-");
			let status = match &outcome.status {
				SectionStatus::Replaced => "replaced",
				SectionStatus::Inserted => "inserted",
				SectionStatus::Failed { .. } => "failed",
			};
			println!("  {tag} ({}) {status}", outcome.producer);
		}
	}

	Ok(result)
}

fn print_failures(result: &RefreshResult) {
	for failure in result.report.failures() {
		if let SectionStatus::Failed { message } = &failure.status {
			eprintln!(
				"{} section producer `{}` failed: {message}",
				colored!("warning:", yellow),
				failure.producer,
			);
		}
	}
}

fn run_check(
	args: &DashdocCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let dashboard = Dashboard::load(&root)?;
	let result = dashboard.check()?;
	let rel = make_relative(&result.path, &root);

	if !result.changed() {
		match format {
			OutputFormat::Json => {
				let output = serde_json::json!({
					"ok": true,
					"file": rel,
					"sections": result.report.sections,
				});
				println!("{output}");
			}
			OutputFormat::Text => {
				println!("Check passed: dashboard is up to date.");
			}
		}
		return Ok(());
	}

	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"ok": false,
				"file": rel,
				"missing": result.created,
				"sections": result.report.sections,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			print_failures(&result);
			eprintln!("Check failed.");
			if result.created {
				eprintln!("  {rel} does not exist");
			} else {
				eprintln!("  {rel} is out of date");
			}

			if show_diff {
				eprintln!();
				print_diff(&result.previous, &result.rendered);
			}

			eprintln!();
			eprintln!("Run `dashdoc refresh` to fix.");
		}
	}

	process::exit(1);
}

fn run_show(
	args: &DashdocCli,
	mode: Option<DisplayModeArg>,
	columns: Option<u16>,
	refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let dashboard = Dashboard::load(&resolve_root(args))?;

	let document = if refresh {
		let result = dashboard.refresh(RefreshOptions::default())?;
		print_failures(&result);
		result.document
	} else {
		dashboard.document()?
	};

	let mut display = dashboard.config().display.clone();
	if let Some(columns) = columns {
		display.columns = usize::from(columns);
	}
	let mode = mode.map_or(display.mode, Into::into);

	println!("{}", layout_for(mode, &display).present(&document));

	Ok(())
}

fn run_list(args: &DashdocCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let dashboard = Dashboard::load(&resolve_root(args))?;
	let specs = dashboard.registry().list();

	if let OutputFormat::Json = format {
		let sections: Vec<serde_json::Value> = specs
			.iter()
			.map(|spec| {
				serde_json::json!({
					"tag": spec.tag,
					"producer": spec.producer.name(),
					"kind": spec.producer.kind(),
				})
			})
			.collect();
		println!("{}", serde_json::json!({ "sections": sections }));
		return Ok(());
	}

	if specs.is_empty() {
		println!("No sections configured.");
		return Ok(());
	}

	println!("{}", colored!("Sections:", bold));
	for spec in specs {
		let tag = spec
			.tag
			.as_deref()
			.map_or_else(|| colored!("(untagged)", dimmed), |tag| format!("@{tag}"));
		println!("  {tag} {} [{}]", spec.producer.name(), spec.producer.kind());
	}

	println!("\n{} section(s)", specs.len());

	Ok(())
}

/// Print a unified diff between two strings, colorized.
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
		if change.missing_newline() {
			eprintln!();
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
