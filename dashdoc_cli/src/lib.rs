use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use dashdoc_core::DisplayMode;

pub use layout::*;

mod layout;


#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep a dashboard document of generated sections up to date.",
	long_about = "dashdoc maintains a dashboard file made of tagged sections. Each section is \
	              produced by a command, a file, literal text or a file listing configured in \
	              dashdoc.toml, and every refresh regenerates the sections in configuration order \
	              while leaving the rest of the file alone.\n\nQuick start:\n  dashdoc init     \
	              Create a dashdoc.toml\n  dashdoc refresh  Regenerate the dashboard\n  dashdoc \
	              check    Verify the dashboard is up to date\n  dashdoc show     Display the \
	              dashboard"
)]
pub struct DashdocCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize dashdoc in a project by creating a sample `dashdoc.toml`.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Regenerate every configured section of the dashboard file.
	///
	/// Sections are located by tag, regenerated and written back in
	/// configuration order. A failing section is replaced by a visible error
	/// marker without stopping the others. The dashboard file is created,
	/// seeded with the configured header, when it does not exist yet.
	Refresh {
		/// Compute the new dashboard without writing it.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Remove generated sections whose tag is no longer configured.
		#[arg(long, default_value_t = false)]
		prune: bool,

		/// Watch for file changes and refresh again automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that the dashboard file is up to date.
	///
	/// Regenerates the dashboard in memory and exits with a non-zero status
	/// code when the result differs from the file on disk.
	Check {
		/// Show a line diff between the current and regenerated dashboard.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Display the dashboard using a layout.
	///
	/// The layout defaults to the `[display]` section of `dashdoc.toml`.
	Show {
		/// How to lay out the dashboard.
		#[arg(long, value_enum)]
		mode: Option<DisplayModeArg>,

		/// Number of columns for the `columns` mode.
		#[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
		columns: Option<u16>,

		/// Refresh the dashboard before displaying it.
		#[arg(long, default_value_t = false)]
		refresh: bool,
	},
	/// List the configured sections in rendering order.
	List {
		/// Output format for the section list.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DisplayModeArg {
	/// Print the dashboard as-is.
	Stacked,
	/// Clear the terminal and print only the dashboard.
	Only,
	/// Lay the dashboard blocks out side by side.
	Columns,
}

impl From<DisplayModeArg> for DisplayMode {
	fn from(mode: DisplayModeArg) -> Self {
		match mode {
			DisplayModeArg::Stacked => Self::Stacked,
			DisplayModeArg::Only => Self::Only,
			DisplayModeArg::Columns => Self::Columns,
		}
	}
}
