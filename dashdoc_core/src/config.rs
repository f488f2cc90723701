use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::CommandProducer;
use crate::DashdocError;
use crate::DashdocResult;
use crate::FileCategory;
use crate::FileListProducer;
use crate::FileProducer;
use crate::Producer;
use crate::SectionRegistry;
use crate::TextProducer;
use crate::parser::find_marker_line;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["dashdoc.toml", ".dashdoc.toml", ".config/dashdoc.toml"];

/// Default path of the generated dashboard, relative to the project root.
pub const DEFAULT_OUTPUT: &str = "dashboard.md";

/// Configuration loaded from a `dashdoc.toml` file.
///
/// ```toml
/// output = "dashboard.md"
/// header = "# Dashboard"
///
/// [display]
/// mode = "columns"
/// columns = 2
///
/// [[sections]]
/// tag = "files"
/// files = [{ label = "Tracked", patterns = ["notes/*.md"] }]
///
/// [[sections]]
/// tag = "status"
/// command = "git status --short"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashdocConfig {
	/// Path of the dashboard file, relative to the project root.
	#[serde(default = "default_output")]
	pub output: PathBuf,
	/// Header written once when the dashboard file is first created.
	#[serde(default)]
	pub header: Option<HeaderConfig>,
	/// How `dashdoc show` presents the dashboard.
	#[serde(default)]
	pub display: DisplayConfig,
	/// Sections in rendering order.
	#[serde(default)]
	pub sections: Vec<SectionConfig>,
}

fn default_output() -> PathBuf {
	PathBuf::from(DEFAULT_OUTPUT)
}

/// The dashboard header: either literal text or a producer evaluated when
/// the dashboard is created.
///
/// ```toml
/// header = "# Dashboard"
/// # or
/// header = { command = "date +'# %A'" }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum HeaderConfig {
	Text(String),
	Source(SourceConfig),
}

impl HeaderConfig {
	/// Produce the header text.
	pub fn render(&self, root: &Path) -> DashdocResult<String> {
		match self {
			Self::Text(text) => Ok(text.clone()),
			Self::Source(source) => source.producer("header", root)?.produce(),
		}
	}
}

/// Where the content of a section or header comes from. Exactly one field
/// must be set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
	/// Literal text.
	#[serde(default)]
	pub text: Option<String>,
	/// A file whose contents are read on every refresh.
	#[serde(default)]
	pub path: Option<PathBuf>,
	/// A shell command run in the project root; its stdout is the content.
	#[serde(default)]
	pub command: Option<String>,
	/// Categorized file listing grouped by directory.
	#[serde(default)]
	pub files: Option<Vec<FileCategory>>,
}

/// The resolved kind of a [`SourceConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
	Text,
	Path,
	Command,
	Files,
}

impl SourceConfig {
	/// Determine which source is configured, rejecting zero or several.
	pub fn kind(&self) -> DashdocResult<SourceKind> {
		let configured: Vec<SourceKind> = [
			self.text.as_ref().map(|_| SourceKind::Text),
			self.path.as_ref().map(|_| SourceKind::Path),
			self.command.as_ref().map(|_| SourceKind::Command),
			self.files.as_ref().map(|_| SourceKind::Files),
		]
		.into_iter()
		.flatten()
		.collect();

		match configured.as_slice() {
			[kind] => Ok(*kind),
			[] => {
				Err(DashdocError::ConfigParse(
					"a section needs one of `text`, `path`, `command` or `files`".to_string(),
				))
			}
			_ => {
				Err(DashdocError::ConfigParse(
					"a section can only set one of `text`, `path`, `command` or `files`".to_string(),
				))
			}
		}
	}

	/// A readable default name for the producer, derived from its source.
	pub fn describe(&self) -> String {
		match self.kind() {
			Ok(SourceKind::Text) => "text".to_string(),
			Ok(SourceKind::Path) => {
				self.path
					.as_ref()
					.map_or_else(String::new, |path| path.display().to_string())
			}
			Ok(SourceKind::Command) => self.command.clone().unwrap_or_default(),
			Ok(SourceKind::Files) => "files".to_string(),
			Err(_) => "invalid".to_string(),
		}
	}

	/// Build the producer for this source, resolving paths against `root`.
	pub fn producer(&self, name: &str, root: &Path) -> DashdocResult<Box<dyn Producer>> {
		let producer: Box<dyn Producer> = match self.kind()? {
			SourceKind::Text => {
				Box::new(TextProducer::new(name, self.text.clone().unwrap_or_default()))
			}
			SourceKind::Path => {
				let path = self.path.clone().unwrap_or_default();
				Box::new(FileProducer::new(name, root.join(path)))
			}
			SourceKind::Command => {
				let command = self.command.clone().unwrap_or_default();
				Box::new(CommandProducer::new(name, command, root))
			}
			SourceKind::Files => {
				let categories = self.files.clone().unwrap_or_default();
				Box::new(FileListProducer::new(name, root, categories))
			}
		};

		Ok(producer)
	}
}

/// One `[[sections]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SectionConfig {
	/// Tag used to locate the section on later refreshes. Untagged sections
	/// are rewritten on every refresh.
	#[serde(default)]
	pub tag: Option<String>,
	/// Producer identity shown in listings and error markers. Defaults to the
	/// tag, then to a description of the source.
	#[serde(default)]
	pub name: Option<String>,
	#[serde(flatten)]
	pub source: SourceConfig,
}

impl SectionConfig {
	pub fn producer_name(&self) -> String {
		self.name
			.clone()
			.or_else(|| self.tag.clone())
			.unwrap_or_else(|| self.source.describe())
	}
}

/// How the dashboard is presented by `dashdoc show`.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
	/// Print the dashboard as-is.
	#[default]
	Stacked,
	/// Clear the terminal and print only the dashboard.
	Only,
	/// Lay the blocks out side by side.
	Columns,
}

/// Display settings.
///
/// ```toml
/// [display]
/// mode = "columns"
/// columns = 3
/// column_width = 32
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
	#[serde(default)]
	pub mode: DisplayMode,
	/// Number of columns used by [`DisplayMode::Columns`].
	#[serde(default = "default_columns")]
	pub columns: usize,
	/// Width of each column used by [`DisplayMode::Columns`].
	#[serde(default = "default_column_width")]
	pub column_width: usize,
}

impl Default for DisplayConfig {
	fn default() -> Self {
		Self {
			mode: DisplayMode::default(),
			columns: default_columns(),
			column_width: default_column_width(),
		}
	}
}

fn default_columns() -> usize {
	2
}

fn default_column_width() -> usize {
	40
}

impl DashdocConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> DashdocResult<Option<DashdocConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	/// Parse config text. Sources are validated here so that a bad section is
	/// reported before any refresh starts.
	pub fn parse(content: &str) -> DashdocResult<DashdocConfig> {
		let config: DashdocConfig =
			toml::from_str(content).map_err(|e| DashdocError::ConfigParse(e.to_string()))?;

		if config.display.columns == 0 {
			return Err(DashdocError::ConfigParse(
				"`display.columns` must be at least 1".to_string(),
			));
		}

		for section in &config.sections {
			section.source.kind()?;
		}

		if config.display.column_width == 0 {
			return Err(DashdocError::ConfigParse(
				"`display.column_width` must be at least 1".to_string(),
			));
		}

		match &config.header {
			Some(HeaderConfig::Text(text)) => check_header(text)?,
			Some(HeaderConfig::Source(source)) => {
				source.kind()?;
			}
			None => {}
		}

		Ok(config)
	}

	/// Build the section registry in configuration order.
	pub fn build_registry(&self, root: &Path) -> DashdocResult<SectionRegistry> {
		let mut registry = SectionRegistry::new();

		for section in &self.sections {
			let producer = section.source.producer(&section.producer_name(), root)?;
			registry.register_boxed(section.tag.as_deref(), producer)?;
		}

		Ok(registry)
	}

	/// Absolute path of the dashboard file.
	pub fn output_path(&self, root: &Path) -> PathBuf {
		root.join(&self.output)
	}

	/// Produce the header text, if a header is configured.
	pub fn header_text(&self, root: &Path) -> DashdocResult<Option<String>> {
		let header = self.header.as_ref().map(|header| header.render(root)).transpose()?;
		if let Some(text) = &header {
			check_header(text)?;
		}

		Ok(header)
	}
}

/// The header is written as opaque text, so a marker line inside it would be
/// read back as a section boundary.
fn check_header(text: &str) -> DashdocResult<()> {
	match find_marker_line(text) {
		Some(line) => {
			Err(DashdocError::ConfigParse(format!(
				"the header contains the section marker line `{}`",
				line.trim()
			)))
		}
		None => Ok(()),
	}
}
