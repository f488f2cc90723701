use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Deserialize;
use serde::Serialize;

use crate::DashdocError;
use crate::DashdocResult;
use crate::Producer;

/// Returns a fixed string.
#[derive(Debug, Clone)]
pub struct TextProducer {
	name: String,
	text: String,
}

impl TextProducer {
	pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			text: text.into(),
		}
	}
}

impl Producer for TextProducer {
	fn name(&self) -> String {
		self.name.clone()
	}

	fn produce(&self) -> DashdocResult<String> {
		Ok(self.text.clone())
	}

	fn kind(&self) -> &'static str {
		"text"
	}
}

/// Returns the contents of a file, read fresh on every pass.
#[derive(Debug, Clone)]
pub struct FileProducer {
	name: String,
	path: PathBuf,
}

impl FileProducer {
	pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
		}
	}
}

impl Producer for FileProducer {
	fn name(&self) -> String {
		self.name.clone()
	}

	fn produce(&self) -> DashdocResult<String> {
		let content = std::fs::read_to_string(&self.path).map_err(|e| {
			DashdocError::ProducerFailed {
				producer: self.name.clone(),
				reason: format!("cannot read `{}`: {e}", self.path.display()),
			}
		})?;

		Ok(content.trim_end_matches('\n').to_string())
	}

	fn kind(&self) -> &'static str {
		"file"
	}
}

/// Runs a shell command in a working directory and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandProducer {
	name: String,
	command: String,
	cwd: PathBuf,
}

impl CommandProducer {
	pub fn new(name: impl Into<String>, command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
		Self {
			name: name.into(),
			command: command.into(),
			cwd: cwd.into(),
		}
	}

	fn failure(&self, reason: impl Into<String>) -> DashdocError {
		DashdocError::ProducerFailed {
			producer: self.name.clone(),
			reason: reason.into(),
		}
	}
}

impl Producer for CommandProducer {
	fn name(&self) -> String {
		self.name.clone()
	}

	fn produce(&self) -> DashdocResult<String> {
		let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
		let output = Command::new(shell)
			.arg(flag)
			.arg(&self.command)
			.current_dir(&self.cwd)
			.output()
			.map_err(|e| self.failure(format!("cannot run `{}`: {e}", self.command)))?;

		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
			let reason = if stderr.is_empty() {
				format!(
					"command exited with status {}",
					output
						.status
						.code()
						.map_or_else(|| "unknown".to_string(), |code| code.to_string())
				)
			} else {
				stderr
			};

			return Err(self.failure(reason));
		}

		let stdout = String::from_utf8(output.stdout)
			.map_err(|_| self.failure("command output is not valid UTF-8"))?;

		Ok(stdout.trim_end_matches('\n').to_string())
	}

	fn kind(&self) -> &'static str {
		"command"
	}
}

/// One labeled collection of files for a [`FileListProducer`].
///
/// ```toml
/// files = [
///   { label = "Tracked", paths = ["notes.md"], patterns = ["docs/**/*.md"] },
///   { label = "Deprecated", paths = ["old/todo.md"] },
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCategory {
	/// Heading rendered above the category.
	pub label: String,
	/// Explicit paths relative to the project root, listed first and kept in
	/// order.
	#[serde(default)]
	pub paths: Vec<PathBuf>,
	/// Glob patterns matched against files found under the project root.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Lists categorized files grouped by directory.
#[derive(Debug, Clone)]
pub struct FileListProducer {
	name: String,
	root: PathBuf,
	categories: Vec<FileCategory>,
}

impl FileListProducer {
	pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, categories: Vec<FileCategory>) -> Self {
		Self {
			name: name.into(),
			root: root.into(),
			categories,
		}
	}

	/// Resolve the files of one category: explicit paths first, then pattern
	/// matches in sorted order, without duplicates.
	fn resolve(&self, category: &FileCategory) -> DashdocResult<Vec<String>> {
		let mut seen = HashSet::new();
		let mut files: Vec<String> = category
			.paths
			.iter()
			.map(normalize_path)
			.filter(|path| seen.insert(path.clone()))
			.collect();

		if category.patterns.is_empty() {
			return Ok(files);
		}

		let globs = build_glob_set(&category.patterns).map_err(|reason| {
			DashdocError::ProducerFailed {
				producer: self.name.clone(),
				reason,
			}
		})?;
		let gitignore = build_gitignore(&self.root);
		let mut found = Vec::new();
		walk_dir(&self.root, &gitignore, &mut found, &mut HashSet::new()).map_err(|e| {
			DashdocError::ProducerFailed {
				producer: self.name.clone(),
				reason: format!("cannot list `{}`: {e}", self.root.display()),
			}
		})?;

		let mut matched: Vec<String> = found
			.iter()
			.filter_map(|path| path.strip_prefix(&self.root).ok())
			.filter(|relative| globs.is_match(relative))
			.map(normalize_path)
			.collect();
		matched.sort();

		files.extend(matched.into_iter().filter(|path| seen.insert(path.clone())));

		Ok(files)
	}
}

impl Producer for FileListProducer {
	fn name(&self) -> String {
		self.name.clone()
	}

	fn produce(&self) -> DashdocResult<String> {
		let mut listing = Vec::with_capacity(self.categories.len());
		for category in &self.categories {
			listing.push((category.label.clone(), self.resolve(category)?));
		}

		Ok(render_file_list(&listing))
	}

	fn kind(&self) -> &'static str {
		"files"
	}
}

/// Render labeled file collections, grouping each collection by directory.
///
/// Files keep their input order inside a directory group. Groups are sorted
/// lexicographically by directory and files at the top level are grouped
/// under `./`. Categories without files are omitted.
pub fn render_file_list(categories: &[(String, Vec<String>)]) -> String {
	let mut sections = Vec::new();

	for (label, files) in categories {
		if files.is_empty() {
			continue;
		}

		let mut lines = vec![format!("## {label}")];
		for (dir, names) in group_by_directory(files) {
			lines.push(format!("- {dir}/"));
			lines.extend(names.into_iter().map(|name| format!("  - {name}")));
		}
		sections.push(lines.join("\n"));
	}

	sections.join("\n\n")
}

/// Partition files by parent directory, preserving input order within each
/// group, and sort the groups by directory.
pub fn group_by_directory(files: &[String]) -> Vec<(String, Vec<String>)> {
	let mut groups: Vec<(String, Vec<String>)> = Vec::new();

	for file in files {
		let (dir, name) = match file.rsplit_once('/') {
			Some((dir, name)) if !dir.is_empty() => (dir.to_string(), name.to_string()),
			_ => (".".to_string(), file.trim_start_matches('/').to_string()),
		};

		match groups.iter_mut().find(|(existing, _)| *existing == dir) {
			Some((_, names)) => names.push(name),
			None => groups.push((dir, vec![name])),
		}
	}

	groups.sort_by(|a, b| a.0.cmp(&b.0));
	groups
}

fn normalize_path(path: impl AsRef<Path>) -> String {
	let normalized = path.as_ref().to_string_lossy().replace('\\', "/");
	normalized
		.strip_prefix("./")
		.unwrap_or(&normalized)
		.to_string()
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, String> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = GlobBuilder::new(pattern)
			.literal_separator(true)
			.build()
			.map_err(|e| format!("invalid pattern `{pattern}`: {e}"))?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| format!("failed to build file patterns: {e}"))
}

/// Build a `Gitignore` matcher from the root's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Collect files under `dir`. Directories are tracked by canonical path, so a
/// symlink leading back to a visited directory is not followed again.
fn walk_dir(
	dir: &Path,
	gitignore: &Gitignore,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> std::io::Result<()> {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		tracing::debug!(path = %dir.display(), "skipping already visited directory");
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
			if is_ignored_directory_name(name) && path.is_dir() {
				continue;
			}
		}

		let is_dir = path.is_dir();
		if gitignore.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, gitignore, files, visited_dirs)?;
		} else {
			files.push(path);
		}
	}

	Ok(())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}
