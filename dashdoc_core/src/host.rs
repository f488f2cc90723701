use std::cell::RefCell;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use crate::Block;
use crate::DashdocError;
use crate::DashdocResult;
use crate::Document;
use crate::RegenerationReport;
use crate::SectionRegistry;
use crate::parser::parse_marked;
use crate::parser::render_marked;
use crate::regenerate;

/// The surface a host document exposes to the regenerator.
pub trait DocumentHost {
	/// Read the current text as a sequence of blocks.
	fn read_blocks(&self) -> DashdocResult<Vec<Block>>;

	/// Replace the byte range `range` of the host text with `text`.
	fn replace_range(&mut self, range: Range<usize>, text: &str) -> DashdocResult<()>;

	/// The byte offset at the end of the host text.
	fn write_cursor(&self) -> DashdocResult<usize>;
}

/// Regenerate a host document in one pass.
///
/// The blocks are read once, regenerated in memory and written back with a
/// single `replace_range` call, so a host error never leaves a half-written
/// document behind.
pub fn regenerate_host(
	host: &mut impl DocumentHost,
	registry: &SectionRegistry,
) -> DashdocResult<RegenerationReport> {
	let mut document = Document::from_blocks(host.read_blocks()?);
	let report = regenerate(&mut document, registry);
	let cursor = host.write_cursor()?;
	host.replace_range(0..cursor, &render_marked(&document))?;

	Ok(report)
}

/// A host keeping its marked text in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHost {
	text: String,
}

impl MemoryHost {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into() }
	}

	pub fn from_document(document: &Document) -> Self {
		Self::new(render_marked(document))
	}

	pub fn text(&self) -> &str {
		&self.text
	}
}

impl DocumentHost for MemoryHost {
	fn read_blocks(&self) -> DashdocResult<Vec<Block>> {
		Ok(parse_marked(&self.text)?.into_blocks())
	}

	fn replace_range(&mut self, range: Range<usize>, text: &str) -> DashdocResult<()> {
		splice(&mut self.text, range, text, "<memory>")
	}

	fn write_cursor(&self) -> DashdocResult<usize> {
		Ok(self.text.len())
	}
}

/// A host backed by a file on disk.
///
/// A missing file reads as an empty document. Writes go to a temporary
/// sibling file which is then renamed over the target.
///
/// [`DocumentHost::read_blocks`] remembers the text it read. Until the next
/// successful [`DocumentHost::replace_range`], the cursor and the replacement
/// fail with [`DashdocError::HostIo`] if the file no longer holds that text.
#[derive(Debug, Clone)]
pub struct FileHost {
	path: PathBuf,
	observed: RefCell<Option<String>>,
}

impl FileHost {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			observed: RefCell::new(None),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn exists(&self) -> bool {
		self.path.is_file()
	}

	/// Read the stored text. The single trailing newline added by
	/// [`FileHost::write_text`] is stripped.
	pub fn read_text(&self) -> DashdocResult<String> {
		match std::fs::read_to_string(&self.path) {
			Ok(content) => Ok(content.strip_suffix('\n').unwrap_or(&content).to_string()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
			Err(e) => Err(self.host_error(&e)),
		}
	}

	/// Read and parse the stored document.
	pub fn read_document(&self) -> DashdocResult<Document> {
		parse_marked(&self.read_text()?)
	}

	/// Replace the whole file with `text` followed by a newline.
	pub fn write_text(&self, text: &str) -> DashdocResult<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent).map_err(|e| self.host_error(&e))?;
			}
		}

		let temp_path = self.path.with_extension(format!(
			"tmp-{}-{}",
			std::process::id(),
			std::time::SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map_or(0, |duration| duration.as_nanos())
		));

		let mut payload = String::with_capacity(text.len() + 1);
		payload.push_str(text);
		payload.push('\n');

		std::fs::write(&temp_path, payload).map_err(|e| self.host_error(&e))?;
		if let Err(e) = std::fs::rename(&temp_path, &self.path) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(self.host_error(&e));
		}

		Ok(())
	}

	/// Read the text and verify it is what [`DocumentHost::read_blocks`] saw.
	fn read_unchanged(&self) -> DashdocResult<String> {
		let text = self.read_text()?;
		if self
			.observed
			.borrow()
			.as_ref()
			.is_some_and(|observed| *observed != text)
		{
			return Err(DashdocError::HostIo {
				path: self.path.display().to_string(),
				reason: "the file changed on disk since it was read".to_string(),
			});
		}

		Ok(text)
	}

	fn host_error(&self, error: &std::io::Error) -> DashdocError {
		DashdocError::HostIo {
			path: self.path.display().to_string(),
			reason: error.to_string(),
		}
	}
}

impl DocumentHost for FileHost {
	fn read_blocks(&self) -> DashdocResult<Vec<Block>> {
		let text = self.read_text()?;
		let document = parse_marked(&text)?;
		self.observed.replace(Some(text));

		Ok(document.into_blocks())
	}

	fn replace_range(&mut self, range: Range<usize>, text: &str) -> DashdocResult<()> {
		let mut content = self.read_unchanged()?;
		splice(&mut content, range, text, &self.path.display().to_string())?;
		self.write_text(&content)?;
		self.observed.replace(Some(content));

		Ok(())
	}

	fn write_cursor(&self) -> DashdocResult<usize> {
		Ok(self.read_unchanged()?.len())
	}
}

fn splice(target: &mut String, range: Range<usize>, text: &str, name: &str) -> DashdocResult<()> {
	if range.start > range.end
		|| range.end > target.len()
		|| !target.is_char_boundary(range.start)
		|| !target.is_char_boundary(range.end)
	{
		return Err(DashdocError::HostIo {
			path: name.to_string(),
			reason: format!(
				"range {}..{} is outside the document (length {})",
				range.start,
				range.end,
				target.len()
			),
		});
	}

	target.replace_range(range, text);
	Ok(())
}
