use crate::Block;
use crate::BlockOrigin;
use crate::DashdocError;
use crate::DashdocResult;
use crate::Document;
use crate::document::BLOCK_DELIMITER;

const MARKER_START: &str = "<!-- {";
const MARKER_END: &str = "} -->";

/// A single marker line recognised by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Marker<'a> {
	/// `<!-- {@tag} -->` or `<!-- {@} -->`.
	Open(&'a str),
	/// `<!-- {/tag} -->` or `<!-- {/} -->`.
	Close(&'a str),
}

/// Classify a line as a marker. Surrounding whitespace is ignored; anything
/// else on the line makes it ordinary content.
pub(crate) fn parse_marker(line: &str) -> Option<Marker<'_>> {
	let inner = line
		.trim()
		.strip_prefix(MARKER_START)?
		.strip_suffix(MARKER_END)?;

	if let Some(tag) = inner.strip_prefix('@') {
		is_marker_tag(tag).then_some(Marker::Open(tag))
	} else if let Some(tag) = inner.strip_prefix('/') {
		is_marker_tag(tag).then_some(Marker::Close(tag))
	} else {
		None
	}
}

fn is_marker_tag(tag: &str) -> bool {
	tag.is_empty() || is_valid_tag(tag)
}

/// Returns `true` when `tag` can be used to identify a section.
pub fn is_valid_tag(tag: &str) -> bool {
	!tag.is_empty()
		&& !tag
			.chars()
			.any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '/'))
}

/// Render the opening marker for a generated block.
pub fn open_marker(tag: Option<&str>) -> String {
	format!("{MARKER_START}@{}{MARKER_END}", tag.unwrap_or_default())
}

/// Render the closing marker for a generated block.
pub fn close_marker(tag: Option<&str>) -> String {
	format!("{MARKER_START}/{}{MARKER_END}", tag.unwrap_or_default())
}

/// Returns `true` when a line of `content` would end a section tagged `tag`
/// (`None` for untagged sections) once rendered between markers.
pub fn closes_section(content: &str, tag: Option<&str>) -> bool {
	let tag = tag.unwrap_or_default();
	content
		.split(BLOCK_DELIMITER)
		.any(|line| parse_marker(line) == Some(Marker::Close(tag)))
}

/// The first line of `text` that reads as a section marker.
pub fn find_marker_line(text: &str) -> Option<&str> {
	text.split(BLOCK_DELIMITER)
		.find(|line| parse_marker(line).is_some())
}

/// Render a document as text with marker lines around generated blocks.
/// Opaque blocks are written verbatim.
pub fn render_marked(document: &Document) -> String {
	document
		.blocks()
		.iter()
		.map(|block| {
			match block.origin {
				BlockOrigin::Opaque => block.content.clone(),
				BlockOrigin::Generated => {
					let tag = block.tag.as_deref();
					format!(
						"{}{BLOCK_DELIMITER}{}{BLOCK_DELIMITER}{}",
						open_marker(tag),
						block.content,
						close_marker(tag)
					)
				}
			}
		})
		.collect::<Vec<_>>()
		.join(BLOCK_DELIMITER)
}

struct PendingSection {
	tag: String,
	line: usize,
	lines: Vec<String>,
}

/// Parse marked text back into a [`Document`].
///
/// Text outside of markers becomes opaque blocks, with adjacent lines merged
/// into a single block. Inside a section only the matching close marker ends
/// it, so producer output that happens to contain marker-like lines stays
/// part of the content.
pub fn parse_marked(text: &str) -> DashdocResult<Document> {
	let mut blocks: Vec<Block> = vec![];
	let mut opaque: Option<Vec<&str>> = None;
	let mut pending: Option<PendingSection> = None;

	if text.is_empty() {
		return Ok(Document::new());
	}

	for (index, line) in text.split(BLOCK_DELIMITER).enumerate() {
		let line_number = index + 1;

		if let Some(section) = pending.as_mut() {
			if parse_marker(line) == Some(Marker::Close(section.tag.as_str())) {
				let Some(section) = pending.take() else {
					continue;
				};
				let tag = (!section.tag.is_empty()).then_some(section.tag);
				blocks.push(Block::generated(tag, section.lines.join(BLOCK_DELIMITER)));
			} else {
				section.lines.push(line.to_string());
			}
			continue;
		}

		match parse_marker(line) {
			Some(Marker::Open(tag)) => {
				if let Some(lines) = opaque.take() {
					blocks.push(Block::opaque(lines.join(BLOCK_DELIMITER)));
				}
				pending = Some(PendingSection {
					tag: tag.to_string(),
					line: line_number,
					lines: vec![],
				});
			}
			Some(Marker::Close(tag)) => {
				return Err(DashdocError::UnexpectedClose {
					tag: tag.to_string(),
					line: line_number,
				});
			}
			None => opaque.get_or_insert_with(Vec::new).push(line),
		}
	}

	if let Some(section) = pending {
		return Err(DashdocError::UnclosedSection {
			tag: section.tag,
			line: section.line,
		});
	}

	if let Some(lines) = opaque {
		blocks.push(Block::opaque(lines.join(BLOCK_DELIMITER)));
	}

	Ok(Document::from_blocks(blocks))
}
