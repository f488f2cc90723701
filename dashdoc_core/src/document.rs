use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// The delimiter placed between consecutive blocks when a [`Document`] is
/// rendered to text.
pub const BLOCK_DELIMITER: &str = "\n";

/// Where a [`Block`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockOrigin {
	/// Surrounding content such as a header. Regeneration never touches it.
	Opaque,
	/// Content written by a regeneration pass.
	Generated,
}

/// A contiguous, optionally tagged unit of document text.
///
/// Only [`BlockOrigin::Generated`] blocks with a tag can be located and
/// replaced by a later regeneration pass. A block without a tag is never
/// matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
	/// The tag used to find this block again on the next pass.
	pub tag: Option<String>,
	/// The text of the block, without the trailing delimiter.
	pub content: String,
	/// Whether the block is surrounding content or generated output.
	pub origin: BlockOrigin,
}

impl Block {
	/// Create an opaque block that regeneration leaves in place.
	pub fn opaque(content: impl Into<String>) -> Self {
		Self {
			tag: None,
			content: content.into(),
			origin: BlockOrigin::Opaque,
		}
	}

	/// Create a generated block, optionally carrying a tag.
	pub fn generated(tag: Option<String>, content: impl Into<String>) -> Self {
		Self {
			tag,
			content: content.into(),
			origin: BlockOrigin::Generated,
		}
	}

	pub fn is_generated(&self) -> bool {
		self.origin == BlockOrigin::Generated
	}

	/// Returns `true` when this block can be located by `tag`.
	pub fn has_tag(&self, tag: &str) -> bool {
		self.is_generated() && self.tag.as_deref() == Some(tag)
	}
}

/// The location of a block inside the rendered text of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSpan {
	/// Index of the block in [`Document::blocks`].
	pub index: usize,
	/// The tag of the block, if any.
	pub tag: Option<String>,
	/// Byte range `[start, end)` of the block content in [`Document::text`].
	pub range: Range<usize>,
}

/// An ordered sequence of [`Block`]s whose contents joined with
/// [`BLOCK_DELIMITER`] make up the full document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	blocks: Vec<Block>,
}

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a document seeded with an opaque header block.
	pub fn with_header(header: impl Into<String>) -> Self {
		Self {
			blocks: vec![Block::opaque(header)],
		}
	}

	pub fn from_blocks(blocks: Vec<Block>) -> Self {
		Self { blocks }
	}

	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	pub fn into_blocks(self) -> Vec<Block> {
		self.blocks
	}

	/// Replace every block at once. Used to commit the result of a pass.
	pub(crate) fn set_blocks(&mut self, blocks: Vec<Block>) {
		self.blocks = blocks;
	}

	/// Append a block at the write cursor.
	pub fn push(&mut self, block: Block) {
		self.blocks.push(block);
	}

	/// Remove and return the block at `index`.
	///
	/// # Panics
	///
	/// Panics if `index` is out of bounds.
	pub fn remove(&mut self, index: usize) -> Block {
		self.blocks.remove(index)
	}

	/// Find the first generated block carrying `tag`, scanning from the start.
	pub fn find_tagged(&self, tag: &str) -> Option<usize> {
		find_tagged(&self.blocks, tag)
	}

	/// Tags of all generated blocks, in document order.
	pub fn tags(&self) -> Vec<&str> {
		self.blocks
			.iter()
			.filter(|block| block.is_generated())
			.filter_map(|block| block.tag.as_deref())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	/// The full document text: block contents joined with
	/// [`BLOCK_DELIMITER`].
	pub fn text(&self) -> String {
		self.blocks
			.iter()
			.map(|block| block.content.as_str())
			.collect::<Vec<_>>()
			.join(BLOCK_DELIMITER)
	}

	/// Byte ranges of every block in [`Document::text`], in block order.
	pub fn spans(&self) -> Vec<BlockSpan> {
		let mut spans = Vec::with_capacity(self.blocks.len());
		let mut offset = 0;

		for (index, block) in self.blocks.iter().enumerate() {
			if index > 0 {
				offset += BLOCK_DELIMITER.len();
			}
			let end = offset + block.content.len();
			spans.push(BlockSpan {
				index,
				tag: block.tag.clone(),
				range: offset..end,
			});
			offset = end;
		}

		spans
	}

	/// The byte offset where the next appended block starts being written,
	/// i.e. the end of the document text.
	pub fn write_cursor(&self) -> usize {
		self.spans().last().map_or(0, |span| span.range.end)
	}
}

pub(crate) fn find_tagged(blocks: &[Block], tag: &str) -> Option<usize> {
	blocks.iter().position(|block| block.has_tag(tag))
}
