use serde::Serialize;

use crate::Block;
use crate::DashdocError;
use crate::Document;
use crate::SectionRegistry;
use crate::SectionSpec;
use crate::document::find_tagged;
use crate::parser::close_marker;
use crate::parser::closes_section;

/// Prefix of the content written in place of a failed producer's output.
pub const ERROR_MARKER_PREFIX: &str = "[dashdoc] section producer";

/// What happened to one section during a regeneration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SectionStatus {
	/// An existing block with the section's tag was removed and the fresh
	/// content appended.
	Replaced,
	/// No existing block matched, so the content was appended as a new block.
	Inserted,
	/// The producer failed and an error marker block was appended instead.
	Failed { message: String },
}

/// The outcome of one section of a regeneration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionOutcome {
	/// The section's tag, if any.
	pub tag: Option<String>,
	/// The name of the producer that generated the section.
	pub producer: String,
	#[serde(flatten)]
	pub status: SectionStatus,
	/// Whether the appended block carries the tag. Empty content is never
	/// tagged.
	pub marked: bool,
}

impl SectionOutcome {
	pub fn is_failed(&self) -> bool {
		matches!(self.status, SectionStatus::Failed { .. })
	}
}

/// Summary of a regeneration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegenerationReport {
	/// One outcome per registered section, in registry order.
	pub sections: Vec<SectionOutcome>,
}

impl RegenerationReport {
	/// Returns true if every producer succeeded.
	pub fn is_ok(&self) -> bool {
		self.failures().next().is_none()
	}

	/// Sections whose producer failed.
	pub fn failures(&self) -> impl Iterator<Item = &SectionOutcome> {
		self.sections.iter().filter(|outcome| outcome.is_failed())
	}

	pub fn replaced_count(&self) -> usize {
		self.count(|status| matches!(status, SectionStatus::Replaced))
	}

	pub fn inserted_count(&self) -> usize {
		self.count(|status| matches!(status, SectionStatus::Inserted))
	}

	fn count(&self, predicate: impl Fn(&SectionStatus) -> bool) -> usize {
		self.sections
			.iter()
			.filter(|outcome| predicate(&outcome.status))
			.count()
	}
}

/// Build the content written in place of a failed producer's output.
pub fn error_marker(producer: &str, detail: &str) -> String {
	format!("{ERROR_MARKER_PREFIX} `{producer}` failed: {detail}")
}

/// Run one regeneration pass over `document`.
///
/// Untagged generated blocks from the previous pass are dropped up front
/// since they can never be located again. Then, for each section in registry
/// order, the first generated block carrying the section's tag is removed,
/// the producer is invoked and its output appended at the end of the
/// document. A failing producer yields an error marker block and does not
/// stop the pass. Opaque blocks are never moved or modified.
///
/// The pass works on a copy of the blocks and commits it in one step.
pub fn regenerate(document: &mut Document, registry: &SectionRegistry) -> RegenerationReport {
	let mut blocks: Vec<Block> = document
		.blocks()
		.iter()
		.filter(|block| !(block.is_generated() && block.tag.is_none()))
		.cloned()
		.collect();
	let mut report = RegenerationReport::default();

	for spec in registry.list() {
		let outcome = regenerate_section(&mut blocks, spec);
		report.sections.push(outcome);
	}

	document.set_blocks(blocks);

	tracing::info!(
		sections = report.sections.len(),
		replaced = report.replaced_count(),
		inserted = report.inserted_count(),
		failed = report.failures().count(),
		"regeneration pass complete"
	);

	report
}

fn regenerate_section(blocks: &mut Vec<Block>, spec: &SectionSpec) -> SectionOutcome {
	let producer = spec.producer.name();
	let tag = spec.tag.as_deref();

	let existing = tag.and_then(|tag| find_tagged(blocks, tag));
	if let Some(index) = existing {
		blocks.remove(index);
	}

	let produced = spec.producer.produce().and_then(|content| {
		if closes_section(&content, tag) {
			Err(DashdocError::ProducerFailed {
				producer: producer.clone(),
				reason: stray_close_reason(tag),
			})
		} else {
			Ok(content)
		}
	});

	let (content, failure) = match produced {
		Ok(content) => (content, None),
		Err(error) => {
			let detail = match error {
				DashdocError::ProducerFailed { reason, .. } => reason,
				other => other.to_string(),
			};
			// The marker must stay inside its section too.
			let detail = if closes_section(&detail, tag) {
				stray_close_reason(tag)
			} else {
				detail
			};
			tracing::warn!(tag = ?tag, producer = %producer, error = %detail, "section producer failed");
			(error_marker(&producer, &detail), Some(detail))
		}
	};

	let marked = tag.is_some() && !content.is_empty();
	let block_tag = if marked { spec.tag.clone() } else { None };
	blocks.push(Block::generated(block_tag, content));

	let status = match failure {
		Some(message) => SectionStatus::Failed { message },
		None if existing.is_some() => SectionStatus::Replaced,
		None => SectionStatus::Inserted,
	};

	tracing::debug!(tag = ?tag, producer = %producer, ?status, marked, "regenerated section");

	SectionOutcome {
		tag: spec.tag.clone(),
		producer,
		status,
		marked,
	}
}

fn stray_close_reason(tag: Option<&str>) -> String {
	format!(
		"output contains the section's own close marker `{}`",
		close_marker(tag)
	)
}

/// Remove tagged generated blocks whose tag is no longer registered.
/// Returns the removed tags in document order.
pub fn prune_unregistered(document: &mut Document, registry: &SectionRegistry) -> Vec<String> {
	let mut pruned = Vec::new();
	let blocks = document
		.blocks()
		.iter()
		.filter(|block| {
			match block.tag.as_deref() {
				Some(tag) if block.is_generated() && !registry.contains_tag(tag) => {
					pruned.push(tag.to_string());
					false
				}
				_ => true,
			}
		})
		.cloned()
		.collect();

	document.set_blocks(blocks);

	if !pruned.is_empty() {
		tracing::info!(?pruned, "pruned unregistered sections");
	}

	pruned
}
