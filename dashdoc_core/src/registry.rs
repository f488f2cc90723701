use std::fmt;

use derive_more::Deref;

use crate::DashdocError;
use crate::DashdocResult;
use crate::parser::is_valid_tag;

/// A zero-argument function yielding the text of one section.
///
/// Producers may block (reading files, running commands) and may fail. A
/// failure is contained to the producer's own section during regeneration.
pub trait Producer {
	/// Identity of the producer, embedded in error markers when it fails.
	fn name(&self) -> String;

	/// Generate the section content.
	fn produce(&self) -> DashdocResult<String>;

	/// Short description of the kind of producer, used when listing sections.
	fn kind(&self) -> &'static str {
		"custom"
	}
}

/// A [`Producer`] backed by a closure.
pub struct FnProducer<F> {
	name: String,
	produce: F,
}

impl<F> Producer for FnProducer<F>
where
	F: Fn() -> DashdocResult<String>,
{
	fn name(&self) -> String {
		self.name.clone()
	}

	fn produce(&self) -> DashdocResult<String> {
		(self.produce)()
	}

	fn kind(&self) -> &'static str {
		"function"
	}
}

/// Wrap a named closure as a [`Producer`].
pub fn producer_fn<F>(name: impl Into<String>, produce: F) -> FnProducer<F>
where
	F: Fn() -> DashdocResult<String>,
{
	FnProducer {
		name: name.into(),
		produce,
	}
}

/// A registered section: an optional tag and the producer of its content.
pub struct SectionSpec {
	/// Tag used to find the section again on later passes.
	pub tag: Option<String>,
	/// Producer of the section content.
	pub producer: Box<dyn Producer>,
}

impl fmt::Debug for SectionSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SectionSpec")
			.field("tag", &self.tag)
			.field("producer", &self.producer.name())
			.finish()
	}
}

/// The ordered list of section specifications. Registration order is the
/// rendering order.
///
/// Dereferences to the slice of registered specs; there is no mutable access
/// so tag uniqueness is enforced by [`SectionRegistry::register`].
#[derive(Debug, Default, Deref)]
pub struct SectionRegistry {
	#[deref]
	specs: Vec<SectionSpec>,
}

impl SectionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a section. Fails with [`DashdocError::DuplicateTag`] when another
	/// section already uses `tag`, and with [`DashdocError::InvalidTag`] when
	/// the tag cannot be written as a section marker.
	pub fn register(
		&mut self,
		tag: Option<&str>,
		producer: impl Producer + 'static,
	) -> DashdocResult<()> {
		self.register_boxed(tag, Box::new(producer))
	}

	pub fn register_boxed(
		&mut self,
		tag: Option<&str>,
		producer: Box<dyn Producer>,
	) -> DashdocResult<()> {
		if let Some(tag) = tag {
			if !is_valid_tag(tag) {
				return Err(DashdocError::InvalidTag(tag.to_string()));
			}

			if self.contains_tag(tag) {
				return Err(DashdocError::DuplicateTag {
					tag: tag.to_string(),
				});
			}
		}

		tracing::debug!(tag = ?tag, producer = %producer.name(), "registered section");
		self.specs.push(SectionSpec {
			tag: tag.map(ToString::to_string),
			producer,
		});

		Ok(())
	}

	/// The registered sections in rendering order.
	pub fn list(&self) -> &[SectionSpec] {
		&self.specs
	}

	pub fn contains_tag(&self, tag: &str) -> bool {
		self.specs.iter().any(|spec| spec.tag.as_deref() == Some(tag))
	}

	/// All non-null tags in registration order.
	pub fn tags(&self) -> Vec<&str> {
		self.specs
			.iter()
			.filter_map(|spec| spec.tag.as_deref())
			.collect()
	}
}
