use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DashdocError {
	#[error(transparent)]
	#[diagnostic(code(dashdoc::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(dashdoc::config_parse),
		help("check that dashdoc.toml is valid TOML and every [[sections]] entry sets exactly one of `text`, `path`, `command` or `files`")
	)]
	ConfigParse(String),

	#[error("no dashdoc config found in `{0}`")]
	#[diagnostic(
		code(dashdoc::missing_config),
		help("run `dashdoc init` to create a dashdoc.toml")
	)]
	MissingConfig(String),

	#[error("duplicate section tag: `{tag}`")]
	#[diagnostic(
		code(dashdoc::duplicate_tag),
		help("each tagged section must use a unique tag; rename or remove one of them")
	)]
	DuplicateTag { tag: String },

	#[error("invalid section tag: `{0}`")]
	#[diagnostic(
		code(dashdoc::invalid_tag),
		help("tags must be non-empty and cannot contain whitespace, `{{`, `}}` or `/`")
	)]
	InvalidTag(String),

	#[error("section producer `{producer}` failed: {reason}")]
	#[diagnostic(code(dashdoc::producer_failed))]
	ProducerFailed { producer: String, reason: String },

	#[error("failed to access document `{path}`: {reason}")]
	#[diagnostic(code(dashdoc::host_io))]
	HostIo { path: String, reason: String },

	#[error("missing closing marker for section `{tag}` opened on line {line}")]
	#[diagnostic(
		code(dashdoc::unclosed_section),
		help("add `<!-- {{/{tag}}} -->` after the section content")
	)]
	UnclosedSection { tag: String, line: usize },

	#[error("closing marker for section `{tag}` on line {line} has no matching opening marker")]
	#[diagnostic(code(dashdoc::unexpected_close))]
	UnexpectedClose { tag: String, line: usize },
}

pub type DashdocResult<T> = Result<T, DashdocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
