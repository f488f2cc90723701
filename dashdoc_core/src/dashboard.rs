use std::path::Path;
use std::path::PathBuf;

use crate::DashdocConfig;
use crate::DashdocError;
use crate::DashdocResult;
use crate::Document;
use crate::FileHost;
use crate::RegenerationReport;
use crate::SectionRegistry;
use crate::parser::parse_marked;
use crate::parser::render_marked;
use crate::prune_unregistered;
use crate::regenerate;

/// Options controlling a refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOptions {
	/// Compute the new dashboard without writing it.
	pub dry_run: bool,
	/// Remove generated sections whose tag is no longer configured.
	pub prune: bool,
}

/// Result of refreshing a dashboard.
#[derive(Debug)]
pub struct RefreshResult {
	/// Per-section outcomes of the regeneration pass.
	pub report: RegenerationReport,
	/// Absolute path of the dashboard file.
	pub path: PathBuf,
	/// The file text before the refresh (empty when the file did not exist).
	pub previous: String,
	/// The file text after the refresh.
	pub rendered: String,
	/// The regenerated document.
	pub document: Document,
	/// Tags removed by pruning.
	pub pruned: Vec<String>,
	/// Whether the file was created by this refresh.
	pub created: bool,
	/// Whether the new text was written to disk.
	pub written: bool,
}

impl RefreshResult {
	/// Returns true when the refresh changes the dashboard file.
	pub fn changed(&self) -> bool {
		self.created || self.previous != self.rendered
	}
}

/// A loaded dashboard project: its root, config and section registry.
#[derive(Debug)]
pub struct Dashboard {
	root: PathBuf,
	config: DashdocConfig,
	registry: SectionRegistry,
}

impl Dashboard {
	/// Load the config found at `root` and build the section registry.
	/// Configuration errors such as duplicate tags are reported here, before
	/// any section is generated.
	pub fn load(root: &Path) -> DashdocResult<Self> {
		let Some(config) = DashdocConfig::load(root)? else {
			return Err(DashdocError::MissingConfig(root.display().to_string()));
		};

		Self::from_config(root, config)
	}

	pub fn from_config(root: &Path, config: DashdocConfig) -> DashdocResult<Self> {
		let registry = config.build_registry(root)?;

		Ok(Self {
			root: root.to_path_buf(),
			config,
			registry,
		})
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn config(&self) -> &DashdocConfig {
		&self.config
	}

	pub fn registry(&self) -> &SectionRegistry {
		&self.registry
	}

	pub fn output_path(&self) -> PathBuf {
		self.config.output_path(&self.root)
	}

	/// Read and parse the current dashboard file.
	pub fn document(&self) -> DashdocResult<Document> {
		FileHost::new(self.output_path()).read_document()
	}

	/// Regenerate every section and, unless `dry_run` is set, write the
	/// dashboard file. A missing file is created and seeded with the header.
	pub fn refresh(&self, options: RefreshOptions) -> DashdocResult<RefreshResult> {
		let host = FileHost::new(self.output_path());
		let created = !host.exists();
		let previous = host.read_text()?;

		let mut document = if created {
			match self.config.header_text(&self.root)? {
				Some(header) => Document::with_header(header),
				None => Document::new(),
			}
		} else {
			parse_marked(&previous)?
		};

		let pruned = if options.prune {
			prune_unregistered(&mut document, &self.registry)
		} else {
			Vec::new()
		};

		let report = regenerate(&mut document, &self.registry);
		let rendered = render_marked(&document);

		let mut result = RefreshResult {
			report,
			path: host.path().to_path_buf(),
			previous,
			rendered,
			document,
			pruned,
			created,
			written: false,
		};

		if !options.dry_run && result.changed() {
			host.write_text(&result.rendered)?;
			result.written = true;
		}

		tracing::debug!(
			path = %result.path.display(),
			changed = result.changed(),
			written = result.written,
			"refreshed dashboard"
		);

		Ok(result)
	}

	/// Compute a refresh without writing anything.
	pub fn check(&self) -> DashdocResult<RefreshResult> {
		self.refresh(RefreshOptions {
			dry_run: true,
			prune: false,
		})
	}
}
