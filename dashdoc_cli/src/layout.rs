use dashdoc_core::DisplayConfig;
use dashdoc_core::DisplayMode;
use dashdoc_core::Document;

/// ANSI sequence clearing the terminal and moving the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const COLUMN_GAP: &str = "  ";

/// A strategy for presenting a regenerated document.
pub trait Layout {
	fn present(&self, document: &Document) -> String;
}

/// Prints the document text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stacked;

impl Layout for Stacked {
	fn present(&self, document: &Document) -> String {
		document.text()
	}
}

/// Clears the terminal before printing, so the dashboard is the only thing
/// on screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyWindow;

impl Layout for OnlyWindow {
	fn present(&self, document: &Document) -> String {
		format!("{CLEAR_SCREEN}{}", document.text())
	}
}

/// Distributes the blocks over `count` side-by-side columns of `width`
/// characters. Blocks fill the columns in order and long lines are
/// truncated.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
	pub count: usize,
	pub width: usize,
}

impl Layout for Columns {
	fn present(&self, document: &Document) -> String {
		let count = self.count.max(1);
		let blocks = document.blocks();
		if blocks.is_empty() {
			return String::new();
		}

		let per_column = blocks.len().div_ceil(count);
		let columns: Vec<Vec<String>> = blocks
			.chunks(per_column)
			.map(|chunk| {
				chunk
					.iter()
					.map(|block| block.content.as_str())
					.collect::<Vec<_>>()
					.join("\n\n")
					.split('\n')
					.map(|line| truncate(line, self.width))
					.collect()
			})
			.collect();

		let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
		let mut output = Vec::with_capacity(rows);

		for row in 0..rows {
			let line = columns
				.iter()
				.map(|column| {
					let cell = column.get(row).map_or("", String::as_str);
					format!("{cell:<width$}", width = self.width)
				})
				.collect::<Vec<_>>()
				.join(COLUMN_GAP);
			output.push(line.trim_end().to_string());
		}

		output.join("\n")
	}
}

fn truncate(line: &str, width: usize) -> String {
	if line.chars().count() <= width {
		return line.to_string();
	}

	let mut truncated: String = line.chars().take(width.saturating_sub(1)).collect();
	truncated.push('…');
	truncated
}

/// Build the layout for a display mode.
pub fn layout_for(mode: DisplayMode, display: &DisplayConfig) -> Box<dyn Layout> {
	match mode {
		DisplayMode::Stacked => Box::new(Stacked),
		DisplayMode::Only => Box::new(OnlyWindow),
		DisplayMode::Columns => {
			Box::new(Columns {
				count: display.columns,
				width: display.column_width,
			})
		}
	}
}
