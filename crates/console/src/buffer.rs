//! Editor buffer capability.

use std::collections::BTreeSet;

use dbide_primitives::{Range, TextEdit, byte_offset};

/// The editor surface a page drives.
///
/// Implemented by the frontend's editor widget; [`TextBuffer`] is an in-memory
/// implementation.
pub trait EditorBuffer: Send {
	fn get_value(&self) -> String;

	fn set_value(&mut self, text: &str);

	/// Current selection in character offsets.
	fn get_selection(&self) -> Range;

	/// Applies non-overlapping edits given against the current text.
	fn execute_edits(&mut self, edits: &[TextEdit]);

	/// Shows or hides the breakpoint marker on a 1-based line.
	fn set_breakpoint_marker(&mut self, line: u32, enabled: bool);

	/// Removes every breakpoint and execution-line marker.
	fn clear_markers(&mut self);

	/// Moves the execution-line highlight.
	fn highlight_line(&mut self, line: Option<u32>);
}

/// String-backed [`EditorBuffer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
	text: String,
	selection: Range,
	markers: BTreeSet<u32>,
	highlighted: Option<u32>,
}

impl TextBuffer {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			..Self::default()
		}
	}

	pub fn with_selection(mut self, selection: Range) -> Self {
		self.selection = selection;
		self
	}

	pub fn set_selection(&mut self, selection: Range) {
		self.selection = selection;
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn markers(&self) -> &BTreeSet<u32> {
		&self.markers
	}

	pub fn highlighted(&self) -> Option<u32> {
		self.highlighted
	}
}

impl EditorBuffer for TextBuffer {
	fn get_value(&self) -> String {
		self.text.clone()
	}

	fn set_value(&mut self, text: &str) {
		self.text = text.to_owned();
		self.selection = Range::point(0);
	}

	fn get_selection(&self) -> Range {
		self.selection
	}

	fn execute_edits(&mut self, edits: &[TextEdit]) {
		let mut ordered: Vec<&TextEdit> = edits.iter().collect();
		ordered.sort_by_key(|edit| std::cmp::Reverse(edit.range.min()));
		for edit in ordered {
			let start = byte_offset(&self.text, edit.range.min());
			let end = byte_offset(&self.text, edit.range.max());
			self.text.replace_range(start..end, &edit.text);
		}
	}

	fn set_breakpoint_marker(&mut self, line: u32, enabled: bool) {
		if enabled {
			self.markers.insert(line);
		} else {
			self.markers.remove(&line);
		}
	}

	fn clear_markers(&mut self) {
		self.markers.clear();
		self.highlighted = None;
	}

	fn highlight_line(&mut self, line: Option<u32>) {
		self.highlighted = line;
	}
}
