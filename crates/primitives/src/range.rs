/// Character index into an editor buffer. Never a byte offset.
pub type CharIdx = usize;

/// Span of buffer text between two character positions.
///
/// `anchor` stays put while a selection grows; `head` is where the caret sits.
/// Either may be the larger of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
	pub anchor: CharIdx,
	pub head: CharIdx,
}

impl Range {
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	/// Caret with no selected text.
	pub fn point(at: CharIdx) -> Self {
		Self { anchor: at, head: at }
	}

	/// Start of the span regardless of direction.
	#[inline]
	pub fn min(&self) -> CharIdx {
		self.anchor.min(self.head)
	}

	/// End of the span regardless of direction.
	#[inline]
	pub fn max(&self) -> CharIdx {
		self.anchor.max(self.head)
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// Text covered in `text`; positions past the end stop at the end.
	pub fn slice<'a>(&self, text: &'a str) -> &'a str {
		let (from, to) = (byte_offset(text, self.min()), byte_offset(text, self.max()));
		&text[from..to]
	}
}

/// Replaces the text under `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
	pub range: Range,
	pub text: String,
}

impl TextEdit {
	pub fn new(range: Range, text: impl Into<String>) -> Self {
		Self {
			range,
			text: text.into(),
		}
	}
}

/// Converts a character index to a byte offset, saturating at `text.len()`.
pub fn byte_offset(text: &str, idx: CharIdx) -> usize {
	match text.char_indices().nth(idx) {
		Some((byte, _)) => byte,
		None => text.len(),
	}
}
