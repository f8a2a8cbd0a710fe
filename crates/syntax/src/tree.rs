//! Parse tree snapshots.
//!
//! [`ParseTree`] pairs an immutable green tree with the text it was built
//! from. Rowan locates nodes by byte offset; everything public here speaks
//! character offsets, the coordinate space edits use.

use std::ops::Range;
use std::sync::Arc;

use quire_primitives::{Bias, CharIdx, CharLen, Rope};
use rowan::{GreenNode, TextRange, TextSize, TokenAtOffset};

use crate::ast::{Element, Root, is_tag_name};
use crate::kind::{SyntaxNode, SyntaxToken};
use crate::lexer::lex;
use crate::parser::{Parser, SyntaxError};

/// An immutable, cheaply clonable parse of one document revision.
#[derive(Debug, Clone)]
pub struct ParseTree {
	green: GreenNode,
	text: Rope,
	errors: Arc<[SyntaxError]>,
}

impl ParseTree {
	/// Parses `text`. Never fails; problems are collected in [`Self::errors`].
	pub fn parse(text: &str) -> Self {
		Self::build(text, Rope::from_str(text))
	}

	/// Parses the contents of a rope, sharing its storage.
	pub fn from_rope(text: &Rope) -> Self {
		let source = text.to_string();
		Self::build(&source, text.clone())
	}

	fn build(source: &str, text: Rope) -> Self {
		let (green, errors) = Parser::new(source, lex(source)).parse();
		Self {
			green,
			text,
			errors: errors.into(),
		}
	}

	/// A fresh red root. Nodes handed out from it are views, not identities.
	pub fn root(&self) -> SyntaxNode {
		SyntaxNode::new_root(self.green.clone())
	}

	pub fn document(&self) -> Option<Root> {
		Root::cast(self.root())
	}

	pub fn first_element(&self) -> Option<Element> {
		self.document()?.first_element()
	}

	pub fn errors(&self) -> &[SyntaxError] {
		&self.errors
	}

	pub fn text(&self) -> &Rope {
		&self.text
	}

	pub fn len_chars(&self) -> CharLen {
		self.text.len_chars()
	}

	/// Reads `[range.start, range.end)`, clamped to the document.
	pub fn slice(&self, range: Range<CharIdx>) -> String {
		let end = range.end.min(self.len_chars());
		let start = range.start.min(end);
		self.text.slice(start..end).to_string()
	}

	pub fn char_offset(&self, offset: TextSize) -> CharIdx {
		self.text.byte_to_char(usize::from(offset).min(self.text.len_bytes()))
	}

	pub fn text_size(&self, offset: CharIdx) -> TextSize {
		let byte = self.text.char_to_byte(offset.min(self.len_chars()));
		TextSize::from(byte as u32)
	}

	pub fn char_range(&self, range: TextRange) -> Range<CharIdx> {
		self.char_offset(range.start())..self.char_offset(range.end())
	}

	pub fn node_range(&self, node: &SyntaxNode) -> Range<CharIdx> {
		self.char_range(node.text_range())
	}

	pub fn token_range(&self, token: &SyntaxToken) -> Range<CharIdx> {
		self.char_range(token.text_range())
	}

	/// The token touching `offset`. At a boundary between two tokens,
	/// `Bias::Right` picks the one starting there and `Bias::Left` the one
	/// ending there.
	pub fn token_at(&self, offset: CharIdx, bias: Bias) -> Option<SyntaxToken> {
		if offset > self.len_chars() {
			return None;
		}
		match self.root().token_at_offset(self.text_size(offset)) {
			TokenAtOffset::None => None,
			TokenAtOffset::Single(token) => Some(token),
			TokenAtOffset::Between(left, right) => Some(match bias {
				Bias::Left => left,
				Bias::Right => right,
			}),
		}
	}

	/// The tag-name token covering `offset`, trying forward then backward bias.
	pub fn tag_name_token(&self, offset: CharIdx) -> Option<SyntaxToken> {
		[Bias::Right, Bias::Left]
			.into_iter()
			.filter_map(|bias| self.token_at(offset, bias))
			.find(is_tag_name)
	}
}
