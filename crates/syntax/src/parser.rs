//! Resilient tree builder.
//!
//! Consumes the token stream in one pass with an explicit stack of open
//! elements, so nesting depth never grows the call stack. Every token lands in
//! the tree; malformed constructs are wrapped in `Error` nodes and reported as
//! [`SyntaxError`]s.

use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

use crate::kind::SyntaxKind::{self, *};
use crate::lexer::{Token, token_text};

/// A recoverable syntax problem, located by byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
	pub message: String,
	pub span: TextRange,
}

/// How a tag starting with `<` ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagEnd {
	Open,
	Empty,
	Unterminated,
}

struct OpenElement {
	name: String,
	span: TextRange,
}

pub(crate) struct Parser<'s> {
	source: &'s str,
	tokens: Vec<Token>,
	pos: usize,
	builder: GreenNodeBuilder<'static>,
	errors: Vec<SyntaxError>,
	open: Vec<OpenElement>,
}

impl<'s> Parser<'s> {
	pub(crate) fn new(source: &'s str, tokens: Vec<Token>) -> Self {
		Self {
			source,
			tokens,
			pos: 0,
			builder: GreenNodeBuilder::new(),
			errors: Vec::new(),
			open: Vec::new(),
		}
	}

	pub(crate) fn parse(mut self) -> (GreenNode, Vec<SyntaxError>) {
		self.builder.start_node(Document.into());
		while let Some(token) = self.current() {
			match token.kind {
				LAngle => self.start_tag(),
				LAngleSlash => self.end_tag(),
				Text | Comment | ProcessingInstruction | Cdata | Doctype => self.bump(),
				_ => self.error_token("unexpected character data"),
			}
		}
		while let Some(element) = self.open.pop() {
			self.error(format!("element <{}> is never closed", element.name), element.span);
			self.builder.finish_node();
		}
		self.builder.finish_node();
		(self.builder.finish(), self.errors)
	}

	fn current(&self) -> Option<Token> {
		self.tokens.get(self.pos).copied()
	}

	fn nth(&self, n: usize) -> Option<Token> {
		self.tokens.get(self.pos + n).copied()
	}

	fn at(&self, kind: SyntaxKind) -> bool {
		self.current().is_some_and(|t| t.kind == kind)
	}

	fn bump(&mut self) {
		let Some(token) = self.current() else {
			return;
		};
		self.builder.token(token.kind.into(), token_text(self.source, &token));
		self.pos += 1;
	}

	fn error(&mut self, message: String, span: TextRange) {
		self.errors.push(SyntaxError { message, span });
	}

	/// Wraps the current token in an `Error` node.
	fn error_token(&mut self, message: &str) {
		let Some(token) = self.current() else {
			return;
		};
		self.error(message.to_owned(), token.span);
		self.builder.start_node(Error.into());
		self.bump();
		self.builder.finish_node();
	}

	fn eof_offset(&self) -> TextSize {
		TextSize::of(self.source)
	}

	/// Looks past the `<` to find the token that closes the tag.
	fn classify_tag(&self) -> TagEnd {
		let mut n = 1;
		while let Some(token) = self.nth(n) {
			match token.kind {
				RAngle => return TagEnd::Open,
				SlashRAngle => return TagEnd::Empty,
				Name | Whitespace | Eq | AttrValue | Slash | Garbage => n += 1,
				_ => break,
			}
		}
		TagEnd::Unterminated
	}

	fn tag_name(&self, n: usize) -> Option<(String, TextRange)> {
		let token = self.nth(n).filter(|t| t.kind == Name)?;
		Some((token_text(self.source, &token).to_owned(), token.span))
	}

	fn start_tag(&mut self) {
		let start = self.current().map_or(self.eof_offset(), |t| t.span.start());
		let end = self.classify_tag();
		let name = self.tag_name(1);

		self.builder.start_node(Element.into());
		self.builder.start_node(if end == TagEnd::Empty { EmptyTag } else { StartTag }.into());
		self.bump();
		if name.is_some() {
			self.bump();
		} else {
			self.error("expected a tag name".to_owned(), TextRange::empty(start));
		}
		self.tag_body();
		self.builder.finish_node();

		if end == TagEnd::Empty {
			self.builder.finish_node();
			return;
		}
		let end_offset = self.tokens.get(self.pos.saturating_sub(1)).map_or(start, |t| t.span.end());
		self.open.push(OpenElement {
			name: name.map(|(name, _)| name).unwrap_or_default(),
			span: TextRange::new(start, end_offset),
		});
	}

	/// Attributes and the closing delimiter of a start or empty tag.
	fn tag_body(&mut self) {
		loop {
			let Some(token) = self.current() else {
				break;
			};
			match token.kind {
				Whitespace => self.bump(),
				Name => self.attribute(),
				RAngle | SlashRAngle => {
					self.bump();
					return;
				}
				Eq | AttrValue | Slash | Garbage => self.error_token("unexpected token in tag"),
				_ => break,
			}
		}
		let at = self.current().map_or(self.eof_offset(), |t| t.span.start());
		self.error("unterminated tag".to_owned(), TextRange::empty(at));
	}

	fn attribute(&mut self) {
		self.builder.start_node(Attribute.into());
		self.bump();
		if self.at(Whitespace) && self.nth(1).is_some_and(|t| t.kind == Eq) {
			self.bump();
		}
		if self.at(Eq) {
			self.bump();
			if self.at(Whitespace) {
				self.bump();
			}
			if self.at(AttrValue) {
				self.bump();
			} else {
				let at = self.current().map_or(self.eof_offset(), |t| t.span.start());
				self.error("expected an attribute value".to_owned(), TextRange::empty(at));
			}
		}
		self.builder.finish_node();
	}

	fn end_tag(&mut self) {
		let start = self.current().map_or(self.eof_offset(), |t| t.span.start());
		let name = self.tag_name(1);
		let matched = name
			.as_ref()
			.and_then(|(name, _)| self.open.iter().rposition(|open| open.name == *name));

		let Some(depth) = matched else {
			let label = name.map_or_else(String::new, |(name, _)| name);
			self.error(format!("unexpected closing tag </{label}>"), TextRange::empty(start));
			self.builder.start_node(Error.into());
			self.end_tag_tokens();
			self.builder.finish_node();
			return;
		};

		while self.open.len() > depth + 1 {
			if let Some(element) = self.open.pop() {
				self.error(format!("element <{}> is never closed", element.name), element.span);
			}
			self.builder.finish_node();
		}
		self.builder.start_node(EndTag.into());
		self.end_tag_tokens();
		self.builder.finish_node();
		self.open.pop();
		self.builder.finish_node();
	}

	fn end_tag_tokens(&mut self) {
		self.bump();
		if self.at(Name) {
			self.bump();
		}
		loop {
			let Some(token) = self.current() else {
				break;
			};
			match token.kind {
				Whitespace => self.bump(),
				RAngle => {
					self.bump();
					return;
				}
				Name | Eq | AttrValue | Slash | Garbage | SlashRAngle => {
					self.error_token("unexpected token in closing tag")
				}
				_ => break,
			}
		}
		let at = self.current().map_or(self.eof_offset(), |t| t.span.start());
		self.error("unterminated tag".to_owned(), TextRange::empty(at));
	}
}
