//! Two-mode lexer for XML text.
//!
//! Markup outside tags (character data, comments, processing instructions,
//! CDATA sections, doctype declarations) is lexed in content mode; everything
//! between `<` and `>` is lexed in tag mode. The lexer morphs between the two
//! on tag delimiters and never fails: characters it cannot classify are
//! coalesced into single `Garbage` tokens.

use std::ops::Range;

use logos::{Lexer, Logos};
use rowan::TextRange;

use crate::kind::SyntaxKind;

/// Span-based token: kind plus byte range into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
	pub kind: SyntaxKind,
	pub span: TextRange,
}

impl Token {
	#[inline]
	pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
		Self { kind, span }
	}
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ContentToken {
	#[token("<")]
	LAngle,
	#[token("</")]
	LAngleSlash,
	#[token("<!--", |lex| bump_past(lex, "-->"))]
	Comment,
	#[token("<?", |lex| bump_past(lex, "?>"))]
	ProcessingInstruction,
	#[token("<![CDATA[", |lex| bump_past(lex, "]]>"))]
	Cdata,
	#[token("<!DOCTYPE", bump_doctype)]
	Doctype,
	#[regex(r"[^<]+", allow_greedy = true)]
	Text,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum TagToken {
	#[regex(r#"[^\s<>/="'?!]+"#, allow_greedy = true)]
	Name,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	#[token("=")]
	Eq,
	#[regex(r#""[^"<]*""#)]
	#[regex(r"'[^'<]*'")]
	AttrValue,
	#[token(">")]
	RAngle,
	#[token("/>")]
	SlashRAngle,
	#[token("/")]
	Slash,
}

impl From<ContentToken> for SyntaxKind {
	fn from(token: ContentToken) -> Self {
		match token {
			ContentToken::LAngle => SyntaxKind::LAngle,
			ContentToken::LAngleSlash => SyntaxKind::LAngleSlash,
			ContentToken::Comment => SyntaxKind::Comment,
			ContentToken::ProcessingInstruction => SyntaxKind::ProcessingInstruction,
			ContentToken::Cdata => SyntaxKind::Cdata,
			ContentToken::Doctype => SyntaxKind::Doctype,
			ContentToken::Text => SyntaxKind::Text,
		}
	}
}

impl From<TagToken> for SyntaxKind {
	fn from(token: TagToken) -> Self {
		match token {
			TagToken::Name => SyntaxKind::Name,
			TagToken::Whitespace => SyntaxKind::Whitespace,
			TagToken::Eq => SyntaxKind::Eq,
			TagToken::AttrValue => SyntaxKind::AttrValue,
			TagToken::RAngle => SyntaxKind::RAngle,
			TagToken::SlashRAngle => SyntaxKind::SlashRAngle,
			TagToken::Slash => SyntaxKind::Slash,
		}
	}
}

/// Extends the current token past `terminator`, or to end of input when the
/// construct is unterminated.
fn bump_past(lex: &mut Lexer<'_, ContentToken>, terminator: &str) {
	let rest = lex.remainder();
	let n = rest.find(terminator).map_or(rest.len(), |at| at + terminator.len());
	lex.bump(n);
}

/// Doctype declarations may carry an internal subset in brackets, whose
/// markup declarations contain `>` of their own.
fn bump_doctype(lex: &mut Lexer<'_, ContentToken>) {
	let rest = lex.remainder();
	let mut depth = 0usize;
	let mut quote = None;
	for (at, ch) in rest.char_indices() {
		match (quote, ch) {
			(Some(q), c) if c == q => quote = None,
			(Some(_), _) => {}
			(None, '"' | '\'') => quote = Some(ch),
			(None, '[') => depth += 1,
			(None, ']') => depth = depth.saturating_sub(1),
			(None, '>') if depth == 0 => {
				lex.bump(at + 1);
				return;
			}
			_ => {}
		}
	}
	lex.bump(rest.len());
}

fn text_range(range: Range<usize>) -> TextRange {
	TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

enum Mode<'s> {
	Content(Lexer<'s, ContentToken>),
	Tag(Lexer<'s, TagToken>),
}

/// Accumulates tokens and coalesces runs of unrecognized input.
struct Sink {
	tokens: Vec<Token>,
	error_start: Option<usize>,
}

impl Sink {
	fn push(&mut self, kind: SyntaxKind, span: Range<usize>) {
		self.flush_garbage(span.start);
		self.tokens.push(Token::new(kind, text_range(span)));
	}

	fn error(&mut self, start: usize) {
		self.error_start.get_or_insert(start);
	}

	fn flush_garbage(&mut self, end: usize) {
		if let Some(start) = self.error_start.take() {
			self.tokens.push(Token::new(SyntaxKind::Garbage, text_range(start..end)));
		}
	}
}

/// Tokenizes `source` into span-based tokens covering every byte.
pub fn lex(source: &str) -> Vec<Token> {
	let mut sink = Sink {
		tokens: Vec::new(),
		error_start: None,
	};
	let mut mode = Mode::Content(ContentToken::lexer(source));

	loop {
		mode = match mode {
			Mode::Content(mut lexer) => match lexer.next() {
				None => break,
				Some(Ok(token)) => {
					sink.push(token.into(), lexer.span());
					match token {
						ContentToken::LAngle | ContentToken::LAngleSlash => Mode::Tag(lexer.morph()),
						_ => Mode::Content(lexer),
					}
				}
				Some(Err(())) => {
					sink.error(lexer.span().start);
					Mode::Content(lexer)
				}
			},
			Mode::Tag(mut lexer) => {
				// An unterminated tag ends where the next one begins.
				if lexer.remainder().starts_with('<') {
					Mode::Content(lexer.morph())
				} else {
					match lexer.next() {
						None => break,
						Some(Ok(token)) => {
							sink.push(token.into(), lexer.span());
							match token {
								TagToken::RAngle | TagToken::SlashRAngle => Mode::Content(lexer.morph()),
								_ => Mode::Tag(lexer),
							}
						}
						Some(Err(())) => {
							sink.error(lexer.span().start);
							Mode::Tag(lexer)
						}
					}
				}
			}
		};
	}

	sink.flush_garbage(source.len());
	sink.tokens
}

/// Retrieves the text slice for a token.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
	&source[Range::<usize>::from(token.span)]
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::kind::SyntaxKind::*;

	fn kinds(source: &str) -> Vec<(SyntaxKind, &str)> {
		lex(source).iter().map(|t| (t.kind, token_text(source, t))).collect()
	}

	#[test]
	fn test_element_with_attribute() {
		assert_eq!(
			kinds(r#"<a href="x">t</a>"#),
			vec![
				(LAngle, "<"),
				(Name, "a"),
				(Whitespace, " "),
				(Name, "href"),
				(Eq, "="),
				(AttrValue, "\"x\""),
				(RAngle, ">"),
				(Text, "t"),
				(LAngleSlash, "</"),
				(Name, "a"),
				(RAngle, ">"),
			]
		);
	}

	#[test]
	fn test_empty_tag() {
		assert_eq!(kinds("<br/>"), vec![(LAngle, "<"), (Name, "br"), (SlashRAngle, "/>")]);
	}

	#[test]
	fn test_prolog_constructs() {
		let source = "<?xml version=\"1.0\"?><!DOCTYPE r [<!ENTITY e \"v\">]><!-- c --><r/>";
		assert_eq!(
			kinds(source),
			vec![
				(ProcessingInstruction, "<?xml version=\"1.0\"?>"),
				(Doctype, "<!DOCTYPE r [<!ENTITY e \"v\">]>"),
				(Comment, "<!-- c -->"),
				(LAngle, "<"),
				(Name, "r"),
				(SlashRAngle, "/>"),
			]
		);
	}

	#[test]
	fn test_cdata_keeps_markup() {
		assert_eq!(kinds("<![CDATA[<a>]]>"), vec![(Cdata, "<![CDATA[<a>]]>")]);
	}

	#[test]
	fn test_unterminated_comment_runs_to_end() {
		assert_eq!(kinds("<!-- open <a>"), vec![(Comment, "<!-- open <a>")]);
	}

	#[test]
	fn test_unterminated_tag_yields_to_next_tag() {
		assert_eq!(
			kinds("<a<b>"),
			vec![(LAngle, "<"), (Name, "a"), (LAngle, "<"), (Name, "b"), (RAngle, ">")]
		);
	}

	#[test]
	fn test_garbage_is_coalesced() {
		assert_eq!(
			kinds("<a ?!?>"),
			vec![(LAngle, "<"), (Name, "a"), (Whitespace, " "), (Garbage, "?!?"), (RAngle, ">")]
		);
	}

	#[test]
	fn test_tokens_cover_source() {
		let source = "<root>\n  <é x='1'/>tail &amp; more</root>";
		let total: usize = lex(source).iter().map(|t| usize::from(t.span.len())).sum();
		assert_eq!(total, source.len());
	}
}
