//! Syntax kinds for the XML parse tree.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node kinds
//! (from the parser). `XmlLang` implements Rowan's `Language` trait.

use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then the `__Last` sentinel.
/// `#[repr(u16)]` enables the bounds-checked conversion in `kind_from_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
	/// `<`
	LAngle = 0,
	/// `</`
	LAngleSlash,
	/// `>`
	RAngle,
	/// `/>`
	SlashRAngle,
	/// `=` between an attribute name and its value.
	Eq,
	/// Stray `/` inside a tag.
	Slash,
	/// Tag or attribute name.
	Name,
	/// Quoted attribute value, quotes included.
	AttrValue,
	/// Whitespace inside a tag.
	Whitespace,
	/// Character data between tags, entity references included.
	Text,
	/// `<!-- ... -->`
	Comment,
	/// `<? ... ?>`, the XML declaration included.
	ProcessingInstruction,
	/// `<![CDATA[ ... ]]>`
	Cdata,
	/// `<!DOCTYPE ... >`
	Doctype,
	/// Coalesced characters the lexer could not classify.
	Garbage,

	// --- Node kinds ---
	Document,
	Element,
	StartTag,
	EndTag,
	EmptyTag,
	Attribute,
	Error,

	#[doc(hidden)]
	__Last,
}

use SyntaxKind::*;

impl SyntaxKind {
	/// Returns true for the three tag node kinds.
	#[inline]
	pub fn is_tag(self) -> bool {
		matches!(self, StartTag | EndTag | EmptyTag)
	}
}

impl From<SyntaxKind> for rowan::SyntaxKind {
	#[inline]
	fn from(kind: SyntaxKind) -> Self {
		Self(kind as u16)
	}
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum XmlLang {}

const ALL_KINDS: [SyntaxKind; __Last as usize] = [
	LAngle,
	LAngleSlash,
	RAngle,
	SlashRAngle,
	Eq,
	Slash,
	Name,
	AttrValue,
	Whitespace,
	Text,
	Comment,
	ProcessingInstruction,
	Cdata,
	Doctype,
	Garbage,
	Document,
	Element,
	StartTag,
	EndTag,
	EmptyTag,
	Attribute,
	Error,
];

impl Language for XmlLang {
	type Kind = SyntaxKind;

	fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
		ALL_KINDS[raw.0 as usize]
	}

	fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
		kind.into()
	}
}

/// Type aliases for Rowan types parameterized by the XML language.
pub type SyntaxNode = rowan::SyntaxNode<XmlLang>;
pub type SyntaxToken = rowan::SyntaxToken<XmlLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;
