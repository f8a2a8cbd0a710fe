//! Typed wrappers over parse tree nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors. Wrappers are
//! views: two casts of the same position compare equal, but nothing here is a
//! stable identity across reparses.

use crate::kind::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
	($name:ident, $kind:ident) => {
		#[derive(Debug, Clone, PartialEq, Eq, Hash)]
		pub struct $name(SyntaxNode);

		impl $name {
			pub fn cast(node: SyntaxNode) -> Option<Self> {
				(node.kind() == SyntaxKind::$kind).then(|| Self(node))
			}

			pub fn syntax(&self) -> &SyntaxNode {
				&self.0
			}
		}
	};
}

ast_node!(Root, Document);
ast_node!(Element, Element);
ast_node!(Attribute, Attribute);

/// Which side of an element a tag sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
	/// `<name ...>`
	Start,
	/// `</name>`
	End,
	/// `<name .../>`
	Empty,
}

impl TagKind {
	/// The tag kind that pairs with this one inside the same element.
	pub fn counterpart(self) -> Option<TagKind> {
		match self {
			TagKind::Start => Some(TagKind::End),
			TagKind::End => Some(TagKind::Start),
			TagKind::Empty => None,
		}
	}
}

/// A start, end or empty tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(SyntaxNode);

impl Tag {
	pub fn cast(node: SyntaxNode) -> Option<Self> {
		node.kind().is_tag().then(|| Self(node))
	}

	pub fn syntax(&self) -> &SyntaxNode {
		&self.0
	}

	pub fn kind(&self) -> TagKind {
		match self.0.kind() {
			SyntaxKind::EndTag => TagKind::End,
			SyntaxKind::EmptyTag => TagKind::Empty,
			_ => TagKind::Start,
		}
	}

	/// The `Name` token directly after the opening delimiter.
	pub fn name_token(&self) -> Option<SyntaxToken> {
		self.0
			.children_with_tokens()
			.nth(1)
			.and_then(|el| el.into_token())
			.filter(|token| token.kind() == SyntaxKind::Name)
	}

	pub fn name(&self) -> Option<String> {
		self.name_token().map(|token| token.text().to_owned())
	}

	/// Returns true when the tag ends with `>` or `/>`.
	pub fn is_terminated(&self) -> bool {
		self.0
			.last_token()
			.is_some_and(|token| matches!(token.kind(), SyntaxKind::RAngle | SyntaxKind::SlashRAngle))
	}

	pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
		self.0.children().filter_map(Attribute::cast)
	}

	/// The element this tag opens or closes.
	pub fn element(&self) -> Option<Element> {
		self.0.parent().and_then(Element::cast)
	}
}

impl Root {
	/// Top-level elements in document order. Well-formed documents have one.
	pub fn elements(&self) -> impl Iterator<Item = Element> + use<> {
		self.0.children().filter_map(Element::cast)
	}

	/// The first element, skipping prolog constructs.
	pub fn first_element(&self) -> Option<Element> {
		self.elements().next()
	}
}

impl Element {
	/// The start or empty tag.
	pub fn open_tag(&self) -> Option<Tag> {
		self.0.first_child().and_then(Tag::cast).filter(|tag| tag.kind() != TagKind::End)
	}

	/// The end tag, absent for empty elements and unclosed ones.
	pub fn end_tag(&self) -> Option<Tag> {
		self.0.last_child().and_then(Tag::cast).filter(|tag| tag.kind() == TagKind::End)
	}

	/// The tag of the given kind among this element's direct children.
	pub fn tag(&self, kind: TagKind) -> Option<Tag> {
		match kind {
			TagKind::End => self.end_tag(),
			TagKind::Start | TagKind::Empty => self.open_tag().filter(|tag| tag.kind() == kind),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.open_tag().is_some_and(|tag| tag.kind() == TagKind::Empty)
	}

	/// False for an element the parser closed on behalf of an ancestor's end
	/// tag or the end of input.
	pub fn is_closed(&self) -> bool {
		self.is_empty() || self.end_tag().is_some()
	}

	pub fn name(&self) -> Option<String> {
		self.open_tag().and_then(|tag| tag.name())
	}

	/// Direct child elements in document order, skipping text, comments,
	/// processing instructions, CDATA and error nodes.
	pub fn child_elements(&self) -> impl Iterator<Item = Element> + use<> {
		self.0.children().filter_map(Element::cast)
	}
}

impl Attribute {
	pub fn name(&self) -> Option<String> {
		self.0
			.first_token()
			.filter(|token| token.kind() == SyntaxKind::Name)
			.map(|token| token.text().to_owned())
	}

	/// The attribute value without its quotes.
	pub fn value(&self) -> Option<String> {
		let token = self
			.0
			.children_with_tokens()
			.filter_map(|el| el.into_token())
			.find(|token| token.kind() == SyntaxKind::AttrValue)?;
		let text = token.text();
		Some(text.get(1..text.len().saturating_sub(1)).unwrap_or_default().to_owned())
	}
}

/// Returns true when `token` names the tag it sits in.
pub fn is_tag_name(token: &SyntaxToken) -> bool {
	token.kind() == SyntaxKind::Name
		&& token
			.parent()
			.and_then(Tag::cast)
			.and_then(|tag| tag.name_token())
			.is_some_and(|name| name == *token)
}

/// The tag enclosing a tag-name token.
pub fn enclosing_tag(token: &SyntaxToken) -> Option<Tag> {
	token.parent().and_then(Tag::cast)
}
