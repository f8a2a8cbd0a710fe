use quire_primitives::Rope;
use roxmltree::{Document, Node, NodeType, ParsingOptions};

use crate::error::RawParseError;
use crate::tree::{ObjectAttribute, ObjectId, ObjectKind, ObjectTree};

/// Parses `text` strictly into an [`ObjectTree`].
///
/// Internal DTD subsets are accepted. Failures carry the parser's message
/// followed by `(line R, column C)`.
pub fn parse(text: &str) -> Result<ObjectTree, RawParseError> {
	let options = ParsingOptions {
		allow_dtd: true,
		..ParsingOptions::default()
	};
	let document = Document::parse_with_options(text, options).map_err(render_error)?;
	let offsets = Rope::from_str(text);
	let mut tree = ObjectTree::new(offsets.len_chars());

	let mut ids = vec![ObjectId::ROOT; document.descendants().count()];
	for node in document.root().descendants().skip(1) {
		let Some(parent) = node.parent() else {
			continue;
		};
		let Some(kind) = object_kind(text, &node) else {
			continue;
		};
		let range = node.range();
		let range = offsets.byte_to_char(range.start)..offsets.byte_to_char(range.end);
		let id = tree.push(ids[parent.id().get_usize()], kind, range);
		ids[node.id().get_usize()] = id;
	}

	Ok(tree)
}

fn object_kind(text: &str, node: &Node<'_, '_>) -> Option<ObjectKind> {
	Some(match node.node_type() {
		NodeType::Root => return None,
		NodeType::Element => ObjectKind::Element {
			name: qualified_name(text, node),
			attributes: node
				.attributes()
				.map(|attr| {
					let prefix = attr.namespace().and_then(|uri| node.lookup_prefix(uri));
					let name = match prefix {
						Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
						_ => attr.name().to_owned(),
					};
					ObjectAttribute {
						name,
						value: attr.value().to_owned(),
					}
				})
				.collect(),
		},
		NodeType::Text => ObjectKind::Text(node.text().unwrap_or_default().to_owned()),
		NodeType::Comment => ObjectKind::Comment(node.text().unwrap_or_default().to_owned()),
		NodeType::PI => {
			let pi = node.pi()?;
			ObjectKind::ProcessingInstruction {
				target: pi.target.to_owned(),
				data: pi.value.map(str::to_owned),
				source: text.get(node.range()).unwrap_or_default().to_owned(),
			}
		}
	})
}

/// The element name exactly as written after `<`, prefix included.
fn qualified_name(text: &str, node: &Node<'_, '_>) -> String {
	let start = node.range().start + 1;
	text.get(start..)
		.and_then(|rest| rest.split(|c: char| c.is_whitespace() || c == '/' || c == '>').next())
		.filter(|name| !name.is_empty())
		.map_or_else(|| node.tag_name().name().to_owned(), str::to_owned)
}

fn render_error(error: roxmltree::Error) -> RawParseError {
	let pos = error.pos();
	let message = error.to_string();
	let suffix = format!(" at {pos}");
	let message = message.strip_suffix(suffix.as_str()).unwrap_or(&message);
	RawParseError::new(format!("{message} (line {}, column {})", pos.row, pos.col))
}
