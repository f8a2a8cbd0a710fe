//! Structural matching between the parse tree and the object tree.
//!
//! [`link`] walks both trees in lockstep, descending only through elements,
//! and records which object-tree element sits at each parse-tree element's
//! start offset. Parse-tree nodes are views recreated on every access, so
//! links are keyed by character offset rather than node identity.

use std::collections::BTreeMap;

use quire_dom::{ObjectId, ObjectTree};
use quire_primitives::CharIdx;
use quire_syntax::{Element, ParseTree, Root, SyntaxNode};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Bidirectional offset/element links for one synced revision.
///
/// The two directions always hold the same pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
	forward: BTreeMap<CharIdx, ObjectId>,
	backward: FxHashMap<ObjectId, CharIdx>,
}

impl LinkMap {
	fn insert(&mut self, offset: CharIdx, id: ObjectId) {
		self.forward.insert(offset, id);
		self.backward.insert(id, offset);
	}

	pub fn len(&self) -> usize {
		self.forward.len()
	}

	pub fn is_empty(&self) -> bool {
		self.forward.is_empty()
	}

	/// The object-tree element whose parse-tree twin starts at `offset`.
	pub fn object_at(&self, offset: CharIdx) -> Option<ObjectId> {
		self.forward.get(&offset).copied()
	}

	/// The parse-tree start offset linked to `id`.
	pub fn offset_of(&self, id: ObjectId) -> Option<CharIdx> {
		self.backward.get(&id).copied()
	}

	pub fn forward(&self) -> &BTreeMap<CharIdx, ObjectId> {
		&self.forward
	}

	pub fn backward(&self) -> &FxHashMap<ObjectId, CharIdx> {
		&self.backward
	}

	/// Links in document order.
	pub fn iter(&self) -> impl Iterator<Item = (CharIdx, ObjectId)> + '_ {
		self.forward.iter().map(|(&offset, &id)| (offset, id))
	}
}

/// The two trees disagree on shape, or the caller passed the wrong roots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
	#[error("tag mismatch at offset {offset}: parse tree has <{parse}>, object tree has <{object}>")]
	TagMismatch {
		parse: String,
		object: String,
		offset: CharIdx,
	},

	#[error(
		"child count mismatch in <{parent}> at offset {offset}: {parse_count} parsed, {object_count} strict (surplus: {})",
		surplus.join(", ")
	)]
	ChildCountMismatch {
		parent: String,
		offset: CharIdx,
		parse_count: usize,
		object_count: usize,
		/// Names of the elements one side has beyond the other's count.
		surplus: Vec<String>,
	},

	/// The parse-tree root is not a document node.
	#[error("link roots must be document nodes")]
	NotDocumentRoot,
}

/// Links every element of `objects` to its parse-tree twin under `root`.
///
/// `tree` supplies the text and offset conversions for `root`. Returns an
/// empty map when either side has no document element yet.
pub fn link(tree: &ParseTree, root: &SyntaxNode, objects: &ObjectTree) -> Result<LinkMap, LinkError> {
	let Some(root) = Root::cast(root.clone()) else {
		return Err(LinkError::NotDocumentRoot);
	};

	let mut links = LinkMap::default();
	let (Some(parse_root), Some(object_root)) = (root.first_element(), objects.document_element()) else {
		return Ok(links);
	};

	let mut stack = vec![(parse_root, object_root)];
	while let Some((element, id)) = stack.pop() {
		let offset = tree.node_range(element.syntax()).start;
		let parse_name = element_name(tree, &element);
		let object_name = objects[id].name().unwrap_or_default();
		if parse_name != object_name {
			return Err(LinkError::TagMismatch {
				parse: parse_name,
				object: object_name.to_owned(),
				offset,
			});
		}
		links.insert(offset, id);

		let parse_children: Vec<Element> = element.child_elements().collect();
		let object_children: Vec<ObjectId> = objects.element_children(id).collect();
		if parse_children.len() != object_children.len() {
			let shared = parse_children.len().min(object_children.len());
			let surplus = parse_children
				.iter()
				.skip(shared)
				.map(|child| element_name(tree, child))
				.chain(
					object_children
						.iter()
						.skip(shared)
						.map(|&child| objects[child].name().unwrap_or_default().to_owned()),
				)
				.collect();
			return Err(LinkError::ChildCountMismatch {
				parent: parse_name,
				offset,
				parse_count: parse_children.len(),
				object_count: object_children.len(),
				surplus,
			});
		}

		stack.extend(parse_children.into_iter().zip(object_children).rev());
	}

	Ok(links)
}

/// Tag name read back through the tree's text.
fn element_name(tree: &ParseTree, element: &Element) -> String {
	element
		.open_tag()
		.and_then(|tag| tag.name_token())
		.map(|token| tree.slice(tree.token_range(&token)))
		.unwrap_or_default()
}

#[cfg(test)]
mod tests;
