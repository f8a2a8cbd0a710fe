//! Owned object tree arena.

use std::ops::{Index, Range};

use quire_primitives::CharIdx;

/// Stable handle to a node of one [`ObjectTree`].
///
/// Ids are only meaningful for the tree that issued them; a reparse issues a
/// fresh tree and fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
	pub const ROOT: ObjectId = ObjectId(0);

	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// One attribute as written on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttribute {
	/// Qualified name, prefix included.
	pub name: String,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
	Document,
	Element {
		/// Qualified name as written in the source.
		name: String,
		attributes: Vec<ObjectAttribute>,
	},
	Text(String),
	Comment(String),
	ProcessingInstruction {
		target: String,
		data: Option<String>,
		/// The instruction exactly as written, delimiters included.
		source: String,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNode {
	pub kind: ObjectKind,
	/// Character range in the source text.
	pub range: Range<CharIdx>,
	pub parent: Option<ObjectId>,
	pub children: Vec<ObjectId>,
}

impl ObjectNode {
	pub fn is_element(&self) -> bool {
		matches!(self.kind, ObjectKind::Element { .. })
	}

	/// Element name, `None` for every other kind.
	pub fn name(&self) -> Option<&str> {
		match &self.kind {
			ObjectKind::Element { name, .. } => Some(name),
			_ => None,
		}
	}
}

/// A processing instruction found among the document's top-level children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstructionRecord {
	pub target: String,
	pub data: Option<String>,
	/// Character offset of the opening `<?`.
	pub position: CharIdx,
	pub full_text: String,
}

/// Arena of strictly parsed nodes. Node zero is always the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTree {
	nodes: Vec<ObjectNode>,
}

impl ObjectTree {
	pub(crate) fn new(len: CharIdx) -> Self {
		Self {
			nodes: vec![ObjectNode {
				kind: ObjectKind::Document,
				range: 0..len,
				parent: None,
				children: Vec::new(),
			}],
		}
	}

	pub(crate) fn push(&mut self, parent: ObjectId, kind: ObjectKind, range: Range<CharIdx>) -> ObjectId {
		let id = ObjectId(self.nodes.len() as u32);
		self.nodes.push(ObjectNode {
			kind,
			range,
			parent: Some(parent),
			children: Vec::new(),
		});
		self.nodes[parent.index()].children.push(id);
		id
	}

	pub fn root(&self) -> ObjectId {
		ObjectId::ROOT
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Always false: the document node exists even for an empty tree.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn get(&self, id: ObjectId) -> Option<&ObjectNode> {
		self.nodes.get(id.index())
	}

	/// Children in document order.
	pub fn children(&self, id: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
		self.get(id).into_iter().flat_map(|node| node.children.iter().copied())
	}

	/// Element children in document order, skipping text, comments and
	/// processing instructions.
	pub fn element_children(&self, id: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
		self.children(id).filter(|&child| self[child].is_element())
	}

	/// The document element, if any.
	pub fn document_element(&self) -> Option<ObjectId> {
		self.element_children(ObjectId::ROOT).next()
	}

	/// Every element in document order.
	pub fn elements(&self) -> impl Iterator<Item = ObjectId> + '_ {
		(0..self.nodes.len() as u32)
			.map(ObjectId)
			.filter(|&id| self[id].is_element())
	}

	/// Processing instructions among the document node's direct children.
	pub fn processing_instructions(&self) -> Vec<ProcessingInstructionRecord> {
		self.children(ObjectId::ROOT)
			.filter_map(|id| {
				let node = &self[id];
				let ObjectKind::ProcessingInstruction { target, data, source } = &node.kind else {
					return None;
				};
				Some(ProcessingInstructionRecord {
					target: target.clone(),
					data: data.clone(),
					position: node.range.start,
					full_text: source.clone(),
				})
			})
			.collect()
	}
}

impl Index<ObjectId> for ObjectTree {
	type Output = ObjectNode;

	fn index(&self, id: ObjectId) -> &ObjectNode {
		&self.nodes[id.index()]
	}
}
