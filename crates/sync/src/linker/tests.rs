use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn link_text(text: &str) -> Result<LinkMap, LinkError> {
	let tree = ParseTree::parse(text);
	let objects = quire_dom::parse(text).unwrap();
	link(&tree, &tree.root(), &objects)
}

fn linked_names(text: &str, links: &LinkMap) -> Vec<(CharIdx, String)> {
	let objects = quire_dom::parse(text).unwrap();
	links
		.iter()
		.map(|(offset, id)| (offset, objects[id].name().unwrap_or_default().to_owned()))
		.collect()
}

#[test]
fn test_links_every_element_by_start_offset() {
	let text = "<?xml version=\"1.0\"?>\n<a>x<!-- c --><b/>y<c><d/></c></a>";
	let links = link_text(text).unwrap();
	assert_eq!(
		linked_names(text, &links),
		vec![
			(22, "a".to_owned()),
			(36, "b".to_owned()),
			(41, "c".to_owned()),
			(44, "d".to_owned()),
		]
	);
}

#[test]
fn test_skips_prolog_constructs() {
	let text = "<?pi data?><!DOCTYPE r><!-- lead --><r/>";
	let links = link_text(text).unwrap();
	assert_eq!(links.len(), 1);
	assert!(links.object_at(36).is_some());
}

#[test]
fn test_no_document_element_yields_empty_maps() {
	let tree = ParseTree::parse("only text");
	let objects = quire_dom::parse("<r/>").unwrap();
	assert_eq!(link(&tree, &tree.root(), &objects), Ok(LinkMap::default()));
}

#[test]
fn test_non_document_root_is_a_contract_violation() {
	let tree = ParseTree::parse("<a><b/></a>");
	let objects = quire_dom::parse("<a><b/></a>").unwrap();
	let element = tree.first_element().unwrap();
	assert_eq!(
		link(&tree, element.syntax(), &objects),
		Err(LinkError::NotDocumentRoot)
	);
}

#[test]
fn test_tag_mismatch_reports_both_names() {
	let tree = ParseTree::parse("<a><b/></a>");
	let objects = quire_dom::parse("<a><c/></a>").unwrap();
	assert_eq!(
		link(&tree, &tree.root(), &objects),
		Err(LinkError::TagMismatch {
			parse: "b".to_owned(),
			object: "c".to_owned(),
			offset: 3,
		})
	);
}

#[test]
fn test_child_count_mismatch_lists_surplus() {
	let tree = ParseTree::parse("<a><b/><c/><d/></a>");
	let objects = quire_dom::parse("<a><b/></a>").unwrap();
	let err = link(&tree, &tree.root(), &objects).unwrap_err();
	assert_eq!(
		err,
		LinkError::ChildCountMismatch {
			parent: "a".to_owned(),
			offset: 0,
			parse_count: 3,
			object_count: 1,
			surplus: vec!["c".to_owned(), "d".to_owned()],
		}
	);
	assert!(err.to_string().contains("surplus: c, d"));
}

#[test]
fn test_multibyte_offsets_are_characters() {
	let text = "<ä>ü<ö/></ä>";
	let links = link_text(text).unwrap();
	assert_eq!(links.forward().keys().copied().collect::<Vec<_>>(), vec![0, 4]);
}

fn arb_name() -> impl Strategy<Value = String> {
	"[a-w][a-w0-9]{0,2}"
}

fn arb_element() -> impl Strategy<Value = String> {
	let leaf = prop_oneof![
		arb_name().prop_map(|name| format!("<{name}/>")),
		(arb_name(), "[a-z ]{0,4}").prop_map(|(name, text)| format!("<{name}>{text}</{name}>")),
	];
	leaf.prop_recursive(4, 48, 4, |inner| {
		let child = prop_oneof![
			4 => inner,
			1 => Just("text".to_owned()),
			1 => Just("<!-- note -->".to_owned()),
			1 => Just("<?pi x?>".to_owned()),
		];
		(arb_name(), prop::collection::vec(child, 0..4))
			.prop_map(|(name, children)| format!("<{name} k=\"v\">{}</{name}>", children.concat()))
	})
}

proptest! {
	/// Forward and backward maps are exact inverses covering every element.
	#[test]
	fn prop_links_are_inverse((root, prolog) in (arb_element(), prop_oneof![Just(""), Just("<?pi d?>\n")])) {
		let text = format!("{prolog}{root}");
		let tree = ParseTree::parse(&text);
		let objects = quire_dom::parse(&text).unwrap();
		let links = link(&tree, &tree.root(), &objects).unwrap();

		prop_assert_eq!(links.forward().len(), links.backward().len());
		prop_assert_eq!(links.len(), objects.elements().count());
		for (offset, id) in links.iter() {
			prop_assert_eq!(links.offset_of(id), Some(offset));
			prop_assert_eq!(objects[id].range.start, offset);
		}
	}
}
