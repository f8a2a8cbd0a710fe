/// Offset into a document in Unicode scalar values.
///
/// Every component (parse tree, object tree, link maps, diagnostics) speaks
/// in these; byte offsets from parsers are converted at the boundary.
pub type CharIdx = usize;

/// A count of Unicode scalar values. Kept apart from [`CharIdx`] in
/// signatures so lengths and positions read differently.
pub type CharLen = usize;
