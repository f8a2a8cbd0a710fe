//! Fault-tolerant XML parse tree.
//!
//! A two-mode [`logos`] lexer feeds a resilient builder that always produces a
//! lossless [`rowan`] tree, however malformed the input. [`ParseTree`] is the
//! snapshot editors hold between keystrokes: cheap to clone, safe to send
//! across tasks, and addressed by character offset.

pub mod ast;
pub mod kind;
pub mod lexer;
mod parser;
mod tree;


pub use ast::{Attribute, Element, Root, Tag, TagKind, enclosing_tag, is_tag_name};
pub use kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, XmlLang};
pub use parser::SyntaxError;
pub use tree::ParseTree;
