/*!
# Tags, attributes and namespace scopes

The parser stages exactly one [`Tag`] while an element header is being read
and keeps the already-opened ones on a stack. In namespace mode every tag
carries a [`NamespaceMap`]; a tag which declares no bindings of its own
shares its parent's map, and the first `xmlns`/`xmlns:p` attribute on the tag
copies the map before inserting (copy-on-write, detected by pointer
identity).
*/
use std::collections::HashMap;
use std::rc::Rc;

use smartstring::alias::String as SmartString;

/// Namespace URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// Namespace URI bound to the reserved `xmlns` prefix.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Prefix → URI bindings in scope for one tag.
///
/// The default namespace is kept under the empty prefix. Sharing with the
/// parent scope is by reference; "this tag declared its own bindings" is
/// exactly `!Rc::ptr_eq(child, parent)`.
pub type NamespaceMap = Rc<HashMap<SmartString, SmartString>>;

/// The bindings in force outside the root element: the two reserved
/// prefixes.
pub(crate) fn root_namespace() -> NamespaceMap {
	let mut ns = HashMap::new();
	ns.insert(SmartString::from("xml"), SmartString::from(XML_NAMESPACE));
	ns.insert(
		SmartString::from("xmlns"),
		SmartString::from(XMLNS_NAMESPACE),
	);
	Rc::new(ns)
}

/// A single attribute.
///
/// `prefix`, `local` and `uri` are only populated when the parser runs with
/// namespace resolution; without it, an attribute is just the name/value
/// pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: SmartString,
	pub value: String,
	pub prefix: Option<SmartString>,
	pub local: Option<SmartString>,
	pub uri: Option<SmartString>,
}

impl Attribute {
	pub(crate) fn plain(name: SmartString, value: String) -> Attribute {
		Attribute {
			name,
			value,
			prefix: None,
			local: None,
			uri: None,
		}
	}
}

/// An element as staged during its header and kept on the open-tag stack.
///
/// Like [`Attribute`], the qualified fields are only populated in namespace
/// mode, where `ns` also carries the bindings in scope for this element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
	pub name: SmartString,
	pub prefix: Option<SmartString>,
	pub local: Option<SmartString>,
	pub uri: Option<SmartString>,
	pub self_closing: bool,
	pub attributes: HashMap<SmartString, Attribute>,
	pub ns: Option<NamespaceMap>,
}

impl Tag {
	pub(crate) fn new(name: SmartString, ns: Option<NamespaceMap>) -> Tag {
		Tag {
			name,
			prefix: None,
			local: None,
			uri: None,
			self_closing: false,
			attributes: HashMap::new(),
			ns,
		}
	}
}

/// Split a name into `(prefix, local)` at the first colon.
///
/// A name without a colon has an empty prefix. The bare attribute name
/// `xmlns` declares the default namespace and is treated as the `xmlns`
/// prefix with an empty local part.
pub(crate) fn split_qname(name: &str, attribute: bool) -> (SmartString, SmartString) {
	if attribute && name == "xmlns" {
		return (SmartString::from("xmlns"), SmartString::new());
	}
	match name.find(':') {
		None => (SmartString::new(), SmartString::from(name)),
		Some(i) => (SmartString::from(&name[..i]), SmartString::from(&name[i + 1..])),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn qname_splits_at_the_first_colon() {
		assert_eq!(split_qname("foo", false), ("".into(), "foo".into()));
		assert_eq!(split_qname("p:c", false), ("p".into(), "c".into()));
		assert_eq!(split_qname("a:b:c", false), ("a".into(), "b:c".into()));
	}

	#[test]
	fn bare_xmlns_is_the_default_declaration() {
		assert_eq!(split_qname("xmlns", true), ("xmlns".into(), "".into()));
		assert_eq!(split_qname("xmlns", false), ("".into(), "xmlns".into()));
		assert_eq!(split_qname("xmlns:p", true), ("xmlns".into(), "p".into()));
	}

	#[test]
	fn root_namespace_binds_the_reserved_prefixes() {
		let ns = root_namespace();
		assert_eq!(ns.get("xml").map(|s| s.as_str()), Some(XML_NAMESPACE));
		assert_eq!(ns.get("xmlns").map(|s| s.as_str()), Some(XMLNS_NAMESPACE));
		assert_eq!(ns.len(), 2);
	}

	#[test]
	fn shared_maps_compare_identical_by_pointer() {
		let parent = root_namespace();
		let child = parent.clone();
		assert!(Rc::ptr_eq(&parent, &child));
		let mut own = child.clone();
		Rc::make_mut(&mut own).insert("p".into(), "urn:x".into());
		assert!(!Rc::ptr_eq(&parent, &own));
		// parent scope unaffected by the copy-on-write
		assert!(parent.get("p").is_none());
	}
}
