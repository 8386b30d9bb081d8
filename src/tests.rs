use super::*;

use std::collections::HashMap;

fn collect(strict: bool, opt: ParserOptions, chunks: &[&str]) -> Vec<Event> {
	let mut parser = Parser::with_options(strict, opt, EventCollector::new());
	for chunk in chunks {
		// errors latch mid-document in strict mode; the events are what we
		// assert on
		let _ = parser.write(chunk);
	}
	parser.end();
	parser.into_sink().into_events()
}

fn lenient(doc: &str) -> Vec<Event> {
	collect(false, ParserOptions::default().lowercase(true), &[doc])
}

fn strict(doc: &str) -> Vec<Event> {
	collect(true, ParserOptions::default(), &[doc])
}

fn plain_tag(name: &str, self_closing: bool) -> Tag {
	Tag {
		name: name.into(),
		prefix: None,
		local: None,
		uri: None,
		self_closing,
		attributes: HashMap::new(),
		ns: None,
	}
}

fn texts(events: &[Event]) -> String {
	let mut out = String::new();
	for ev in events {
		if let Event::Text(t) = ev {
			out.push_str(t);
		}
	}
	out
}

fn errors(events: &[Event]) -> Vec<&ParseError> {
	events
		.iter()
		.filter_map(|ev| match ev {
			Event::Error(e) => Some(e),
			_ => None,
		})
		.collect()
}

#[test]
fn nested_and_self_closing_tags() {
	let b = plain_tag("b", true);
	assert_eq!(
		strict("<a><b/></a>"),
		vec![
			Event::Ready,
			Event::OpenTagStart { name: "a".into() },
			Event::OpenTag(plain_tag("a", false)),
			Event::OpenTagStart { name: "b".into() },
			Event::OpenTag(b),
			Event::CloseTag("b".into()),
			Event::CloseTag("a".into()),
			Event::End,
			Event::Ready,
		]
	);
}

#[test]
fn duplicate_attributes_keep_the_first_value() {
	let events = strict("<a foo=\"1\" foo=\"2\"/>");
	let attrs: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::Attribute(a) => Some(a),
			_ => None,
		})
		.collect();
	assert_eq!(attrs.len(), 1);
	assert_eq!(attrs[0].value, "1");
	match events
		.iter()
		.find(|ev| matches!(ev, Event::OpenTag(_)))
	{
		Some(Event::OpenTag(tag)) => {
			assert_eq!(tag.attributes.len(), 1);
			assert_eq!(tag.attributes["foo"].value, "1");
			assert!(tag.self_closing);
		}
		other => panic!("unexpected event: {:?}", other),
	}
	assert!(errors(&events).is_empty());
}

#[test]
fn namespace_bindings_resolve_and_unwind() {
	let opt = ParserOptions::default().xmlns(true);
	let events = collect(true, opt, &["<root xmlns:p=\"urn:x\"><p:c/></root>"]);
	let mut iter = events.iter();
	assert_eq!(iter.next(), Some(&Event::Ready));
	assert_eq!(
		iter.next(),
		Some(&Event::OpenTagStart {
			name: "root".into()
		})
	);
	assert_eq!(
		iter.next(),
		Some(&Event::OpenNamespace {
			prefix: "p".into(),
			uri: "urn:x".into(),
		})
	);
	match iter.next() {
		Some(Event::Attribute(a)) => {
			assert_eq!(a.name.as_str(), "xmlns:p");
			assert_eq!(a.value, "urn:x");
			assert_eq!(a.prefix.as_deref(), Some("xmlns"));
			assert_eq!(a.local.as_deref(), Some("p"));
			assert_eq!(a.uri.as_deref(), Some(XMLNS_NAMESPACE));
		}
		other => panic!("unexpected event: {:?}", other),
	}
	match iter.next() {
		Some(Event::OpenTag(tag)) => {
			assert_eq!(tag.name.as_str(), "root");
			assert_eq!(tag.prefix.as_deref(), Some(""));
			assert_eq!(tag.local.as_deref(), Some("root"));
			assert_eq!(tag.uri.as_deref(), Some(""));
		}
		other => panic!("unexpected event: {:?}", other),
	}
	assert_eq!(
		iter.next(),
		Some(&Event::OpenTagStart { name: "p:c".into() })
	);
	match iter.next() {
		Some(Event::OpenTag(tag)) => {
			assert_eq!(tag.name.as_str(), "p:c");
			assert_eq!(tag.prefix.as_deref(), Some("p"));
			assert_eq!(tag.local.as_deref(), Some("c"));
			assert_eq!(tag.uri.as_deref(), Some("urn:x"));
			assert!(tag.self_closing);
		}
		other => panic!("unexpected event: {:?}", other),
	}
	assert_eq!(iter.next(), Some(&Event::CloseTag("p:c".into())));
	assert_eq!(iter.next(), Some(&Event::CloseTag("root".into())));
	assert_eq!(
		iter.next(),
		Some(&Event::CloseNamespace {
			prefix: "p".into(),
			uri: "urn:x".into(),
		})
	);
	assert_eq!(iter.next(), Some(&Event::End));
	assert_eq!(iter.next(), Some(&Event::Ready));
	assert_eq!(iter.next(), None);
}

#[test]
fn entities_expand_in_text() {
	let events = strict("<a>&amp;&#65;&#x42;</a>");
	assert_eq!(texts(&events), "&AB");
	assert_eq!(
		events
			.iter()
			.filter(|ev| matches!(ev, Event::Text(_)))
			.count(),
		1
	);
	assert!(errors(&events).is_empty());
}

#[test]
fn unknown_entities_stay_literal() {
	let events = lenient("<a>one &xyz; two</a>");
	assert_eq!(texts(&events), "one &xyz; two");
	assert!(errors(&events).is_empty());

	let events = strict("<a>one &xyz; two</a>");
	assert_eq!(texts(&events), "one &xyz; two");
	let errs = errors(&events);
	assert_eq!(errs.len(), 1);
	assert_eq!(
		errs[0].kind,
		ErrorKind::Syntax(SyntaxError::InvalidCharEntity)
	);
}

#[test]
fn mismatched_close_recovers_in_lenient_mode() {
	let events = lenient("<a><b></c></b></a>");
	// the bogus </c> is reported, then parsing continues normally
	let errs = errors(&events);
	assert!(errs
		.iter()
		.any(|e| e.kind == ErrorKind::Structure(StructureError::UnexpectedCloseTag)));
	assert!(errs.iter().any(|e| matches!(
		&e.kind,
		ErrorKind::Structure(StructureError::UnmatchedCloseTag(n)) if n.as_str() == "c"
	)));
	let closes: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::CloseTag(name) => Some(name.as_str()),
			_ => None,
		})
		.collect();
	assert_eq!(closes, vec!["b", "a"]);
	// the skipped closer is replayed as text
	assert_eq!(texts(&events), "</c>");
}

#[test]
fn mismatched_close_latches_in_strict_mode() {
	let mut parser = Parser::with_options(true, ParserOptions::default(), EventCollector::new());
	parser.write("<a><b></c>").unwrap();
	assert!(parser.latched_error().is_some());
	// the latch blocks the next write until resume()
	assert!(parser.write("</b>").is_err());
	parser.resume();
	parser.write("</b></a>").unwrap();
	parser.end();
	let events = parser.into_sink().into_events();
	let closes: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::CloseTag(name) => Some(name.as_str()),
			_ => None,
		})
		.collect();
	assert_eq!(closes, vec!["b", "a"]);
}

#[test]
fn any_chunking_yields_the_same_events() {
	let docs = [
		"<a><b/></a>",
		"<a foo=\"1\" foo=\"2\"/>",
		"<a>&amp;&#65;&#x42;</a>",
		"<r>caf\u{e9} cr\u{e8}me</r>",
		"<!DOCTYPE html><r><!-- hey --><![CDATA[x]]y]]><?pi body?>t</r>",
		"\u{feff}<a>one &xyz; two</a>",
	];
	for doc in docs {
		let whole = collect(false, ParserOptions::default(), &[doc]);
		let chunks: Vec<String> = doc.chars().map(|c| c.to_string()).collect();
		let chunk_refs: Vec<&str> = chunks.iter().map(|s| s.as_str()).collect();
		let chunked = collect(false, ParserOptions::default(), &chunk_refs);
		assert_eq!(whole, chunked, "chunking changed events for {:?}", doc);
	}
}

#[test]
fn leading_bom_is_skipped() {
	let events = strict("\u{feff}<a/>");
	assert!(errors(&events).is_empty());
	assert!(events
		.iter()
		.any(|ev| matches!(ev, Event::OpenTag(t) if t.name.as_str() == "a")));
}

#[test]
fn text_before_the_first_tag() {
	let events = lenient("hi<a/>");
	assert!(errors(&events).is_empty());
	assert_eq!(texts(&events), "hi");

	let events = strict("hi<a/>");
	assert_eq!(
		errors(&events)[0].kind,
		ErrorKind::Syntax(SyntaxError::NonWhitespaceBeforeFirstTag)
	);
	assert_eq!(texts(&events), "hi");
}

#[test]
fn trim_and_normalize_shape_text_and_comments() {
	let opt = ParserOptions::default().trim(true).normalize(true);
	let events = collect(true, opt, &["<a>  two \t words  <!--  and a\ncomment  --></a>"]);
	let text: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::Text(t) => Some(t.as_str()),
			_ => None,
		})
		.collect();
	assert_eq!(text, vec!["two words"]);
	let comments: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::Comment(c) => Some(c.as_str()),
			_ => None,
		})
		.collect();
	assert_eq!(comments, vec!["and a comment"]);
	// structural payloads are untouched
	assert!(events
		.iter()
		.any(|ev| matches!(ev, Event::CloseTag(n) if n.as_str() == "a")));
}

#[test]
fn doctype_is_reported_once() {
	let events = lenient("<!DOCTYPE html PUBLIC \"x\"><r/>");
	assert!(events
		.iter()
		.any(|ev| matches!(ev, Event::Doctype(d) if d == " html PUBLIC \"x\"")));

	// a second doctype is inappropriate
	let events = strict("<!DOCTYPE a><!DOCTYPE b><r/>");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::Structure(StructureError::MisplacedDoctype)));
}

#[test]
fn doctype_with_internal_subset() {
	let doc = "<!DOCTYPE r [ <!ENTITY % x \"y\"> ]><r/>";
	let events = strict(doc);
	assert!(errors(&events).is_empty());
	assert!(events
		.iter()
		.any(|ev| matches!(ev, Event::Doctype(d) if d == " r [ <!ENTITY % x \"y\"> ]")));
}

#[test]
fn processing_instructions_split_name_and_body() {
	let events = strict("<?xml-stylesheet href=\"a.css\" ?><r/>");
	match events
		.iter()
		.find(|ev| matches!(ev, Event::ProcessingInstruction { .. }))
	{
		Some(Event::ProcessingInstruction { name, body }) => {
			assert_eq!(name.as_str(), "xml-stylesheet");
			assert_eq!(body, "href=\"a.css\" ");
		}
		other => panic!("unexpected event: {:?}", other),
	}
}

#[test]
fn sgml_declarations_are_surfaced() {
	let events = lenient("<!ENTITY thing \"y\"><r/>");
	assert!(events
		.iter()
		.any(|ev| matches!(ev, Event::SgmlDeclaration(d) if d == "ENTITY thing \"y\"")));
}

#[test]
fn cdata_sections_bracket_their_content() {
	let events = strict("<r><![CDATA[x]]y & <z>]]></r>");
	let mut iter = events.iter().skip_while(|ev| !matches!(ev, Event::OpenCData));
	assert_eq!(iter.next(), Some(&Event::OpenCData));
	assert_eq!(iter.next(), Some(&Event::CData("x]]y & <z>".to_string())));
	assert_eq!(iter.next(), Some(&Event::CloseCData));
}

#[test]
fn script_content_is_raw_in_lenient_mode() {
	let events = lenient("<script>if (a < b && c) { d(); }</script>");
	assert!(events
		.iter()
		.any(|ev| matches!(ev, Event::Script(s) if s == "if (a < b && c) { d(); }")));
	// nothing inside was parsed as markup
	assert!(!events
		.iter()
		.any(|ev| matches!(ev, Event::OpenTag(t) if t.name.as_str() != "script")));
}

#[test]
fn noscript_disables_raw_script_handling() {
	let opt = ParserOptions::default().lowercase(true).noscript(true);
	let events = collect(false, opt, &["<script>x</script>"]);
	assert!(!events.iter().any(|ev| matches!(ev, Event::Script(_))));
	assert_eq!(texts(&events), "x");
}

#[test]
fn strict_mode_implies_noscript() {
	let events = strict("<script>a&amp;b</script>");
	assert!(!events.iter().any(|ev| matches!(ev, Event::Script(_))));
	assert_eq!(texts(&events), "a&b");
}

#[test]
fn end_is_idempotent_and_the_parser_is_reusable() {
	let mut parser = Parser::with_options(true, ParserOptions::default(), EventCollector::new());
	parser.write("<a/>").unwrap();
	parser.end();
	parser.end();
	parser.write("<b/>").unwrap();
	parser.end();
	let events = parser.into_sink().into_events();
	assert_eq!(
		events
			.iter()
			.filter(|ev| matches!(ev, Event::End))
			.count(),
		2
	);
	let opens: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::OpenTag(t) => Some(t.name.as_str()),
			_ => None,
		})
		.collect();
	assert_eq!(opens, vec!["a", "b"]);
}

#[test]
fn unclosed_root_is_reported_at_end() {
	let events = strict("<a><b>");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::Structure(StructureError::UnclosedRootTag)));
	// lenient mode swallows it
	assert!(errors(&lenient("<a><b>")).is_empty());
}

#[test]
fn truncated_markup_is_an_unexpected_end() {
	let events = strict("<a");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::UnexpectedEnd));
	// this one is reported in lenient mode too
	let events = lenient("<a href=");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::UnexpectedEnd));
}

#[test]
fn empty_close_tag_is_weird() {
	let events = lenient("<a></></a>");
	assert_eq!(texts(&events), "</>");
	let events = strict("<a></></a>");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::Structure(StructureError::EmptyCloseTag)));
}

#[test]
fn unencoded_lt_becomes_text() {
	let events = lenient("<r>1 <2 3</r>");
	assert!(errors(&events).is_empty());
	assert_eq!(texts(&events), "1 <2 3");
	let events = strict("<r>1 <2 3</r>");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::Syntax(SyntaxError::UnencodedLt)));
}

#[test]
fn text_after_the_root() {
	// a stray < after the closed root stays literal in lenient mode
	let events = lenient("<a/>tail<b/>");
	assert_eq!(texts(&events), "tail<b/>");

	let events = strict("<a/>tail");
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::Syntax(SyntaxError::TextOutsideRoot)));
}

#[test]
fn unbound_prefix_falls_back_to_itself() {
	let opt = ParserOptions::default().xmlns(true);
	let events = collect(true, opt, &["<x:a/>"]);
	assert!(errors(&events).iter().any(|e| matches!(
		&e.kind,
		ErrorKind::Namespace(NamespaceError::UnboundPrefix(p)) if p.as_str() == "x"
	)));
	match events.iter().find(|ev| matches!(ev, Event::OpenTag(_))) {
		Some(Event::OpenTag(tag)) => {
			assert_eq!(tag.prefix.as_deref(), Some("x"));
			assert_eq!(tag.uri.as_deref(), Some("x"));
		}
		other => panic!("unexpected event: {:?}", other),
	}
}

#[test]
fn reserved_prefixes_cannot_be_rebound() {
	let opt = ParserOptions::default().xmlns(true);
	let events = collect(true, opt, &["<a xmlns:xml=\"urn:wrong\"/>"]);
	assert!(errors(&events)
		.iter()
		.any(|e| e.kind == ErrorKind::Namespace(NamespaceError::XmlPrefixRebound)));
	// the bogus binding is not installed
	match events.iter().find(|ev| matches!(ev, Event::OpenTag(_))) {
		Some(Event::OpenTag(tag)) => match tag.ns.as_ref() {
			Some(ns) => assert_eq!(ns.get("xml").map(|u| u.as_str()), Some(XML_NAMESPACE)),
			None => panic!("tag without namespace map"),
		},
		other => panic!("unexpected event: {:?}", other),
	}
}

#[test]
fn default_namespace_applies_to_elements_not_attributes() {
	let opt = ParserOptions::default().xmlns(true);
	let events = collect(true, opt, &["<a xmlns=\"urn:d\" k=\"v\"><c/></a>"]);
	let tags: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::OpenTag(t) => Some(t),
			_ => None,
		})
		.collect();
	assert_eq!(tags[0].uri.as_deref(), Some("urn:d"));
	assert_eq!(tags[1].uri.as_deref(), Some("urn:d"));
	match events.iter().find(
		|ev| matches!(ev, Event::Attribute(a) if a.name.as_str() == "k"),
	) {
		Some(Event::Attribute(a)) => assert_eq!(a.uri.as_deref(), Some("")),
		other => panic!("unexpected event: {:?}", other),
	}
}

#[test]
fn attribute_recovery_in_lenient_mode() {
	// value-less attribute: the name doubles as the value
	let events = lenient("<a disabled>x</a>");
	match events.iter().find(|ev| matches!(ev, Event::Attribute(_))) {
		Some(Event::Attribute(a)) => {
			assert_eq!(a.name.as_str(), "disabled");
			assert_eq!(a.value, "disabled");
		}
		other => panic!("unexpected event: {:?}", other),
	}
	// unquoted value
	let events = lenient("<a b=c/>");
	match events.iter().find(|ev| matches!(ev, Event::Attribute(_))) {
		Some(Event::Attribute(a)) => {
			assert_eq!(a.name.as_str(), "b");
			assert_eq!(a.value, "c");
		}
		other => panic!("unexpected event: {:?}", other),
	}
	// whitespace, then something which is not a value
	let events = lenient("<a b c=\"d\"/>");
	let attrs: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::Attribute(a) => Some((a.name.as_str(), a.value.as_str())),
			_ => None,
		})
		.collect();
	assert_eq!(attrs, vec![("b", ""), ("c", "d")]);
}

#[test]
fn entity_in_attribute_values() {
	let events = strict("<a b=\"x&amp;y\" c=\"&#xe9;\"/>");
	let attrs: Vec<_> = events
		.iter()
		.filter_map(|ev| match ev {
			Event::Attribute(a) => Some((a.name.as_str(), a.value.as_str())),
			_ => None,
		})
		.collect();
	assert_eq!(attrs, vec![("b", "x&y"), ("c", "\u{e9}")]);
}

#[test]
fn errors_carry_positions_when_tracking() {
	let opt = ParserOptions::default().track_position(true);
	let events = collect(true, opt, &["ab<r/>"]);
	let errs = errors(&events);
	assert!(!errs.is_empty());
	match errs[0].location {
		Some(loc) => {
			assert_eq!(loc.line, 0);
			assert_eq!(loc.column, 1);
			assert_eq!(loc.offset, 1);
		}
		None => panic!("missing location"),
	}
	// without tracking, no annotation
	let events = strict("ab<r/>");
	assert_eq!(errors(&events)[0].location, None);
}

#[test]
fn flush_forces_pending_text_out() {
	let mut parser = Parser::new(EventCollector::new());
	parser.write("<a>abc").unwrap();
	let mut pre = Vec::new();
	while let Some(ev) = parser.sink_mut().pop() {
		pre.push(ev);
	}
	assert!(!pre.iter().any(|ev| matches!(ev, Event::Text(_))));
	parser.flush();
	let mut saw = false;
	while let Some(ev) = parser.sink_mut().pop() {
		if matches!(&ev, Event::Text(t) if t == "abc") {
			saw = true;
		}
	}
	assert!(saw);
}

#[test]
fn oversized_text_is_flushed_by_the_watchdog() {
	let big = "x".repeat(MAX_BUFFER_LENGTH + 5000);
	let head = format!("<a>{}", big);
	let events = collect(true, ParserOptions::default(), &[&head, "</a>"]);
	assert!(errors(&events).is_empty());
	assert_eq!(texts(&events), big);
	// the first write already ended past the check position, so the text
	// went out before the closing tag arrived
	let text_pos = events
		.iter()
		.position(|ev| matches!(ev, Event::Text(_)))
		.unwrap();
	let close_pos = events
		.iter()
		.position(|ev| matches!(ev, Event::CloseTag(_)))
		.unwrap();
	assert!(text_pos < close_pos);
}

#[test]
fn oversized_comment_is_fatal() {
	let mut parser = Parser::new(EventCollector::new());
	let big = "y".repeat(MAX_BUFFER_LENGTH + 5000);
	parser.write(&format!("<a><!--{}", big)).unwrap();
	match parser.latched_error() {
		Some(err) => assert_eq!(err.kind, ErrorKind::BufferOverflow("comment")),
		None => panic!("overflow did not latch"),
	}
	assert!(parser.write("more").is_err());
}

#[test]
fn ready_is_emitted_on_construction_and_after_end() {
	let events = strict("<a/>");
	assert_eq!(events.first(), Some(&Event::Ready));
	assert_eq!(events.last(), Some(&Event::Ready));
}

#[test]
fn closure_sinks_work() {
	let mut names: Vec<String> = Vec::new();
	{
		let mut parser = Parser::with_options(
			true,
			ParserOptions::default(),
			|ev: Event| {
				if let Event::OpenTag(tag) = ev {
					names.push(tag.name.to_string());
				}
			},
		);
		parser.write("<a><b/></a>").unwrap();
		parser.end();
	}
	assert_eq!(names, vec!["a", "b"]);
}
