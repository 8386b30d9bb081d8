/*!
# The push parser

[`Parser`] consumes already-decoded text in arbitrarily sized chunks and
drives a per-character state machine which emits [`Event`]s into the sink it
owns. No document tree is built; consumers assemble whatever model they need
from the event stream.

In lenient mode (the default) the machine recovers from most violations the
way SGML-era consumers expect: stray `<` becomes text, unquoted attribute
values are accepted, tag names are case-folded, `<script>` content is
buffered raw until `</script>`. In strict mode every violation latches an
error; see [`crate::error`].
*/
use std::rc::Rc;

use memchr::memchr2;
use smartstring::alias::String as SmartString;

use crate::buffers::{BufferId, BufferSet};
use crate::entities::{self, EntityLookup};
use crate::error::{
	ErrorKind, NamespaceError, ParseError, Result, StructureError, SyntaxError,
};
use crate::event::{Event, EventSink};
use crate::location::Location;
use crate::selectors::{
	is_attrib_end, is_entity_body, is_entity_start, is_name_body, is_name_start, is_quote,
	is_whitespace,
};
use crate::tag::{
	root_namespace, split_qname, Attribute, NamespaceMap, Tag, XMLNS_NAMESPACE, XML_NAMESPACE,
};

/// Ceiling for any single accumulator.
///
/// When a buffer crosses this length, text-like buffers (text, cdata,
/// script) are flushed early as their event and lexing continues; any other
/// buffer crossing it is a fatal [`ErrorKind::BufferOverflow`].
pub const MAX_BUFFER_LENGTH: usize = 64 * 1024;

/// The lexical states of the machine, one per recognisable position in the
/// grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// Start of the stream; a leading U+FEFF is skipped here.
	Begin,
	/// Leading whitespace before the first tag.
	BeginWhitespace,
	/// Character data.
	Text,
	/// `&` seen inside character data.
	TextEntity,
	/// `<` seen; the kind of markup is not known yet.
	OpenWaka,
	/// Inside `<!…`.
	SgmlDecl,
	/// Inside a quoted region of `<!…>`.
	SgmlDeclQuoted,
	/// Inside `<!DOCTYPE …`.
	Doctype,
	/// Inside a quoted region of a doctype.
	DoctypeQuoted,
	/// Inside the `[…]` internal subset of a doctype.
	DoctypeDtd,
	/// Inside a quoted region of the internal subset.
	DoctypeDtdQuoted,
	/// `<!-` seen, second `-` pending.
	CommentStarting,
	/// Inside `<!-- …`.
	Comment,
	/// `-` seen inside a comment.
	CommentEnding,
	/// `--` seen inside a comment, `>` pending.
	CommentEnded,
	/// Inside `<![CDATA[ …`.
	CData,
	/// `]` seen inside a CDATA section.
	CDataEnding,
	/// `]]` seen inside a CDATA section, `>` pending.
	CDataEnding2,
	/// Inside `<?target`.
	ProcInst,
	/// Inside the body of a processing instruction.
	ProcInstBody,
	/// `?` seen inside a processing instruction, `>` pending.
	ProcInstEnding,
	/// Lexing an opening tag name.
	OpenTag,
	/// `/` seen inside an opening tag.
	OpenTagSlash,
	/// Between attributes.
	Attrib,
	/// Lexing an attribute name.
	AttribName,
	/// Whitespace after an attribute name, `=` pending.
	AttribNameSawWhite,
	/// After `=`, value pending.
	AttribValue,
	/// Inside a quoted attribute value.
	AttribValueQuoted,
	/// Directly after the closing quote of a value.
	AttribValueClosed,
	/// Inside an unquoted attribute value.
	AttribValueUnquoted,
	/// `&` seen inside a quoted attribute value.
	AttribValueEntityQ,
	/// `&` seen inside an unquoted attribute value.
	AttribValueEntityU,
	/// Lexing a closing tag name.
	CloseTag,
	/// Whitespace after a closing tag name, `>` pending.
	CloseTagSawWhite,
	/// Inside raw `<script>` content.
	Script,
	/// `<` seen inside raw script content.
	ScriptEnding,
}

/// Hold options to configure a [`Parser`].
///
/// All options default to `false` and are frozen at construction. See also
/// [`Parser::with_options()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
	/// Strip leading and trailing whitespace from text and comment events.
	pub trim: bool,
	/// Collapse whitespace runs in text and comment events to single
	/// spaces.
	pub normalize: bool,
	/// In lenient mode, fold tag and attribute names to lowercase instead
	/// of uppercase.
	pub lowercase: bool,
	/// Resolve namespaces: emit qualified tags/attributes and
	/// `OpenNamespace`/`CloseNamespace` events.
	pub xmlns: bool,
	/// Maintain line/column information and annotate errors with it.
	pub track_position: bool,
	/// Restrict named entities to the five predefined by XML 1.0.
	pub strict_entities: bool,
	/// Disable raw `<script>` content handling in lenient mode.
	pub noscript: bool,
}

impl ParserOptions {
	/// Set [`ParserOptions::trim`].
	pub fn trim(mut self, v: bool) -> ParserOptions {
		self.trim = v;
		self
	}

	/// Set [`ParserOptions::normalize`].
	pub fn normalize(mut self, v: bool) -> ParserOptions {
		self.normalize = v;
		self
	}

	/// Set [`ParserOptions::lowercase`].
	pub fn lowercase(mut self, v: bool) -> ParserOptions {
		self.lowercase = v;
		self
	}

	/// Set [`ParserOptions::xmlns`].
	pub fn xmlns(mut self, v: bool) -> ParserOptions {
		self.xmlns = v;
		self
	}

	/// Set [`ParserOptions::track_position`].
	pub fn track_position(mut self, v: bool) -> ParserOptions {
		self.track_position = v;
		self
	}

	/// Set [`ParserOptions::strict_entities`].
	pub fn strict_entities(mut self, v: bool) -> ParserOptions {
		self.strict_entities = v;
		self
	}

	/// Set [`ParserOptions::noscript`].
	pub fn noscript(mut self, v: bool) -> ParserOptions {
		self.noscript = v;
		self
	}
}

/**
# Streaming push parser for XML 1.0 with SGML-ish leniency

Feed text with [`write()`], finish with [`end()`]. Events are delivered
synchronously into the owned [`EventSink`] while `write()` runs.

```
use laxml::{Event, EventCollector, Parser};

let mut parser = Parser::new(EventCollector::new());
parser.write("<greeting>hi").unwrap();
parser.write("</greeting>").unwrap();
parser.end();
let events = parser.into_sink().into_events();
assert!(events.contains(&Event::Text("hi".to_string())));
```

After `end()` the instance is fully reset (options excepted) and accepts the
next document.

   [`write()`]: Parser::write
   [`end()`]: Parser::end
*/
pub struct Parser<S: EventSink> {
	sink: S,
	state: State,
	strict: bool,
	opt: ParserOptions,
	/// `strict || opt.noscript`; strict mode never buffers script content.
	noscript: bool,
	entity_lookup: EntityLookup,
	buf: BufferSet,
	doctype_seen: bool,
	/// The opening quote of the quoted region currently being lexed.
	q: Option<char>,
	location: Location,
	/// Offset just past the `<` which opened the pending markup.
	start_tag_position: usize,
	/// Offset at which the buffer watchdog runs next.
	buffer_check_position: usize,
	error: Option<ParseError>,
	closed: bool,
	ended: bool,
	saw_root: bool,
	closed_root: bool,
	root_ns: NamespaceMap,
	tag: Option<Tag>,
	tags: Vec<Tag>,
	/// Attributes staged until all namespace declarations on the tag are
	/// known. Only used in namespace mode.
	attrib_list: Vec<(SmartString, String)>,
}

impl<S: EventSink> Parser<S> {
	/// Construct a lenient parser with default options.
	pub fn new(sink: S) -> Parser<S> {
		Self::with_options(false, ParserOptions::default(), sink)
	}

	/// Construct a parser with the given strictness and options.
	///
	/// Emits [`Event::Ready`] into the sink before returning.
	pub fn with_options(strict: bool, opt: ParserOptions, sink: S) -> Parser<S> {
		let entity_lookup: EntityLookup = if opt.strict_entities {
			entities::predefined
		} else {
			entities::html
		};
		let mut parser = Parser {
			sink,
			state: State::Begin,
			strict,
			opt,
			noscript: strict || opt.noscript,
			entity_lookup,
			buf: BufferSet::new(),
			doctype_seen: false,
			q: None,
			location: Location::new(),
			start_tag_position: 0,
			buffer_check_position: MAX_BUFFER_LENGTH,
			error: None,
			closed: false,
			ended: false,
			saw_root: false,
			closed_root: false,
			root_ns: root_namespace(),
			tag: None,
			tags: Vec::new(),
			attrib_list: Vec::new(),
		};
		parser.reset();
		parser
	}

	/// Access the sink.
	pub fn sink(&self) -> &S {
		&self.sink
	}

	/// Access the sink, mutably.
	pub fn sink_mut(&mut self) -> &mut S {
		&mut self.sink
	}

	/// Consume the parser and return its sink.
	pub fn into_sink(self) -> S {
		self.sink
	}

	/// The current stream position.
	///
	/// Line and column are only meaningful with
	/// [`ParserOptions::track_position`].
	pub fn location(&self) -> Location {
		self.location
	}

	/// The latched error, if any.
	pub fn latched_error(&self) -> Option<&ParseError> {
		self.error.as_ref()
	}

	/// Process a chunk of document text.
	///
	/// Fails immediately if an error is latched or the parser is closed.
	/// Violations detected *inside* the chunk are delivered as
	/// [`Event::Error`]; in strict mode they latch and fail the next call.
	pub fn write(&mut self, data: &str) -> Result<()> {
		self.check_poison()?;
		if self.closed {
			return Err(self.poison(ErrorKind::WriteAfterClose));
		}
		self.ended = false;
		let mut i = 0usize;
		while i < data.len() {
			let c = match data[i..].chars().next() {
				Some(c) => c,
				None => break,
			};
			i += c.len_utf8();
			self.advance_position(c);
			self.step(c, data, &mut i);
		}
		if self.location.offset >= self.buffer_check_position {
			self.check_buffer_length();
		}
		Ok(())
	}

	/// Finish the document.
	///
	/// Flushes pending text, emits [`Event::End`] and resets everything but
	/// the options, so the instance accepts a fresh document afterwards.
	/// Calling `end()` again without an intervening [`write()`](Self::write)
	/// is a no-op.
	pub fn end(&mut self) {
		if self.ended {
			return;
		}
		if self.saw_root && !self.closed_root {
			self.strict_fail(StructureError::UnclosedRootTag);
		}
		if !matches!(
			self.state,
			State::Begin | State::BeginWhitespace | State::Text
		) {
			self.poison(ErrorKind::UnexpectedEnd);
		}
		self.close_text();
		self.closed = true;
		self.emit(Event::End);
		self.reset();
		self.ended = true;
	}

	/// Equivalent to [`end()`](Self::end).
	pub fn close(&mut self) {
		self.end()
	}

	/// Clear a latched error, permitting further writes.
	pub fn resume(&mut self) {
		self.error = None;
	}

	/// Force out the text, cdata and script buffers as events.
	pub fn flush(&mut self) {
		self.close_text();
		if !self.buf[BufferId::CData].is_empty() {
			let cdata = self.buf.take(BufferId::CData);
			self.emit_node(Event::CData(cdata));
		}
		if !self.buf[BufferId::Script].is_empty() {
			let script = self.buf.take(BufferId::Script);
			self.emit_node(Event::Script(script));
		}
	}

	/// Reset all transient state for the next document and announce
	/// readiness.
	fn reset(&mut self) {
		self.buf.clear_all();
		self.doctype_seen = false;
		self.q = None;
		self.state = State::Begin;
		self.location = Location::new();
		self.start_tag_position = 0;
		self.buffer_check_position = MAX_BUFFER_LENGTH;
		self.error = None;
		self.closed = false;
		self.saw_root = false;
		self.closed_root = false;
		self.tag = None;
		self.tags.clear();
		self.attrib_list.clear();
		self.emit(Event::Ready);
	}

	fn emit(&mut self, ev: Event) {
		self.sink.event(ev);
	}

	/// Emit a structural event, flushing pending text first.
	fn emit_node(&mut self, ev: Event) {
		if !self.buf[BufferId::TextNode].is_empty() {
			self.close_text();
		}
		self.emit(ev);
	}

	/// Flush the text buffer through the trim/normalize options.
	fn close_text(&mut self) {
		if self.buf[BufferId::TextNode].is_empty() {
			return;
		}
		let taken = self.buf.take(BufferId::TextNode);
		let text = self.textopts(taken);
		if !text.is_empty() {
			self.emit(Event::Text(text));
		}
	}

	fn textopts(&self, mut text: String) -> String {
		if self.opt.trim {
			text = text.trim().to_string();
		}
		if self.opt.normalize {
			let mut out = String::with_capacity(text.len());
			let mut in_ws = false;
			for c in text.chars() {
				if c.is_whitespace() {
					if !in_ws {
						out.push(' ');
					}
					in_ws = true;
				} else {
					in_ws = false;
					out.push(c);
				}
			}
			text = out;
		}
		text
	}

	fn error_location(&self) -> Option<Location> {
		if self.opt.track_position {
			Some(self.location)
		} else {
			None
		}
	}

	/// Latch an error and deliver it, after flushing pending text.
	fn poison<K: Into<ErrorKind>>(&mut self, kind: K) -> ParseError {
		self.close_text();
		let err = ParseError::new(kind.into(), self.error_location());
		self.error = Some(err.clone());
		self.emit(Event::Error(err.clone()));
		err
	}

	fn check_poison(&self) -> Result<()> {
		match self.error.as_ref() {
			Some(err) => Err(err.clone()),
			None => Ok(()),
		}
	}

	/// Report a violation which lenient mode recovers from silently.
	fn strict_fail<K: Into<ErrorKind>>(&mut self, kind: K) {
		if self.strict {
			self.poison(kind);
		}
	}

	/// Report a violation which is surfaced in both modes but latches only
	/// in strict mode (the close-tag mismatch diagnostics).
	fn recoverable_fail<K: Into<ErrorKind>>(&mut self, kind: K) {
		if self.strict {
			self.poison(kind);
		} else {
			self.close_text();
			let err = ParseError::new(kind.into(), self.error_location());
			self.emit(Event::Error(err));
		}
	}

	fn advance_position(&mut self, c: char) {
		if self.opt.track_position {
			self.location.advance(c);
		} else {
			// the offset feeds the buffer watchdog and resynchronisation
			// padding, so it is counted unconditionally
			self.location.offset += 1;
		}
	}

	fn advance_span(&mut self, s: &str) {
		if self.opt.track_position {
			for c in s.chars() {
				self.location.advance(c);
			}
		} else {
			self.location.offset += s.chars().count();
		}
	}

	/// After each write, verify no accumulator has grown beyond
	/// [`MAX_BUFFER_LENGTH`] and schedule the next check as late as
	/// possible.
	fn check_buffer_length(&mut self) {
		let max_allowed = MAX_BUFFER_LENGTH.max(10);
		let mut max_actual = 0usize;
		for id in BufferId::ALL {
			if self.buf[id].len() > max_allowed {
				match id {
					BufferId::TextNode => self.close_text(),
					BufferId::CData => {
						let cdata = self.buf.take(BufferId::CData);
						self.emit_node(Event::CData(cdata));
					}
					BufferId::Script => {
						let script = self.buf.take(BufferId::Script);
						self.emit_node(Event::Script(script));
					}
					other => {
						self.poison(ErrorKind::BufferOverflow(other.name()));
					}
				}
			}
			max_actual = max_actual.max(self.buf[id].len());
		}
		self.buffer_check_position =
			MAX_BUFFER_LENGTH.saturating_sub(max_actual) + self.location.offset;
	}

	/// Dispatch one character. `data`/`i` allow the Text state to consume
	/// the rest of a plain-text span in bulk.
	fn step(&mut self, c: char, data: &str, i: &mut usize) {
		match self.state {
			State::Begin => {
				self.state = State::BeginWhitespace;
				// a leading byte order mark is skipped once
				if c != '\u{feff}' {
					self.begin_whitespace_char(c);
				}
			}
			State::BeginWhitespace => self.begin_whitespace_char(c),
			State::Text => self.text_char(c, data, i),
			State::Script => {
				if c == '<' {
					self.state = State::ScriptEnding;
				} else {
					self.buf[BufferId::Script].push(c);
				}
			}
			State::ScriptEnding => {
				if c == '/' {
					self.state = State::CloseTag;
				} else {
					self.buf[BufferId::Script].push('<');
					self.buf[BufferId::Script].push(c);
					self.state = State::Script;
				}
			}
			State::OpenWaka => self.open_waka_char(c),
			State::SgmlDecl => self.sgml_decl_char(c),
			State::SgmlDeclQuoted => {
				if Some(c) == self.q {
					self.state = State::SgmlDecl;
					self.q = None;
				}
				self.buf[BufferId::SgmlDecl].push(c);
			}
			State::CommentStarting => {
				if c == '-' {
					self.state = State::Comment;
					self.buf[BufferId::Comment].clear();
					self.buf[BufferId::SgmlDecl].clear();
				} else {
					// not a comment after all: keep the dash as declaration
					// text and continue as <!…
					self.buf[BufferId::SgmlDecl].push('-');
					self.state = State::SgmlDecl;
					self.sgml_decl_char(c);
				}
			}
			State::Doctype => {
				if c == '>' {
					self.state = State::Text;
					let doctype = self.buf.take(BufferId::Doctype);
					self.emit_node(Event::Doctype(doctype));
					self.doctype_seen = true;
				} else {
					self.buf[BufferId::Doctype].push(c);
					if c == '[' {
						self.state = State::DoctypeDtd;
					} else if is_quote(c) {
						self.state = State::DoctypeQuoted;
						self.q = Some(c);
					}
				}
			}
			State::DoctypeQuoted => {
				self.buf[BufferId::Doctype].push(c);
				if Some(c) == self.q {
					self.q = None;
					self.state = State::Doctype;
				}
			}
			State::DoctypeDtd => {
				self.buf[BufferId::Doctype].push(c);
				if c == ']' {
					self.state = State::Doctype;
				} else if is_quote(c) {
					self.state = State::DoctypeDtdQuoted;
					self.q = Some(c);
				}
			}
			State::DoctypeDtdQuoted => {
				self.buf[BufferId::Doctype].push(c);
				if Some(c) == self.q {
					self.state = State::DoctypeDtd;
					self.q = None;
				}
			}
			State::Comment => {
				if c == '-' {
					self.state = State::CommentEnding;
				} else {
					self.buf[BufferId::Comment].push(c);
				}
			}
			State::CommentEnding => {
				if c == '-' {
					self.state = State::CommentEnded;
					let taken = self.buf.take(BufferId::Comment);
					let comment = self.textopts(taken);
					if !comment.is_empty() {
						self.emit_node(Event::Comment(comment));
					}
				} else {
					self.buf[BufferId::Comment].push('-');
					self.buf[BufferId::Comment].push(c);
					self.state = State::Comment;
				}
			}
			State::CommentEnded => {
				if c != '>' {
					self.strict_fail(SyntaxError::MalformedComment);
					// lenient mode treats the -- as comment content
					self.buf[BufferId::Comment].push_str("--");
					self.buf[BufferId::Comment].push(c);
					self.state = State::Comment;
				} else {
					self.state = State::Text;
				}
			}
			State::CData => {
				if c == ']' {
					self.state = State::CDataEnding;
				} else {
					self.buf[BufferId::CData].push(c);
				}
			}
			State::CDataEnding => {
				if c == ']' {
					self.state = State::CDataEnding2;
				} else {
					self.buf[BufferId::CData].push(']');
					self.buf[BufferId::CData].push(c);
					self.state = State::CData;
				}
			}
			State::CDataEnding2 => {
				if c == '>' {
					if !self.buf[BufferId::CData].is_empty() {
						let cdata = self.buf.take(BufferId::CData);
						self.emit_node(Event::CData(cdata));
					}
					self.emit_node(Event::CloseCData);
					self.state = State::Text;
				} else if c == ']' {
					self.buf[BufferId::CData].push(']');
				} else {
					self.buf[BufferId::CData].push_str("]]");
					self.buf[BufferId::CData].push(c);
					self.state = State::CData;
				}
			}
			State::ProcInst => {
				if c == '?' {
					self.state = State::ProcInstEnding;
				} else if is_whitespace(c) {
					self.state = State::ProcInstBody;
				} else {
					self.buf[BufferId::ProcInstName].push(c);
				}
			}
			State::ProcInstBody => {
				if self.buf[BufferId::ProcInstBody].is_empty() && is_whitespace(c) {
					// skip the whitespace separating target and body
				} else if c == '?' {
					self.state = State::ProcInstEnding;
				} else {
					self.buf[BufferId::ProcInstBody].push(c);
				}
			}
			State::ProcInstEnding => {
				if c == '>' {
					let name = SmartString::from(self.buf.take(BufferId::ProcInstName));
					let body = self.buf.take(BufferId::ProcInstBody);
					self.emit_node(Event::ProcessingInstruction { name, body });
					self.state = State::Text;
				} else {
					self.buf[BufferId::ProcInstBody].push('?');
					self.buf[BufferId::ProcInstBody].push(c);
					self.state = State::ProcInstBody;
				}
			}
			State::OpenTag => {
				if is_name_body(c) {
					self.buf[BufferId::TagName].push(c);
				} else {
					self.new_tag();
					if c == '>' {
						self.open_tag(false);
					} else if c == '/' {
						self.state = State::OpenTagSlash;
					} else {
						if !is_whitespace(c) {
							self.strict_fail(SyntaxError::InvalidTagNameChar);
						}
						self.state = State::Attrib;
					}
				}
			}
			State::OpenTagSlash => {
				if c == '>' {
					self.open_tag(true);
					self.close_tag();
				} else {
					self.strict_fail(StructureError::SlashWithoutGt);
					self.state = State::Attrib;
				}
			}
			State::Attrib => {
				if is_whitespace(c) {
				} else if c == '>' {
					self.open_tag(false);
				} else if c == '/' {
					self.state = State::OpenTagSlash;
				} else if is_name_start(c) {
					self.buf[BufferId::AttribName].clear();
					self.buf[BufferId::AttribName].push(c);
					self.buf[BufferId::AttribValue].clear();
					self.state = State::AttribName;
				} else {
					self.strict_fail(SyntaxError::InvalidAttribName);
				}
			}
			State::AttribName => {
				if c == '=' {
					self.state = State::AttribValue;
				} else if c == '>' {
					self.strict_fail(SyntaxError::AttribWithoutValue);
					// legacy HTML-ish: the value is the name
					let value = self.buf[BufferId::AttribName].clone();
					self.buf[BufferId::AttribValue] = value;
					self.attrib();
					self.open_tag(false);
				} else if is_whitespace(c) {
					self.state = State::AttribNameSawWhite;
				} else if is_name_body(c) {
					self.buf[BufferId::AttribName].push(c);
				} else {
					self.strict_fail(SyntaxError::InvalidAttribName);
				}
			}
			State::AttribNameSawWhite => {
				if c == '=' {
					self.state = State::AttribValue;
				} else if is_whitespace(c) {
				} else {
					self.strict_fail(SyntaxError::AttribWithoutValue);
					self.buf[BufferId::AttribValue].clear();
					self.attrib();
					if c == '>' {
						self.open_tag(false);
					} else if is_name_start(c) {
						self.buf[BufferId::AttribName].push(c);
						self.state = State::AttribName;
					} else {
						self.strict_fail(SyntaxError::InvalidAttribName);
						self.state = State::Attrib;
					}
				}
			}
			State::AttribValue => {
				if is_whitespace(c) {
				} else if is_quote(c) {
					self.q = Some(c);
					self.state = State::AttribValueQuoted;
				} else {
					self.strict_fail(SyntaxError::UnquotedAttribValue);
					self.state = State::AttribValueUnquoted;
					self.buf[BufferId::AttribValue].push(c);
				}
			}
			State::AttribValueQuoted => {
				if Some(c) != self.q {
					if c == '&' {
						self.state = State::AttribValueEntityQ;
					} else {
						self.buf[BufferId::AttribValue].push(c);
					}
				} else {
					self.attrib();
					self.q = None;
					self.state = State::AttribValueClosed;
				}
			}
			State::AttribValueClosed => {
				if is_whitespace(c) {
					self.state = State::Attrib;
				} else if c == '>' {
					self.open_tag(false);
				} else if c == '/' {
					self.state = State::OpenTagSlash;
				} else if is_name_start(c) {
					self.strict_fail(SyntaxError::NoWhitespaceBetweenAttribs);
					self.buf[BufferId::AttribName].clear();
					self.buf[BufferId::AttribName].push(c);
					self.buf[BufferId::AttribValue].clear();
					self.state = State::AttribName;
				} else {
					self.strict_fail(SyntaxError::InvalidAttribName);
				}
			}
			State::AttribValueUnquoted => {
				if !is_attrib_end(c) {
					if c == '&' {
						self.state = State::AttribValueEntityU;
					} else {
						self.buf[BufferId::AttribValue].push(c);
					}
				} else {
					self.attrib();
					if c == '>' {
						self.open_tag(false);
					} else {
						self.state = State::Attrib;
					}
				}
			}
			State::CloseTag => self.close_tag_char(c),
			State::CloseTagSawWhite => {
				if !is_whitespace(c) {
					if c == '>' {
						self.close_tag();
					} else {
						self.strict_fail(SyntaxError::InvalidCloseTagChars);
					}
				}
			}
			State::TextEntity | State::AttribValueEntityQ | State::AttribValueEntityU => {
				let (ret, target) = match self.state {
					State::TextEntity => (State::Text, BufferId::TextNode),
					State::AttribValueEntityQ => {
						(State::AttribValueQuoted, BufferId::AttribValue)
					}
					_ => (State::AttribValueUnquoted, BufferId::AttribValue),
				};
				let acceptable = if self.buf[BufferId::Entity].is_empty() {
					is_entity_start(c)
				} else {
					is_entity_body(c)
				};
				if c == ';' {
					let expansion = self.parse_entity();
					self.buf[target].push_str(&expansion);
					self.buf[BufferId::Entity].clear();
					self.state = ret;
				} else if acceptable {
					self.buf[BufferId::Entity].push(c);
				} else {
					self.strict_fail(SyntaxError::InvalidCharEntity);
					let entity = self.buf.take(BufferId::Entity);
					let buf = &mut self.buf[target];
					buf.push('&');
					buf.push_str(&entity);
					buf.push(c);
					self.state = ret;
				}
			}
		}
	}

	fn begin_whitespace_char(&mut self, c: char) {
		if c == '<' {
			self.state = State::OpenWaka;
			self.start_tag_position = self.location.offset;
		} else if !is_whitespace(c) {
			self.strict_fail(SyntaxError::NonWhitespaceBeforeFirstTag);
			self.buf[BufferId::TextNode].push(c);
			self.state = State::Text;
		}
	}

	fn text_char(&mut self, c: char, data: &str, i: &mut usize) {
		if self.saw_root && !self.closed_root && c != '<' && c != '&' {
			// bulk-append everything up to the next markup or reference;
			// both delimiters are ASCII, so a byte scan is safe in UTF-8
			let start = *i - c.len_utf8();
			let end = match memchr2(b'<', b'&', &data.as_bytes()[*i..]) {
				Some(n) => *i + n,
				None => data.len(),
			};
			self.buf[BufferId::TextNode].push_str(&data[start..end]);
			self.advance_span(&data[*i..end]);
			*i = end;
			return;
		}
		if c == '<' && !(self.saw_root && self.closed_root && !self.strict) {
			self.state = State::OpenWaka;
			self.start_tag_position = self.location.offset;
		} else {
			if !is_whitespace(c) && (!self.saw_root || self.closed_root) {
				self.strict_fail(SyntaxError::TextOutsideRoot);
			}
			if c == '&' {
				self.state = State::TextEntity;
			} else {
				self.buf[BufferId::TextNode].push(c);
			}
		}
	}

	fn open_waka_char(&mut self, c: char) {
		if c == '!' {
			self.state = State::SgmlDecl;
			self.buf[BufferId::SgmlDecl].clear();
		} else if is_whitespace(c) {
			// wait for it...
		} else if is_name_start(c) {
			self.state = State::OpenTag;
			self.buf[BufferId::TagName].clear();
			self.buf[BufferId::TagName].push(c);
		} else if c == '/' {
			self.state = State::CloseTag;
			self.buf[BufferId::TagName].clear();
		} else if c == '?' {
			self.state = State::ProcInst;
			self.buf[BufferId::ProcInstName].clear();
			self.buf[BufferId::ProcInstBody].clear();
		} else {
			self.strict_fail(SyntaxError::UnencodedLt);
			// resynchronise: replay the < as text, restoring any whitespace
			// skipped since it was seen
			self.buf[BufferId::TextNode].push('<');
			if self.start_tag_position + 1 < self.location.offset {
				let pad = self.location.offset - self.start_tag_position - 1;
				for _ in 0..pad {
					self.buf[BufferId::TextNode].push(' ');
				}
			}
			self.buf[BufferId::TextNode].push(c);
			self.state = State::Text;
		}
	}

	fn sgml_decl_char(&mut self, c: char) {
		let mut acc = String::with_capacity(self.buf[BufferId::SgmlDecl].len() + 4);
		acc.push_str(&self.buf[BufferId::SgmlDecl]);
		acc.push(c);
		if acc.eq_ignore_ascii_case("[CDATA[") {
			self.emit_node(Event::OpenCData);
			self.state = State::CData;
			self.buf[BufferId::SgmlDecl].clear();
			self.buf[BufferId::CData].clear();
		} else if self.buf[BufferId::SgmlDecl].is_empty() && c == '-' {
			self.state = State::CommentStarting;
		} else if acc.eq_ignore_ascii_case("DOCTYPE") {
			self.state = State::Doctype;
			if self.doctype_seen || self.saw_root {
				self.strict_fail(StructureError::MisplacedDoctype);
			}
			self.buf[BufferId::Doctype].clear();
			self.buf[BufferId::SgmlDecl].clear();
		} else if c == '>' {
			let decl = self.buf.take(BufferId::SgmlDecl);
			self.emit_node(Event::SgmlDeclaration(decl));
			self.state = State::Text;
		} else if is_quote(c) {
			self.state = State::SgmlDeclQuoted;
			self.q = Some(c);
			self.buf[BufferId::SgmlDecl].push(c);
		} else {
			self.buf[BufferId::SgmlDecl].push(c);
		}
	}

	fn close_tag_char(&mut self, c: char) {
		if self.buf[BufferId::TagName].is_empty() {
			if is_whitespace(c) {
			} else if !is_name_start(c) {
				if !self.buf[BufferId::Script].is_empty() {
					self.buf[BufferId::Script].push_str("</");
					self.buf[BufferId::Script].push(c);
					self.state = State::Script;
				} else {
					self.strict_fail(SyntaxError::InvalidCloseTagName);
				}
			} else {
				self.buf[BufferId::TagName].push(c);
			}
		} else if c == '>' {
			self.close_tag();
		} else if is_name_body(c) {
			self.buf[BufferId::TagName].push(c);
		} else if !self.buf[BufferId::Script].is_empty() {
			// a non-matching closer inside raw script content stays content
			let name = self.buf.take(BufferId::TagName);
			let script = &mut self.buf[BufferId::Script];
			script.push_str("</");
			script.push_str(&name);
			script.push(c);
			self.state = State::Script;
		} else {
			if !is_whitespace(c) {
				self.strict_fail(SyntaxError::InvalidCloseTagChars);
			}
			self.state = State::CloseTagSawWhite;
		}
	}

	/// Resolve the buffered entity name to its expansion.
	///
	/// Lookup order: exact table hit, lowercased table hit, character
	/// reference. A malformed reference strict-fails and yields the literal
	/// `&name;` text.
	fn parse_entity(&mut self) -> String {
		let entity = self.buf[BufferId::Entity].clone();
		if let Some(c) = (self.entity_lookup)(&entity) {
			return c.to_string();
		}
		let folded = entity.to_lowercase();
		if let Some(c) = (self.entity_lookup)(&folded) {
			return c.to_string();
		}
		if let Some(rest) = folded.strip_prefix('#') {
			let (digits, radix) = match rest.strip_prefix('x') {
				Some(hex) => (hex, 16),
				None => (rest, 10),
			};
			// the reference is valid iff the number round-trips to the
			// digit string (modulo leading zeros) in the same radix
			let stripped = digits.trim_start_matches('0');
			if let Ok(num) = u32::from_str_radix(digits, radix) {
				let canonical = if radix == 16 {
					format!("{:x}", num)
				} else {
					num.to_string()
				};
				if canonical == stripped {
					if let Some(c) = char::from_u32(num) {
						return c.to_string();
					}
				}
			}
		}
		self.strict_fail(SyntaxError::InvalidCharEntity);
		format!("&{};", entity)
	}

	/// The bindings a tag declares itself: everything in its map which the
	/// parent scope does not already bind to the same URI. Sorted by prefix
	/// so emission order is stable.
	fn ns_delta(ns: &NamespaceMap, parent: &NamespaceMap) -> Vec<(SmartString, SmartString)> {
		let mut delta: Vec<_> = ns
			.iter()
			.filter(|&(p, u)| parent.get(p.as_str()) != Some(u))
			.map(|(p, u)| (p.clone(), u.clone()))
			.collect();
		delta.sort();
		delta
	}

	/// The bindings in scope for a tag about to be opened (or the parent of
	/// the tag just popped).
	fn parent_ns(&self) -> NamespaceMap {
		for t in self.tags.iter().rev() {
			if let Some(ns) = t.ns.as_ref() {
				return ns.clone();
			}
		}
		self.root_ns.clone()
	}

	fn loose_case(&self, s: &str) -> String {
		if self.opt.lowercase {
			s.to_lowercase()
		} else {
			s.to_uppercase()
		}
	}

	/// The opening tag name is complete: stage the tag and announce it.
	fn new_tag(&mut self) {
		if !self.strict {
			let folded = self.loose_case(&self.buf[BufferId::TagName]);
			self.buf[BufferId::TagName] = folded;
		}
		let name = SmartString::from(self.buf[BufferId::TagName].as_str());
		let ns = if self.opt.xmlns {
			Some(self.parent_ns())
		} else {
			None
		};
		self.tag = Some(Tag::new(name.clone(), ns));
		self.attrib_list.clear();
		self.emit_node(Event::OpenTagStart { name });
	}

	/// An attribute value is complete: deduplicate, record namespace
	/// declarations, and either stage (namespace mode) or emit immediately.
	fn attrib(&mut self) {
		if !self.strict {
			let folded = self.loose_case(&self.buf[BufferId::AttribName]);
			self.buf[BufferId::AttribName] = folded;
		}
		let name = SmartString::from(self.buf[BufferId::AttribName].as_str());
		let duplicate = self.attrib_list.iter().any(|(n, _)| *n == name)
			|| self
				.tag
				.as_ref()
				.map(|t| t.attributes.contains_key(&name))
				.unwrap_or(false);
		if duplicate {
			self.buf[BufferId::AttribName].clear();
			self.buf[BufferId::AttribValue].clear();
			return;
		}
		let value = self.buf.take(BufferId::AttribValue);
		self.buf[BufferId::AttribName].clear();
		if self.opt.xmlns {
			let (prefix, local) = split_qname(&name, true);
			if prefix.as_str() == "xmlns" {
				// namespace declaration; the reserved prefixes cannot be
				// rebound
				if local.as_str() == "xml" && value != XML_NAMESPACE {
					self.strict_fail(NamespaceError::XmlPrefixRebound);
				} else if local.as_str() == "xmlns" && value != XMLNS_NAMESPACE {
					self.strict_fail(NamespaceError::XmlnsPrefixRebound);
				} else {
					let tag = self.tag.as_mut().unwrap();
					if let Some(ns) = tag.ns.as_mut() {
						// clones the shared parent map on first insertion
						Rc::make_mut(ns).insert(local, SmartString::from(value.as_str()));
					}
				}
			}
			self.attrib_list.push((name, value));
		} else {
			let attr = Attribute::plain(name.clone(), value);
			let tag = self.tag.as_mut().unwrap();
			tag.attributes.insert(name, attr.clone());
			self.emit_node(Event::Attribute(attr));
		}
	}

	/// The element header is complete: qualify, resolve staged attributes,
	/// push onto the stack and announce.
	fn open_tag(&mut self, self_closing: bool) {
		let mut tag = self.tag.take().unwrap();
		if self.opt.xmlns {
			let (prefix, local) = split_qname(&self.buf[BufferId::TagName], false);
			let mut uri = tag
				.ns
				.as_ref()
				.and_then(|ns| ns.get(prefix.as_str()))
				.cloned()
				.unwrap_or_default();
			if !prefix.is_empty() && uri.is_empty() {
				self.strict_fail(NamespaceError::UnboundPrefix(prefix.clone()));
				uri = prefix.clone();
			}
			tag.prefix = Some(prefix);
			tag.local = Some(local);
			tag.uri = Some(uri);
			let parent = self.parent_ns();
			if let Some(ns) = tag.ns.as_ref() {
				if !Rc::ptr_eq(ns, &parent) {
					for (prefix, uri) in Self::ns_delta(ns, &parent) {
						self.emit_node(Event::OpenNamespace { prefix, uri });
					}
				}
			}
			// every binding on the tag is known now; resolve the staged
			// attributes
			let staged: Vec<_> = self.attrib_list.drain(..).collect();
			for (name, value) in staged {
				let (prefix, local) = split_qname(&name, true);
				let mut uri = if prefix.is_empty() {
					// attributes do not take the default namespace
					SmartString::new()
				} else {
					tag.ns
						.as_ref()
						.and_then(|ns| ns.get(prefix.as_str()))
						.cloned()
						.unwrap_or_default()
				};
				if !prefix.is_empty() && prefix.as_str() != "xmlns" && uri.is_empty() {
					self.strict_fail(NamespaceError::UnboundPrefix(prefix.clone()));
					uri = prefix.clone();
				}
				let attr = Attribute {
					name: name.clone(),
					value,
					prefix: Some(prefix),
					local: Some(local),
					uri: Some(uri),
				};
				tag.attributes.insert(name, attr.clone());
				self.emit_node(Event::Attribute(attr));
			}
		}
		tag.self_closing = self_closing;
		self.saw_root = true;
		self.tags.push(tag.clone());
		self.emit_node(Event::OpenTag(tag));
		if !self_closing {
			if !self.noscript && self.buf[BufferId::TagName].eq_ignore_ascii_case("script") {
				self.state = State::Script;
			} else {
				self.state = State::Text;
			}
			self.buf[BufferId::TagName].clear();
		}
		self.buf[BufferId::AttribName].clear();
		self.buf[BufferId::AttribValue].clear();
		self.attrib_list.clear();
	}

	/// A closing tag is complete: find the matching open tag, popping (and
	/// complaining about) anything opened in between.
	fn close_tag(&mut self) {
		if self.buf[BufferId::TagName].is_empty() {
			self.strict_fail(StructureError::EmptyCloseTag);
			self.buf[BufferId::TextNode].push_str("</>");
			self.state = State::Text;
			return;
		}
		if !self.buf[BufferId::Script].is_empty() {
			if self.buf[BufferId::TagName] != "script" {
				let name = self.buf.take(BufferId::TagName);
				let script = &mut self.buf[BufferId::Script];
				script.push_str("</");
				script.push_str(&name);
				script.push('>');
				self.state = State::Script;
				return;
			}
			let script = self.buf.take(BufferId::Script);
			self.emit_node(Event::Script(script));
		}
		let mut tag_name = self.buf.take(BufferId::TagName);
		if !self.strict {
			tag_name = self.loose_case(&tag_name);
		}
		let name = SmartString::from(tag_name.as_str());
		let mut matched = None;
		for t in (0..self.tags.len()).rev() {
			if self.tags[t].name == name {
				matched = Some(t);
				break;
			}
			self.recoverable_fail(StructureError::UnexpectedCloseTag);
		}
		let t = match matched {
			None => {
				self.recoverable_fail(StructureError::UnmatchedCloseTag(name.clone()));
				let text = &mut self.buf[BufferId::TextNode];
				text.push_str("</");
				text.push_str(&name);
				text.push('>');
				self.state = State::Text;
				return;
			}
			Some(t) => t,
		};
		while self.tags.len() > t {
			let tag = self.tags.pop().unwrap();
			self.emit_node(Event::CloseTag(tag.name.clone()));
			if self.opt.xmlns {
				let parent = self.parent_ns();
				if let Some(ns) = tag.ns.as_ref() {
					if !Rc::ptr_eq(ns, &parent) {
						for (prefix, uri) in Self::ns_delta(ns, &parent) {
							self.emit_node(Event::CloseNamespace { prefix, uri });
						}
					}
				}
			}
		}
		if t == 0 {
			self.closed_root = true;
		}
		self.buf[BufferId::AttribName].clear();
		self.buf[BufferId::AttribValue].clear();
		self.attrib_list.clear();
		self.state = State::Text;
	}
}
