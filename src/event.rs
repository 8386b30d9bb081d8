/*!
# Parse events and the sink contract

The term *event* is borrowed from SAX terminology: each [`Event`] refers to a
bit of document structure the parser has recognised. Events are delivered
synchronously, in document order, to an [`EventSink`] owned by the parser;
pending character data is always flushed as [`Event::Text`] before any
structural event.

Within one element header the order is `OpenTagStart`, then any
`OpenNamespace`, then one `Attribute` per attribute in source order, then
`OpenTag`.
*/
use std::collections::VecDeque;

use smartstring::alias::String as SmartString;

use crate::error::ParseError;
use crate::tag::{Attribute, Tag};

/// A logical part of the XML document, or a parser lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
	/// The parser was (re)set and is ready for a document.
	Ready,
	/// Character data. Subject to the `trim`/`normalize` options.
	Text(String),
	/// Contents of `<!DOCTYPE …>`, without the delimiters.
	Doctype(String),
	/// `<?name body?>`.
	ProcessingInstruction { name: SmartString, body: String },
	/// An SGML declaration other than a doctype, comment or CDATA section.
	SgmlDeclaration(String),
	/// `<![CDATA[` was recognised.
	OpenCData,
	/// A chunk of CDATA content. Large sections may be split.
	CData(String),
	/// `]]>` was recognised.
	CloseCData,
	/// Contents of `<!-- … -->`. Subject to the `trim`/`normalize` options.
	Comment(String),
	/// An element header has begun; attributes are not known yet.
	OpenTagStart { name: SmartString },
	/// One attribute, in source order.
	Attribute(Attribute),
	/// A namespace binding came into scope on the tag being opened.
	OpenNamespace { prefix: SmartString, uri: SmartString },
	/// A namespace binding went out of scope with the tag just closed.
	CloseNamespace { prefix: SmartString, uri: SmartString },
	/// An element header is complete.
	OpenTag(Tag),
	/// An element was closed (explicitly or by `/>`).
	CloseTag(SmartString),
	/// Raw content of a `<script>` element (lenient mode only).
	Script(String),
	/// A violation was detected; see [`crate::error`] for the latching
	/// rules.
	Error(ParseError),
	/// The document is complete.
	End,
}

/// Receiver for parse events.
///
/// The parser owns its sink and calls it synchronously from inside
/// [`write`](crate::Parser::write); implementations must not assume events
/// arrive in any other way.
pub trait EventSink {
	fn event(&mut self, event: Event);
}

/// Any `FnMut(Event)` closure is a sink.
impl<F: FnMut(Event)> EventSink for F {
	fn event(&mut self, event: Event) {
		self(event)
	}
}

/// A sink which queues events for later inspection.
///
/// Useful for tests and for pull-style consumption: write a chunk, then
/// drain the collector.
#[derive(Debug, Default)]
pub struct EventCollector {
	events: VecDeque<Event>,
}

impl EventCollector {
	pub fn new() -> EventCollector {
		EventCollector::default()
	}

	/// Remove and return the oldest queued event.
	pub fn pop(&mut self) -> Option<Event> {
		self.events.pop_front()
	}

	/// Number of queued events.
	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Consume the collector, returning every queued event in order.
	pub fn into_events(self) -> Vec<Event> {
		self.events.into()
	}
}

impl EventSink for EventCollector {
	fn event(&mut self, event: Event) {
		self.events.push_back(event);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn collector_preserves_order() {
		let mut sink = EventCollector::new();
		sink.event(Event::Ready);
		sink.event(Event::Text("a".into()));
		sink.event(Event::End);
		assert_eq!(sink.len(), 3);
		assert_eq!(sink.pop(), Some(Event::Ready));
		assert_eq!(
			sink.into_events(),
			vec![Event::Text("a".into()), Event::End]
		);
	}

	#[test]
	fn closures_are_sinks() {
		let mut seen = 0usize;
		{
			let mut cb = |_ev: Event| seen += 1;
			cb.event(Event::Ready);
			cb.event(Event::End);
		}
		assert_eq!(seen, 2);
	}
}
