/*!
# Lenient streaming SAX parsing for XML 1.0

This crate provides a push-style, event-emitting parser for XML 1.0
documents with optional SGML-ish leniency.

## Features (some call them anti-features)

* Streamed parsing: text is pushed in arbitrarily sized chunks, events come
  out; no document tree is ever built
* Lenient by default: recovers from unquoted values, mismatched closing
  tags, stray `<`, HTML-style `<script>` blocks and friends
* Strict mode for well-formedness enforcement with latched, resumable errors
* Optional namespace resolution with qualified tags and attributes
* Built-in HTML 4 named entities (or just the XML five, if you insist)
* Optional line/column tracking for diagnostics
* No DTD processing, no external resources, no encoding detection: input is
  already-decoded text

## Example

```
use laxml::{Event, EventCollector, Parser};

let mut parser = Parser::new(EventCollector::new());
parser.write("<hello>Wor").unwrap();
parser.write("ld!</hello>").unwrap();
parser.end();
for ev in parser.into_sink().into_events() {
	println!("got event: {:?}", ev);
}
```

## Push-based usage

[`Parser`] owns an [`EventSink`] and calls it synchronously from inside
[`Parser::write`]. Any `FnMut(Event)` closure is a sink; [`EventCollector`]
queues events for pull-style draining between writes.

## Strictness

A parser built with [`Parser::with_options`] and `strict = true` latches the
first violation: the error is emitted as [`Event::Error`], and every
subsequent [`Parser::write`] fails with it until [`Parser::resume`] is
called. The lenient mode applies the recovery rules documented on
[`Parser`] instead.
*/

mod buffers;
mod entities;
pub mod error;
mod event;
mod location;
mod parser;
mod selectors;
mod tag;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use error::{ErrorKind, NamespaceError, ParseError, Result, StructureError, SyntaxError};
#[doc(inline)]
pub use event::{Event, EventCollector, EventSink};
pub use location::Location;
#[doc(inline)]
pub use parser::{Parser, ParserOptions, MAX_BUFFER_LENGTH};
pub use tag::{Attribute, NamespaceMap, Tag, XMLNS_NAMESPACE, XML_NAMESPACE};

/// Package version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
