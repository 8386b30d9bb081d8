/*!
# Error types

This module holds the error types emitted through [`Event::Error`] and
returned by the driver methods of [`Parser`].

In strict mode every violation latches: the error is stored inside the
parser, delivered as an event, and every following [`Parser::write`] call
fails with the same error until [`Parser::resume`] clears it. In lenient mode
most violations are recovered silently; only the close-tag mismatch
diagnostics are surfaced (without latching).

   [`Event::Error`]: crate::Event::Error
   [`Parser`]: crate::Parser
   [`Parser::write`]: crate::Parser::write
   [`Parser::resume`]: crate::Parser::resume
*/
use std::error;
use std::fmt;
use std::result::Result as StdResult;

use smartstring::alias::String as SmartString;

use crate::location::Location;

/// Violation of the lexical grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
	/// Non-whitespace character data before the first tag.
	NonWhitespaceBeforeFirstTag,
	/// Character data outside of the root element.
	TextOutsideRoot,
	/// A `<` which does not open any markup.
	UnencodedLt,
	/// `--` inside a comment body.
	MalformedComment,
	/// Unexpected character while lexing a tag name.
	InvalidTagNameChar,
	/// Unexpected character while lexing an attribute name.
	InvalidAttribName,
	/// Attribute value without surrounding quotes.
	UnquotedAttribValue,
	/// Attribute name not followed by `=`.
	AttribWithoutValue,
	/// Two attributes without whitespace between them.
	NoWhitespaceBetweenAttribs,
	/// Entity reference which names no known entity or a malformed
	/// character reference.
	InvalidCharEntity,
	/// Unexpected character while lexing a closing tag name.
	InvalidCloseTagName,
	/// Trailing garbage between a closing tag name and `>`.
	InvalidCloseTagChars,
}

impl error::Error for SyntaxError {}

impl fmt::Display for SyntaxError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NonWhitespaceBeforeFirstTag => f.write_str("Non-whitespace before first tag"),
			Self::TextOutsideRoot => f.write_str("Text data outside of root node"),
			Self::UnencodedLt => f.write_str("Unencoded <"),
			Self::MalformedComment => f.write_str("Malformed comment"),
			Self::InvalidTagNameChar => f.write_str("Invalid character in tag name"),
			Self::InvalidAttribName => f.write_str("Invalid attribute name"),
			Self::UnquotedAttribValue => f.write_str("Unquoted attribute value"),
			Self::AttribWithoutValue => f.write_str("Attribute without value"),
			Self::NoWhitespaceBetweenAttribs => f.write_str("No whitespace between attributes"),
			Self::InvalidCharEntity => f.write_str("Invalid character entity"),
			Self::InvalidCloseTagName => f.write_str("Invalid tagname in closing tag"),
			Self::InvalidCloseTagChars => f.write_str("Invalid characters in closing tag"),
		}
	}
}

/// Violation of document structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
	/// `<!DOCTYPE` after the root element or after another doctype.
	MisplacedDoctype,
	/// A closing tag which skips over still-open elements.
	UnexpectedCloseTag,
	/// A closing tag with no matching open element on the stack.
	UnmatchedCloseTag(SmartString),
	/// End of document with the root element still open.
	UnclosedRootTag,
	/// The closing tag `</>`.
	EmptyCloseTag,
	/// `/` inside an opening tag not followed by `>`.
	SlashWithoutGt,
}

impl error::Error for StructureError {}

impl fmt::Display for StructureError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MisplacedDoctype => f.write_str("Inappropriately located doctype declaration"),
			Self::UnexpectedCloseTag => f.write_str("Unexpected close tag"),
			Self::UnmatchedCloseTag(name) => write!(f, "Unmatched closing tag: {}", name),
			Self::UnclosedRootTag => f.write_str("Unclosed root tag"),
			Self::EmptyCloseTag => f.write_str("Weird empty close tag"),
			Self::SlashWithoutGt => {
				f.write_str("Forward-slash in opening tag not followed by >")
			}
		}
	}
}

/// Violation of the namespace binding rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
	/// Use of a prefix with no binding in scope.
	UnboundPrefix(SmartString),
	/// `xmlns:xml` bound to something other than the XML namespace.
	XmlPrefixRebound,
	/// `xmlns:xmlns` bound to something other than the XMLNS namespace.
	XmlnsPrefixRebound,
}

impl error::Error for NamespaceError {}

impl fmt::Display for NamespaceError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnboundPrefix(prefix) => write!(f, "Unbound namespace prefix: {}", prefix),
			Self::XmlPrefixRebound => write!(
				f,
				"xml: prefix must be bound to {}",
				crate::tag::XML_NAMESPACE
			),
			Self::XmlnsPrefixRebound => write!(
				f,
				"xmlns: prefix must be bound to {}",
				crate::tag::XMLNS_NAMESPACE
			),
		}
	}
}

/// All error conditions the parser can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
	/// Lexical violation.
	Syntax(SyntaxError),
	/// Structural violation.
	Structure(StructureError),
	/// Namespace binding violation.
	Namespace(NamespaceError),
	/// A non-flushable buffer exceeded [`MAX_BUFFER_LENGTH`]. Fatal; the
	/// contained name identifies the buffer.
	///
	///   [`MAX_BUFFER_LENGTH`]: crate::MAX_BUFFER_LENGTH
	BufferOverflow(&'static str),
	/// [`Parser::write`](crate::Parser::write) called on a closed parser.
	WriteAfterClose,
	/// End of document in the middle of a construct.
	UnexpectedEnd,
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Syntax(e) => fmt::Display::fmt(e, f),
			Self::Structure(e) => fmt::Display::fmt(e, f),
			Self::Namespace(e) => fmt::Display::fmt(e, f),
			Self::BufferOverflow(buffer) => {
				write!(f, "Max buffer length exceeded: {}", buffer)
			}
			Self::WriteAfterClose => f.write_str("Cannot write after close"),
			Self::UnexpectedEnd => f.write_str("Unexpected end"),
		}
	}
}

impl From<SyntaxError> for ErrorKind {
	fn from(e: SyntaxError) -> ErrorKind {
		ErrorKind::Syntax(e)
	}
}

impl From<StructureError> for ErrorKind {
	fn from(e: StructureError) -> ErrorKind {
		ErrorKind::Structure(e)
	}
}

impl From<NamespaceError> for ErrorKind {
	fn from(e: NamespaceError) -> ErrorKind {
		ErrorKind::Namespace(e)
	}
}

/// An error as delivered to the event sink and latched inside the parser.
///
/// The location is attached iff the parser tracks positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
	pub kind: ErrorKind,
	pub location: Option<Location>,
}

impl ParseError {
	pub(crate) fn new(kind: ErrorKind, location: Option<Location>) -> ParseError {
		ParseError { kind, location }
	}
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.location {
			Some(loc) => write!(f, "{} ({})", self.kind, loc),
			None => fmt::Display::fmt(&self.kind, f),
		}
	}
}

impl error::Error for ParseError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match &self.kind {
			ErrorKind::Syntax(e) => Some(e),
			ErrorKind::Structure(e) => Some(e),
			ErrorKind::Namespace(e) => Some(e),
			ErrorKind::BufferOverflow(_)
			| ErrorKind::WriteAfterClose
			| ErrorKind::UnexpectedEnd => None,
		}
	}
}

pub type Result<T> = StdResult<T, ParseError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_match_the_documented_texts() {
		assert_eq!(
			SyntaxError::NonWhitespaceBeforeFirstTag.to_string(),
			"Non-whitespace before first tag"
		);
		assert_eq!(
			StructureError::UnmatchedCloseTag("a".into()).to_string(),
			"Unmatched closing tag: a"
		);
		assert_eq!(
			ErrorKind::BufferOverflow("comment").to_string(),
			"Max buffer length exceeded: comment"
		);
	}

	#[test]
	fn display_appends_the_location_when_present() {
		let mut loc = Location::new();
		for c in "ab\nc".chars() {
			loc.advance(c);
		}
		let err = ParseError::new(SyntaxError::UnencodedLt.into(), Some(loc));
		assert_eq!(err.to_string(), "Unencoded < (line 1, column 1, char 4)");
		let bare = ParseError::new(SyntaxError::UnencodedLt.into(), None);
		assert_eq!(bare.to_string(), "Unencoded <");
	}
}
