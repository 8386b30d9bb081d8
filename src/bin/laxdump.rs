use std::env;
use std::fs::File;
use std::io::{stdin, Read};
use std::process::ExitCode;

use laxml::{Event, EventCollector, Parser, ParserOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
	println!("laxdump (laxml) v{}", VERSION);
}

fn print_usage() {
	println!(concat!(
		"Usage: laxdump [OPTIONS] [FILE.xml...]\n",
		"This tool dumps the event stream of XML documents. Without files,\n",
		"it reads from the standard input.\n",
		"Options:\n",
		"  -s, --strict     Parse strictly instead of leniently\n",
		"  -n, --xmlns      Resolve namespaces\n",
		"  -q, --quiet      Print errors only\n",
		"  -h, --help       Display this help message and exit\n",
		"  -v, --version    Display the version and exit",
	));
}

struct Settings {
	strict: bool,
	xmlns: bool,
	quiet: bool,
}

fn describe(ev: &Event) -> Option<String> {
	match ev {
		Event::Ready | Event::End => None,
		Event::Text(t) => Some(format!("text {:?}", t)),
		Event::Doctype(d) => Some(format!("doctype {:?}", d)),
		Event::ProcessingInstruction { name, body } => {
			Some(format!("pi {} {:?}", name, body))
		}
		Event::SgmlDeclaration(d) => Some(format!("sgmldecl {:?}", d)),
		Event::OpenCData => Some("cdata-open".to_string()),
		Event::CData(t) => Some(format!("cdata {:?}", t)),
		Event::CloseCData => Some("cdata-close".to_string()),
		Event::Comment(t) => Some(format!("comment {:?}", t)),
		Event::OpenTagStart { .. } => None,
		Event::Attribute(a) => Some(format!("  attribute {}={:?}", a.name, a.value)),
		Event::OpenNamespace { prefix, uri } => {
			Some(format!("namespace-open {}={:?}", prefix, uri))
		}
		Event::CloseNamespace { prefix, uri } => {
			Some(format!("namespace-close {}={:?}", prefix, uri))
		}
		Event::OpenTag(tag) => Some(format!(
			"open {}{}",
			tag.name,
			if tag.self_closing { " (self-closing)" } else { "" }
		)),
		Event::CloseTag(name) => Some(format!("close {}", name)),
		Event::Script(s) => Some(format!("script {:?}", s)),
		Event::Error(e) => Some(format!("error: {}", e)),
	}
}

fn dump(name: &str, text: &str, settings: &Settings) -> bool {
	let opt = ParserOptions::default()
		.xmlns(settings.xmlns)
		.track_position(true);
	let mut parser = Parser::with_options(settings.strict, opt, EventCollector::new());
	let mut clean = true;
	let write_result = parser.write(text);
	parser.end();
	for ev in parser.into_sink().into_events() {
		let is_error = matches!(ev, Event::Error(_));
		if is_error {
			clean = false;
		}
		if settings.quiet && !is_error {
			continue;
		}
		if let Some(line) = describe(&ev) {
			println!("{}: {}", name, line);
		}
	}
	if write_result.is_err() {
		clean = false;
	}
	clean
}

fn dump_file(path: &str, settings: &Settings) -> bool {
	let mut text = String::new();
	let result = if path == "-" {
		stdin().read_to_string(&mut text)
	} else {
		match File::open(path) {
			Ok(mut file) => file.read_to_string(&mut text),
			Err(e) => {
				eprintln!("laxdump: cannot open {}: {}", path, e);
				return false;
			}
		}
	};
	if let Err(e) = result {
		eprintln!("laxdump: cannot read {}: {}", path, e);
		return false;
	}
	dump(path, &text, settings)
}

fn main() -> ExitCode {
	let mut settings = Settings {
		strict: false,
		xmlns: false,
		quiet: false,
	};
	let mut files: Vec<String> = Vec::new();
	for arg in env::args().skip(1) {
		if !arg.starts_with('-') || arg == "-" {
			files.push(arg);
			continue;
		}
		match arg.as_str() {
			"-s" | "--strict" => settings.strict = true,
			"-n" | "--xmlns" => settings.xmlns = true,
			"-q" | "--quiet" => settings.quiet = true,
			"-h" | "--help" => {
				print_usage();
				return ExitCode::SUCCESS;
			}
			"-v" | "--version" => {
				print_version();
				return ExitCode::SUCCESS;
			}
			other => {
				eprintln!("laxdump: unknown option {}", other);
				print_usage();
				return ExitCode::FAILURE;
			}
		}
	}
	if files.is_empty() {
		files.push("-".to_string());
	}
	let mut clean = true;
	for file in &files {
		if !dump_file(file, &settings) {
			clean = false;
		}
	}
	if clean {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	}
}
