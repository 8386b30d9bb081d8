/*!
# Named entity tables

Two static lookup tables are available: the five entities predefined by
XML 1.0 § 4.6, and the full HTML 4 set used when the parser runs with its
default lenient entity handling. Which table a parser uses is decided once at
construction from the `strict_entities` option.

Character references (`&#dd;` / `&#xhh;`) are not handled here; decoding and
canonical-form checking for those live in the parser, next to the strict-fail
reporting they need.
*/

/// Lookup signature shared by both tables.
pub(crate) type EntityLookup = fn(&str) -> Option<char>;

/// The XML 1.0 predefined entities.
pub(crate) fn predefined(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"gt" => Some('>'),
		"lt" => Some('<'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		_ => None,
	}
}

/// The HTML 4 named character entities.
///
/// Superset of [`predefined`]. Every expansion is a single scalar value.
pub(crate) fn html(name: &str) -> Option<char> {
	if let Some(c) = predefined(name) {
		return Some(c);
	}
	match name {
		// ISO 8859-1 (Latin-1)
		"nbsp" => Some('\u{a0}'),
		"iexcl" => Some('\u{a1}'),
		"cent" => Some('\u{a2}'),
		"pound" => Some('\u{a3}'),
		"curren" => Some('\u{a4}'),
		"yen" => Some('\u{a5}'),
		"brvbar" => Some('\u{a6}'),
		"sect" => Some('\u{a7}'),
		"uml" => Some('\u{a8}'),
		"copy" => Some('\u{a9}'),
		"ordf" => Some('\u{aa}'),
		"laquo" => Some('\u{ab}'),
		"not" => Some('\u{ac}'),
		"shy" => Some('\u{ad}'),
		"reg" => Some('\u{ae}'),
		"macr" => Some('\u{af}'),
		"deg" => Some('\u{b0}'),
		"plusmn" => Some('\u{b1}'),
		"sup2" => Some('\u{b2}'),
		"sup3" => Some('\u{b3}'),
		"acute" => Some('\u{b4}'),
		"micro" => Some('\u{b5}'),
		"para" => Some('\u{b6}'),
		"middot" => Some('\u{b7}'),
		"cedil" => Some('\u{b8}'),
		"sup1" => Some('\u{b9}'),
		"ordm" => Some('\u{ba}'),
		"raquo" => Some('\u{bb}'),
		"frac14" => Some('\u{bc}'),
		"frac12" => Some('\u{bd}'),
		"frac34" => Some('\u{be}'),
		"iquest" => Some('\u{bf}'),
		"Agrave" => Some('\u{c0}'),
		"Aacute" => Some('\u{c1}'),
		"Acirc" => Some('\u{c2}'),
		"Atilde" => Some('\u{c3}'),
		"Auml" => Some('\u{c4}'),
		"Aring" => Some('\u{c5}'),
		"AElig" => Some('\u{c6}'),
		"Ccedil" => Some('\u{c7}'),
		"Egrave" => Some('\u{c8}'),
		"Eacute" => Some('\u{c9}'),
		"Ecirc" => Some('\u{ca}'),
		"Euml" => Some('\u{cb}'),
		"Igrave" => Some('\u{cc}'),
		"Iacute" => Some('\u{cd}'),
		"Icirc" => Some('\u{ce}'),
		"Iuml" => Some('\u{cf}'),
		"ETH" => Some('\u{d0}'),
		"Ntilde" => Some('\u{d1}'),
		"Ograve" => Some('\u{d2}'),
		"Oacute" => Some('\u{d3}'),
		"Ocirc" => Some('\u{d4}'),
		"Otilde" => Some('\u{d5}'),
		"Ouml" => Some('\u{d6}'),
		"times" => Some('\u{d7}'),
		"Oslash" => Some('\u{d8}'),
		"Ugrave" => Some('\u{d9}'),
		"Uacute" => Some('\u{da}'),
		"Ucirc" => Some('\u{db}'),
		"Uuml" => Some('\u{dc}'),
		"Yacute" => Some('\u{dd}'),
		"THORN" => Some('\u{de}'),
		"szlig" => Some('\u{df}'),
		"agrave" => Some('\u{e0}'),
		"aacute" => Some('\u{e1}'),
		"acirc" => Some('\u{e2}'),
		"atilde" => Some('\u{e3}'),
		"auml" => Some('\u{e4}'),
		"aring" => Some('\u{e5}'),
		"aelig" => Some('\u{e6}'),
		"ccedil" => Some('\u{e7}'),
		"egrave" => Some('\u{e8}'),
		"eacute" => Some('\u{e9}'),
		"ecirc" => Some('\u{ea}'),
		"euml" => Some('\u{eb}'),
		"igrave" => Some('\u{ec}'),
		"iacute" => Some('\u{ed}'),
		"icirc" => Some('\u{ee}'),
		"iuml" => Some('\u{ef}'),
		"eth" => Some('\u{f0}'),
		"ntilde" => Some('\u{f1}'),
		"ograve" => Some('\u{f2}'),
		"oacute" => Some('\u{f3}'),
		"ocirc" => Some('\u{f4}'),
		"otilde" => Some('\u{f5}'),
		"ouml" => Some('\u{f6}'),
		"divide" => Some('\u{f7}'),
		"oslash" => Some('\u{f8}'),
		"ugrave" => Some('\u{f9}'),
		"uacute" => Some('\u{fa}'),
		"ucirc" => Some('\u{fb}'),
		"uuml" => Some('\u{fc}'),
		"yacute" => Some('\u{fd}'),
		"thorn" => Some('\u{fe}'),
		"yuml" => Some('\u{ff}'),
		// Latin Extended + spacing modifiers
		"OElig" => Some('\u{152}'),
		"oelig" => Some('\u{153}'),
		"Scaron" => Some('\u{160}'),
		"scaron" => Some('\u{161}'),
		"Yuml" => Some('\u{178}'),
		"fnof" => Some('\u{192}'),
		"circ" => Some('\u{2c6}'),
		"tilde" => Some('\u{2dc}'),
		// Greek
		"Alpha" => Some('\u{391}'),
		"Beta" => Some('\u{392}'),
		"Gamma" => Some('\u{393}'),
		"Delta" => Some('\u{394}'),
		"Epsilon" => Some('\u{395}'),
		"Zeta" => Some('\u{396}'),
		"Eta" => Some('\u{397}'),
		"Theta" => Some('\u{398}'),
		"Iota" => Some('\u{399}'),
		"Kappa" => Some('\u{39a}'),
		"Lambda" => Some('\u{39b}'),
		"Mu" => Some('\u{39c}'),
		"Nu" => Some('\u{39d}'),
		"Xi" => Some('\u{39e}'),
		"Omicron" => Some('\u{39f}'),
		"Pi" => Some('\u{3a0}'),
		"Rho" => Some('\u{3a1}'),
		"Sigma" => Some('\u{3a3}'),
		"Tau" => Some('\u{3a4}'),
		"Upsilon" => Some('\u{3a5}'),
		"Phi" => Some('\u{3a6}'),
		"Chi" => Some('\u{3a7}'),
		"Psi" => Some('\u{3a8}'),
		"Omega" => Some('\u{3a9}'),
		"alpha" => Some('\u{3b1}'),
		"beta" => Some('\u{3b2}'),
		"gamma" => Some('\u{3b3}'),
		"delta" => Some('\u{3b4}'),
		"epsilon" => Some('\u{3b5}'),
		"zeta" => Some('\u{3b6}'),
		"eta" => Some('\u{3b7}'),
		"theta" => Some('\u{3b8}'),
		"iota" => Some('\u{3b9}'),
		"kappa" => Some('\u{3ba}'),
		"lambda" => Some('\u{3bb}'),
		"mu" => Some('\u{3bc}'),
		"nu" => Some('\u{3bd}'),
		"xi" => Some('\u{3be}'),
		"omicron" => Some('\u{3bf}'),
		"pi" => Some('\u{3c0}'),
		"rho" => Some('\u{3c1}'),
		"sigmaf" => Some('\u{3c2}'),
		"sigma" => Some('\u{3c3}'),
		"tau" => Some('\u{3c4}'),
		"upsilon" => Some('\u{3c5}'),
		"phi" => Some('\u{3c6}'),
		"chi" => Some('\u{3c7}'),
		"psi" => Some('\u{3c8}'),
		"omega" => Some('\u{3c9}'),
		"thetasym" => Some('\u{3d1}'),
		"upsih" => Some('\u{3d2}'),
		"piv" => Some('\u{3d6}'),
		// General punctuation
		"ensp" => Some('\u{2002}'),
		"emsp" => Some('\u{2003}'),
		"thinsp" => Some('\u{2009}'),
		"zwnj" => Some('\u{200c}'),
		"zwj" => Some('\u{200d}'),
		"lrm" => Some('\u{200e}'),
		"rlm" => Some('\u{200f}'),
		"ndash" => Some('\u{2013}'),
		"mdash" => Some('\u{2014}'),
		"lsquo" => Some('\u{2018}'),
		"rsquo" => Some('\u{2019}'),
		"sbquo" => Some('\u{201a}'),
		"ldquo" => Some('\u{201c}'),
		"rdquo" => Some('\u{201d}'),
		"bdquo" => Some('\u{201e}'),
		"dagger" => Some('\u{2020}'),
		"Dagger" => Some('\u{2021}'),
		"bull" => Some('\u{2022}'),
		"hellip" => Some('\u{2026}'),
		"permil" => Some('\u{2030}'),
		"prime" => Some('\u{2032}'),
		"Prime" => Some('\u{2033}'),
		"lsaquo" => Some('\u{2039}'),
		"rsaquo" => Some('\u{203a}'),
		"oline" => Some('\u{203e}'),
		"frasl" => Some('\u{2044}'),
		"euro" => Some('\u{20ac}'),
		// Letterlike symbols
		"image" => Some('\u{2111}'),
		"weierp" => Some('\u{2118}'),
		"real" => Some('\u{211c}'),
		"trade" => Some('\u{2122}'),
		"alefsym" => Some('\u{2135}'),
		// Arrows
		"larr" => Some('\u{2190}'),
		"uarr" => Some('\u{2191}'),
		"rarr" => Some('\u{2192}'),
		"darr" => Some('\u{2193}'),
		"harr" => Some('\u{2194}'),
		"crarr" => Some('\u{21b5}'),
		"lArr" => Some('\u{21d0}'),
		"uArr" => Some('\u{21d1}'),
		"rArr" => Some('\u{21d2}'),
		"dArr" => Some('\u{21d3}'),
		"hArr" => Some('\u{21d4}'),
		// Mathematical operators
		"forall" => Some('\u{2200}'),
		"part" => Some('\u{2202}'),
		"exist" => Some('\u{2203}'),
		"empty" => Some('\u{2205}'),
		"nabla" => Some('\u{2207}'),
		"isin" => Some('\u{2208}'),
		"notin" => Some('\u{2209}'),
		"ni" => Some('\u{220b}'),
		"prod" => Some('\u{220f}'),
		"sum" => Some('\u{2211}'),
		"minus" => Some('\u{2212}'),
		"lowast" => Some('\u{2217}'),
		"radic" => Some('\u{221a}'),
		"prop" => Some('\u{221d}'),
		"infin" => Some('\u{221e}'),
		"ang" => Some('\u{2220}'),
		"and" => Some('\u{2227}'),
		"or" => Some('\u{2228}'),
		"cap" => Some('\u{2229}'),
		"cup" => Some('\u{222a}'),
		"int" => Some('\u{222b}'),
		"there4" => Some('\u{2234}'),
		"sim" => Some('\u{223c}'),
		"cong" => Some('\u{2245}'),
		"asymp" => Some('\u{2248}'),
		"ne" => Some('\u{2260}'),
		"equiv" => Some('\u{2261}'),
		"le" => Some('\u{2264}'),
		"ge" => Some('\u{2265}'),
		"sub" => Some('\u{2282}'),
		"sup" => Some('\u{2283}'),
		"nsub" => Some('\u{2284}'),
		"sube" => Some('\u{2286}'),
		"supe" => Some('\u{2287}'),
		"oplus" => Some('\u{2295}'),
		"otimes" => Some('\u{2297}'),
		"perp" => Some('\u{22a5}'),
		"sdot" => Some('\u{22c5}'),
		// Technical and geometric shapes
		"lceil" => Some('\u{2308}'),
		"rceil" => Some('\u{2309}'),
		"lfloor" => Some('\u{230a}'),
		"rfloor" => Some('\u{230b}'),
		"lang" => Some('\u{2329}'),
		"rang" => Some('\u{232a}'),
		"loz" => Some('\u{25ca}'),
		"spades" => Some('\u{2660}'),
		"clubs" => Some('\u{2663}'),
		"hearts" => Some('\u{2665}'),
		"diams" => Some('\u{2666}'),
		_ => None,
	}
}
