//! Turtle parser
//!
//! Reads the Turtle subset used by protocol documents and ontologies into a
//! [`Store`]: `@prefix`/`@base` and SPARQL-style `PREFIX`/`BASE`, IRIs,
//! prefixed names, `a`, labelled and anonymous blank nodes, `[ ... ]`
//! property lists, `( ... )` collections, string/numeric/boolean literals
//! and `#` comments.
//!
//! Blank-node labels are scoped to one document: `_:x` twice in the same
//! input is one node, `_:x` in two inputs is two nodes.

use std::sync::Arc;

use nom::{
    IResult,
    bytes::complete::{tag, take_while, take_while1, take_until},
    character::complete::{anychar, char, multispace1, digit1},
    combinator::{opt, map, value, recognize, peek},
    sequence::{delimited, preceded, pair, tuple},
    branch::alt,
    multi::many0,
};

use indexmap::IndexMap;

use crate::core::ns;
use crate::store::Store;
use crate::term::{BlankNode, Literal, Term, Triple, Uri};

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Undefined prefix: {prefix}")]
    UndefinedPrefix { prefix: String },

    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Parser state holding prefix mappings
#[derive(Debug, Clone, Default)]
pub struct ParserState {
    /// Prefix to namespace mappings
    prefixes: IndexMap<String, String>,
    /// Base URI for relative resolution
    base: Option<Uri>,
}

impl ParserState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.add_prefix("rdf", ns::RDF);
        state.add_prefix("rdfs", ns::RDFS);
        state.add_prefix("xsd", ns::XSD);
        state.add_prefix("owl", ns::OWL);
        state.add_prefix("rdg", ns::RDG);
        state
    }

    pub fn with_base(base: Uri) -> Self {
        let mut state = Self::new();
        state.base = Some(base);
        state
    }

    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) {
        self.prefixes.insert(prefix.to_string(), namespace.to_string());
    }

    pub fn resolve_prefix(&self, prefix: &str, local: &str) -> Result<Uri, ParseError> {
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(Uri::new(format!("{}{}", namespace, local))),
            None => Err(ParseError::UndefinedPrefix { prefix: prefix.to_string() }),
        }
    }

    pub fn resolve_relative(&self, relative: &str) -> Uri {
        match &self.base {
            Some(base) => base.resolve(relative),
            None => Uri::new(relative.to_string()),
        }
    }

    pub fn prefixes(&self) -> &IndexMap<String, String> {
        &self.prefixes
    }
}

/// Parse whitespace and comments
fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), preceded(char('#'), take_while(|c| c != '\n'))),
        )))
    )(input)
}

/// Parse an IRI reference <...>
fn iri_ref(input: &str) -> IResult<&str, &str> {
    delimited(
        char('<'),
        take_while(|c| c != '>' && c != ' ' && c != '\n' && c != '\r'),
        char('>'),
    )(input)
}

/// Parse a prefixed name (prefix:local). A trailing '.' ends the statement,
/// it is never part of the local name.
fn prefixed_name(input: &str) -> IResult<&str, (&str, &str)> {
    let pn_chars = |c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.';

    let (input, prefix) = take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)?;
    let (after_colon, _) = char(':')(input)?;
    let (_, raw) = take_while(pn_chars)(after_colon)?;

    let local = raw.trim_end_matches('.');
    Ok((&after_colon[local.len()..], (prefix, local)))
}

/// Parse a string literal with possible escape sequences
fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        map(
            delimited(tag("\"\"\""), take_until("\"\"\""), tag("\"\"\"")),
            unescape_string,
        ),
        map(
            delimited(tag("'''"), take_until("'''"), tag("'''")),
            unescape_string,
        ),
        map(quoted('"'), unescape_string),
        map(quoted('\''), unescape_string),
    ))(input)
}

/// Single-line string body delimited by `quote`, honouring backslash escapes
fn quoted(quote: char) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input| {
        delimited(
            char(quote),
            recognize(many0(alt((
                take_while1(move |c| c != quote && c != '\\' && c != '\n'),
                recognize(pair(char('\\'), anychar)),
            )))),
            char(quote),
        )(input)
    }
}

/// Unescape common escape sequences
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Parse a blank node label _:label
fn blank_node_label(input: &str) -> IResult<&str, &str> {
    preceded(
        tag("_:"),
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    )(input)
}

/// Parse a numeric literal
fn numeric_literal(input: &str) -> IResult<&str, Literal> {
    let (input, sign) = opt(alt((char('-'), char('+'))))(input)?;
    let (input, digits) = digit1(input)?;
    let (input, decimal) = opt(pair(char('.'), digit1))(input)?;
    let (input, exp) = opt(tuple((alt((char('e'), char('E'))), opt(alt((char('+'), char('-')))), digit1)))(input)?;

    let mut lexical = String::new();
    if let Some('-') = sign {
        lexical.push('-');
    }
    lexical.push_str(digits);
    if let Some((_, frac)) = decimal {
        lexical.push('.');
        lexical.push_str(frac);
    }

    let datatype = if let Some((e, exp_sign, exp_digits)) = exp {
        lexical.push(e);
        if let Some(s) = exp_sign {
            lexical.push(s);
        }
        lexical.push_str(exp_digits);
        "double"
    } else if decimal.is_some() {
        "decimal"
    } else {
        "integer"
    };

    Ok((input, Literal::typed(lexical, ns::uri(ns::XSD, datatype))))
}

/// Parse a boolean literal
fn boolean_literal(input: &str) -> IResult<&str, Literal> {
    let (rest, word) = alt((tag("true"), tag("false")))(input)?;
    let (rest, _) = peek(not_name_char)(rest)?;
    Ok((rest, Literal::typed(word.to_string(), ns::uri(ns::XSD, "boolean"))))
}

/// Succeeds without consuming when the next char cannot continue a name
fn not_name_char(input: &str) -> IResult<&str, ()> {
    match input.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == ':' || c == '-' => {
            Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify)))
        }
        _ => Ok((input, ())),
    }
}

/// Parse 'a' as rdf:type
fn rdf_type_shorthand(input: &str) -> IResult<&str, ()> {
    let (input, _) = char('a')(input)?;
    let (input, _) = peek(alt((
        value((), multispace1),
        value((), char('<')),
        value((), char('[')),
        value((), char('(')),
        value((), tag("_:")),
    )))(input)?;
    Ok((input, ()))
}

/// Turtle document parser
pub struct TurtleParser {
    state: ParserState,
    store: Store,
    /// Document-scoped blank node labels
    blank_labels: IndexMap<String, BlankNode>,
    /// Length of the document being parsed, for error positions
    source_len: usize,
}

impl TurtleParser {
    pub fn new() -> Self {
        TurtleParser {
            state: ParserState::new(),
            store: Store::new(),
            blank_labels: IndexMap::new(),
            source_len: 0,
        }
    }

    pub fn with_base(base: &str) -> Self {
        TurtleParser {
            state: ParserState::with_base(Uri::new(base.to_string())),
            ..Self::new()
        }
    }

    /// Register extra prefixes before parsing
    pub fn with_prefixes<'p>(mut self, prefixes: impl IntoIterator<Item = (&'p String, &'p String)>) -> Self {
        for (prefix, namespace) in prefixes {
            self.state.add_prefix(prefix, namespace);
        }
        self
    }

    fn syntax(&self, at: &str, message: impl Into<String>) -> ParseError {
        if at.is_empty() {
            return ParseError::UnexpectedEof;
        }
        ParseError::Syntax {
            position: self.source_len - at.len(),
            message: message.into(),
        }
    }

    fn expect<'a>(&self, input: &'a str, c: char, context: &str) -> Result<&'a str, ParseError> {
        char::<&str, nom::error::Error<&str>>(c)(input)
            .map(|(rest, _)| rest)
            .map_err(|_| self.syntax(input, format!("Expected '{}' {}", c, context)))
    }

    /// Parse a complete Turtle document
    pub fn parse_document(&mut self, input: &str) -> Result<(), ParseError> {
        self.source_len = input.len();
        let mut remaining = input;

        loop {
            remaining = skip_ws(remaining);
            if remaining.is_empty() {
                break;
            }

            if remaining.starts_with('@') {
                remaining = self.parse_directive(remaining)?;
            } else if starts_with_keyword(remaining, "PREFIX") || starts_with_keyword(remaining, "BASE") {
                remaining = self.parse_sparql_directive(remaining)?;
            } else {
                remaining = self.parse_statement(remaining)?;
            }
        }

        Ok(())
    }

    /// Parse a @prefix or @base directive
    fn parse_directive<'a>(&mut self, input: &'a str) -> Result<&'a str, ParseError> {
        let rest = if let Some(rest) = input.strip_prefix("@prefix") {
            self.parse_prefix_binding(rest)?
        } else if let Some(rest) = input.strip_prefix("@base") {
            self.parse_base_binding(rest)?
        } else {
            return Err(self.syntax(input, "Unknown directive"));
        };

        let rest = skip_ws(rest);
        self.expect(rest, '.', "after directive")
    }

    /// Parse SPARQL-style PREFIX/BASE (no trailing '.')
    fn parse_sparql_directive<'a>(&mut self, input: &'a str) -> Result<&'a str, ParseError> {
        if let Some(rest) = input.strip_prefix("PREFIX") {
            self.parse_prefix_binding(rest)
        } else if let Some(rest) = input.strip_prefix("BASE") {
            self.parse_base_binding(rest)
        } else {
            Err(self.syntax(input, "Unknown directive"))
        }
    }

    fn parse_prefix_binding<'a>(&mut self, input: &'a str) -> Result<&'a str, ParseError> {
        let input = skip_ws(input);
        let (input, prefix) = take_while::<_, &str, nom::error::Error<&str>>(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
            .map_err(|_| ParseError::UnexpectedEof)?;
        let input = self.expect(input, ':', "after prefix name")?;
        let input = skip_ws(input);

        let (input, namespace) = iri_ref(input)
            .map_err(|_| self.syntax(input, "Expected IRI for namespace"))?;
        let namespace = self.state.resolve_relative(namespace);

        self.state.add_prefix(prefix, namespace.as_str());
        Ok(input)
    }

    fn parse_base_binding<'a>(&mut self, input: &'a str) -> Result<&'a str, ParseError> {
        let input = skip_ws(input);
        let (input, base) = iri_ref(input)
            .map_err(|_| self.syntax(input, "Expected IRI for base"))?;

        let base = self.state.resolve_relative(base);
        self.state.base = Some(base);
        Ok(input)
    }

    /// Parse a statement (triples followed by '.')
    fn parse_statement<'a>(&mut self, input: &'a str) -> Result<&'a str, ParseError> {
        let bare_property_list = input.starts_with('[');
        let (input, subject) = self.parse_subject(input)?;
        let input = skip_ws(input);

        // `[ ... ] .` is a complete statement on its own
        let input = if bare_property_list && input.starts_with('.') {
            input
        } else {
            self.parse_predicate_object_list(input, &subject)?
        };

        let input = skip_ws(input);
        self.expect(input, '.', "at end of statement")
    }

    fn parse_subject<'a>(&mut self, input: &'a str) -> Result<(&'a str, Term), ParseError> {
        let (rest, term) = self.parse_term(input)?;
        if !term.is_individual() {
            return Err(self.syntax(input, "Literal cannot be a subject"));
        }
        Ok((rest, term))
    }

    /// Parse predicate-object list (handles ; separator)
    fn parse_predicate_object_list<'a>(&mut self, input: &'a str, subject: &Term) -> Result<&'a str, ParseError> {
        let mut remaining = input;

        loop {
            let (input, predicate) = self.parse_predicate(remaining)?;
            let input = skip_ws(input);
            remaining = self.parse_object_list(input, subject, &predicate)?;

            let input = skip_ws(remaining);
            match input.strip_prefix(';') {
                Some(rest) => {
                    // Repeated or trailing ';' is allowed
                    let mut rest = skip_ws(rest);
                    while let Some(more) = rest.strip_prefix(';') {
                        rest = skip_ws(more);
                    }
                    if rest.starts_with('.') || rest.starts_with(']') || rest.is_empty() {
                        return Ok(rest);
                    }
                    remaining = rest;
                }
                None => return Ok(input),
            }
        }
    }

    /// Parse object list (handles , separator)
    fn parse_object_list<'a>(&mut self, input: &'a str, subject: &Term, predicate: &Term) -> Result<&'a str, ParseError> {
        let mut remaining = input;

        loop {
            let (input, object) = self.parse_term(remaining)?;
            self.store.add(Triple::new(subject.clone(), predicate.clone(), object));

            let input = skip_ws(input);
            match input.strip_prefix(',') {
                Some(rest) => remaining = skip_ws(rest),
                None => return Ok(input),
            }
        }
    }

    /// Parse a predicate (including 'a' shorthand)
    fn parse_predicate<'a>(&mut self, input: &'a str) -> Result<(&'a str, Term), ParseError> {
        if let Ok((rest, _)) = rdf_type_shorthand(input) {
            return Ok((rest, Term::uri(ns::rdf::TYPE)));
        }

        let (rest, term) = self.parse_term(input)?;
        match term {
            Term::Uri(_) => Ok((rest, term)),
            _ => Err(self.syntax(input, "Predicate must be an IRI")),
        }
    }

    /// Parse a term (subject or object position)
    fn parse_term<'a>(&mut self, input: &'a str) -> Result<(&'a str, Term), ParseError> {
        if let Ok((rest, iri)) = iri_ref(input) {
            let resolved = self.state.resolve_relative(iri);
            return Ok((rest, Term::Uri(Arc::new(resolved))));
        }

        if let Ok((rest, label)) = blank_node_label(input) {
            let blank = self
                .blank_labels
                .entry(label.to_string())
                .or_insert_with(|| BlankNode::labeled(label))
                .clone();
            return Ok((rest, Term::BlankNode(blank)));
        }

        if input.starts_with('[') {
            return self.parse_blank_node_property_list(input);
        }

        if input.starts_with('(') {
            return self.parse_collection(input);
        }

        if input.starts_with('"') || input.starts_with('\'') {
            return self.parse_literal(input);
        }

        if input.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') {
            if let Ok((rest, lit)) = numeric_literal(input) {
                return Ok((rest, Term::Literal(Arc::new(lit))));
            }
        }

        if let Ok((rest, lit)) = boolean_literal(input) {
            return Ok((rest, Term::Literal(Arc::new(lit))));
        }

        if let Ok((rest, (prefix, local))) = prefixed_name(input) {
            let uri = self.state.resolve_prefix(prefix, local)?;
            return Ok((rest, Term::Uri(Arc::new(uri))));
        }

        Err(self.syntax(
            input,
            format!("Cannot parse term starting with: {}", input.chars().take(20).collect::<String>()),
        ))
    }

    /// Parse a literal with optional datatype or language tag
    fn parse_literal<'a>(&mut self, input: &'a str) -> Result<(&'a str, Term), ParseError> {
        let (input, lexical) = string_literal(input)
            .map_err(|_| self.syntax(input, "Invalid string literal"))?;

        if let Some(rest) = input.strip_prefix('@') {
            let (rest, lang) = take_while1::<_, &str, nom::error::Error<&str>>(|c: char| c.is_alphanumeric() || c == '-')(rest)
                .map_err(|_| self.syntax(rest, "Invalid language tag"))?;
            return Ok((rest, Term::lang_literal(lexical, lang)));
        }

        if let Some(rest) = input.strip_prefix("^^") {
            if let Ok((rest, datatype)) = iri_ref(rest) {
                let datatype = self.state.resolve_relative(datatype);
                return Ok((rest, Term::typed_literal(lexical, datatype.as_str())));
            }
            if let Ok((rest, (prefix, local))) = prefixed_name(rest) {
                let datatype = self.state.resolve_prefix(prefix, local)?;
                return Ok((rest, Term::typed_literal(lexical, datatype.as_str())));
            }
            return Err(self.syntax(rest, "Expected datatype IRI"));
        }

        Ok((input, Term::literal(lexical)))
    }

    /// Parse blank node property list [...]
    fn parse_blank_node_property_list<'a>(&mut self, input: &'a str) -> Result<(&'a str, Term), ParseError> {
        let input = self.expect(input, '[', "")?;
        let input = skip_ws(input);

        let blank = Term::fresh_blank();

        if let Some(rest) = input.strip_prefix(']') {
            return Ok((rest, blank));
        }

        let input = self.parse_predicate_object_list(input, &blank)?;
        let input = skip_ws(input);
        let input = self.expect(input, ']', "to close property list")?;

        Ok((input, blank))
    }

    /// Parse collection (...) into rdf:first/rdf:rest cells
    fn parse_collection<'a>(&mut self, input: &'a str) -> Result<(&'a str, Term), ParseError> {
        let input = self.expect(input, '(', "")?;
        let mut remaining = skip_ws(input);

        let mut items = Vec::new();
        loop {
            if let Some(rest) = remaining.strip_prefix(')') {
                remaining = rest;
                break;
            }
            if remaining.is_empty() {
                return Err(ParseError::UnexpectedEof);
            }

            let (rest, term) = self.parse_term(remaining)?;
            items.push(term);
            remaining = skip_ws(rest);
        }

        let mut head = Term::uri(ns::rdf::NIL);
        for item in items.into_iter().rev() {
            let cell = Term::fresh_blank();
            self.store.add(Triple::new(cell.clone(), Term::uri(ns::rdf::FIRST), item));
            self.store.add(Triple::new(cell.clone(), Term::uri(ns::rdf::REST), head));
            head = cell;
        }

        Ok((remaining, head))
    }

    /// Get the parser state
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Consume the parser and return the parsed graph
    pub fn finish(self) -> Store {
        self.store
    }
}

impl Default for TurtleParser {
    fn default() -> Self {
        Self::new()
    }
}

fn skip_ws(input: &str) -> &str {
    match ws(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

fn starts_with_keyword(input: &str, keyword: &str) -> bool {
    input
        .get(..keyword.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(keyword))
        && input[keyword.len()..].starts_with(char::is_whitespace)
}

/// Parse Turtle content into a store
pub fn parse_turtle(input: &str, base: Option<&str>) -> Result<Store, ParseError> {
    let mut parser = match base {
        Some(base) => TurtleParser::with_base(base),
        None => TurtleParser::new(),
    };
    parser.parse_document(input)?;
    Ok(parser.finish())
}
