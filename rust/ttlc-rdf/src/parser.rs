// rust/ttlc-rdf/src/parser.rs
// Recursive-descent Turtle parser over the DFA token stream
// Every term is interned before it reaches the graph; intermediate
// text lives in a reused scratch buffer

use smallvec::SmallVec;

use crate::graph::{Graph, GraphError};
use crate::id::{NodeId, NodeKind, ObjectKind, Triple, TripleFlags};
use crate::intern::{InternError, Interner};
use crate::lexer::{LexError, Lexer, Token, TokenKind};
use crate::vocab::Vocab;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(crate::lexer::LexErrorKind),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("statement is missing its terminating '.'")]
    IncompleteStatement,
    #[error("undeclared prefix '{0}:'")]
    UndeclaredPrefix(String),
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("cannot resolve relative IRI <{0}> without a base")]
    InvalidIri(String),
    #[error("{0}")]
    Intern(InternError),
    #[error("{0}")]
    Graph(GraphError),
}

impl ParseErrorKind {
    /// Semantic errors block output even in permissive mode.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::UndeclaredPrefix(_)
                | ParseErrorKind::InvalidIri(_)
                | ParseErrorKind::InvalidEscape
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub column: u32,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> ParseError {
        ParseError {
            kind: ParseErrorKind::Lex(e.kind),
            line: e.line,
            column: e.column,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Abort on the first error instead of recovering at the next '.'
    pub strict: bool,
}

/// Outcome of a parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    pub triples: usize,
    pub errors: usize,
    pub semantic_errors: usize,
    pub first_error: Option<ParseError>,
    pub first_semantic_error: Option<ParseError>,
}

struct ObjectTerm {
    id: NodeId,
    kind: ObjectKind,
    flags: TripleFlags,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    src: &'a [u8],
    interner: &'a mut Interner,
    graph: &'a mut Graph,
    vocab: &'a Vocab,
    opts: ParserOptions,
    base: Option<String>,
    bnode_counter: u32,
    stats: ParseStats,
    scratch: String,
}

impl<'a> Parser<'a> {
    pub fn new(
        src: &'a str,
        interner: &'a mut Interner,
        graph: &'a mut Graph,
        vocab: &'a Vocab,
        opts: ParserOptions,
    ) -> Parser<'a> {
        Parser {
            lexer: Lexer::new(src),
            src: src.as_bytes(),
            interner,
            graph,
            vocab,
            opts,
            base: None,
            bnode_counter: 0,
            stats: ParseStats::default(),
            scratch: String::new(),
        }
    }

    /// Parse the whole document into the graph.
    pub fn parse(mut self) -> Result<ParseStats, ParseError> {
        loop {
            match self.statement() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.stats.errors += 1;
                    if e.kind.is_semantic() {
                        self.stats.semantic_errors += 1;
                        if self.stats.first_semantic_error.is_none() {
                            self.stats.first_semantic_error = Some(e.clone());
                        }
                    }
                    if self.stats.first_error.is_none() {
                        self.stats.first_error = Some(e.clone());
                    }
                    if self.opts.strict {
                        return Err(e);
                    }
                    self.sync();
                }
            }
        }
        Ok(self.stats)
    }

    /// One directive or triples statement. Ok(false) at end of input.
    fn statement(&mut self) -> Result<bool, ParseError> {
        let tok = self.lexer.peek()?.clone();
        match tok.kind {
            TokenKind::Eof => Ok(false),
            TokenKind::PrefixKw { sparql } => {
                self.lexer.consume()?;
                self.prefix_directive(sparql)?;
                Ok(true)
            }
            TokenKind::BaseKw { sparql } => {
                self.lexer.consume()?;
                self.base_directive(sparql)?;
                Ok(true)
            }
            _ => {
                self.triples()?;
                self.expect_dot()?;
                Ok(true)
            }
        }
    }

    fn prefix_directive(&mut self, sparql: bool) -> Result<(), ParseError> {
        let tok = self.lexer.consume()?;
        let (label_start, label_end) = match tok.kind {
            TokenKind::PName { start, colon, end } if colon + 1 == end => (start, colon),
            _ => return Err(self.unexpected("prefix label", &tok)),
        };
        let label = self.text(label_start, label_end).to_string();

        let iri_tok = self.lexer.consume()?;
        let ns = match iri_tok.kind {
            TokenKind::Iri { start, end } => self.intern_iri(start, end, &iri_tok)?,
            _ => return Err(self.unexpected("namespace IRI", &iri_tok)),
        };
        self.graph.prefixes_mut().declare(&label, ns);

        if !sparql {
            self.expect_dot()?;
        }
        Ok(())
    }

    fn base_directive(&mut self, sparql: bool) -> Result<(), ParseError> {
        let tok = self.lexer.consume()?;
        let id = match tok.kind {
            TokenKind::Iri { start, end } => self.intern_iri(start, end, &tok)?,
            _ => return Err(self.unexpected("base IRI", &tok)),
        };
        self.base = Some(self.interner.str_of(id).to_string());
        self.graph.set_base(id);
        if !sparql {
            self.expect_dot()?;
        }
        Ok(())
    }

    fn triples(&mut self) -> Result<(), ParseError> {
        let peeked = self.lexer.peek()?.kind.clone();
        if peeked == TokenKind::LBracket {
            let subject = self.bnode_property_list()?;
            // "[ ... ] ." is a complete statement; predicates after the
            // list are also allowed.
            if self.lexer.peek()?.kind != TokenKind::Dot {
                self.predicate_object_list(subject)?;
            }
            return Ok(());
        }
        let subject = self.subject()?;
        self.predicate_object_list(subject)
    }

    fn subject(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Iri { start, end } => self.intern_iri(start, end, &tok),
            TokenKind::PName { start, colon, end } => self.resolve_pname(start, colon, end, &tok),
            TokenKind::BlankLabel { start, end } => {
                let label = self.text(start, end).to_string();
                self.intern(NodeKind::Blank, &label, &tok)
            }
            TokenKind::LParen => Ok(self.collection(&tok)?.id),
            _ => Err(self.unexpected("subject", &tok)),
        }
    }

    fn verb(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::A => Ok(self.vocab.rdf_type),
            TokenKind::Iri { start, end } => self.intern_iri(start, end, &tok),
            TokenKind::PName { start, colon, end } => self.resolve_pname(start, colon, end, &tok),
            _ => Err(self.unexpected("predicate", &tok)),
        }
    }

    fn predicate_object_list(&mut self, subject: NodeId) -> Result<(), ParseError> {
        loop {
            let predicate = self.verb()?;
            self.object_list(subject, predicate)?;
            if !self.lexer.skip(&TokenKind::Semicolon)? {
                break;
            }
            while self.lexer.skip(&TokenKind::Semicolon)? {}
            match self.lexer.peek()?.kind {
                TokenKind::Dot | TokenKind::RBracket | TokenKind::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn object_list(&mut self, subject: NodeId, predicate: NodeId) -> Result<(), ParseError> {
        loop {
            let obj = self.object()?;
            self.emit(subject, predicate, obj)?;
            if !self.lexer.skip(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(())
    }

    fn object(&mut self) -> Result<ObjectTerm, ParseError> {
        if self.lexer.peek()?.kind == TokenKind::LBracket {
            let id = self.bnode_property_list()?;
            return Ok(ObjectTerm {
                id,
                kind: ObjectKind::Blank,
                flags: TripleFlags::empty(),
            });
        }
        let tok = self.lexer.consume()?;
        match tok.kind {
            TokenKind::Iri { start, end } => Ok(ObjectTerm {
                id: self.intern_iri(start, end, &tok)?,
                kind: ObjectKind::Iri,
                flags: TripleFlags::empty(),
            }),
            TokenKind::PName { start, colon, end } => Ok(ObjectTerm {
                id: self.resolve_pname(start, colon, end, &tok)?,
                kind: ObjectKind::Iri,
                flags: TripleFlags::empty(),
            }),
            TokenKind::BlankLabel { start, end } => {
                let label = self.text(start, end).to_string();
                Ok(ObjectTerm {
                    id: self.intern(NodeKind::Blank, &label, &tok)?,
                    kind: ObjectKind::Blank,
                    flags: TripleFlags::empty(),
                })
            }
            TokenKind::LParen => self.collection(&tok),
            TokenKind::StringLit { start, end, long } => self.string_object(start, end, long, &tok),
            TokenKind::Integer { start, end } => {
                self.numeric_object(start, end, self.vocab.xsd_integer, ObjectKind::Integer, &tok)
            }
            TokenKind::Decimal { start, end } => {
                self.numeric_object(start, end, self.vocab.xsd_decimal, ObjectKind::Decimal, &tok)
            }
            TokenKind::Double { start, end } => {
                self.numeric_object(start, end, self.vocab.xsd_double, ObjectKind::Double, &tok)
            }
            TokenKind::Boolean(v) => {
                let lexical = if v { "true" } else { "false" };
                let id = self
                    .interner
                    .intern_with_aux(NodeKind::TypedLiteral, self.vocab.xsd_boolean, lexical)
                    .map_err(|e| self.at(&tok, ParseErrorKind::Intern(e)))?;
                Ok(ObjectTerm {
                    id,
                    kind: ObjectKind::Boolean,
                    flags: TripleFlags::HAS_DATATYPE,
                })
            }
            _ => Err(self.unexpected("object", &tok)),
        }
    }

    fn string_object(
        &mut self,
        start: usize,
        end: usize,
        long: bool,
        tok: &Token,
    ) -> Result<ObjectTerm, ParseError> {
        let value = self.unescape_string(start, end, long, tok)?;
        let next = self.lexer.peek()?.kind.clone();
        match next {
            TokenKind::LangTag { start: ls, end: le } => {
                self.lexer.consume()?;
                let lang = self.text(ls, le).to_ascii_lowercase();
                let lang_id = self
                    .interner
                    .intern(NodeKind::Literal, &lang)
                    .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))?;
                let id = self
                    .interner
                    .intern_with_aux(NodeKind::Literal, lang_id, &value)
                    .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))?;
                Ok(ObjectTerm {
                    id,
                    kind: ObjectKind::Lang,
                    flags: TripleFlags::LANG_TAGGED,
                })
            }
            TokenKind::DoubleCaret => {
                self.lexer.consume()?;
                let dt_tok = self.lexer.consume()?;
                let dt = match dt_tok.kind {
                    TokenKind::Iri { start, end } => self.intern_iri(start, end, &dt_tok)?,
                    TokenKind::PName { start, colon, end } => {
                        self.resolve_pname(start, colon, end, &dt_tok)?
                    }
                    _ => return Err(self.unexpected("datatype IRI", &dt_tok)),
                };
                let id = self
                    .interner
                    .intern_with_aux(NodeKind::TypedLiteral, dt, &value)
                    .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))?;
                Ok(ObjectTerm {
                    id,
                    kind: self.vocab.object_kind_for_datatype(dt),
                    flags: TripleFlags::HAS_DATATYPE,
                })
            }
            _ => {
                let id = self
                    .interner
                    .intern(NodeKind::Literal, &value)
                    .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))?;
                Ok(ObjectTerm {
                    id,
                    kind: ObjectKind::Plain,
                    flags: TripleFlags::empty(),
                })
            }
        }
    }

    fn numeric_object(
        &mut self,
        start: usize,
        end: usize,
        datatype: NodeId,
        kind: ObjectKind,
        tok: &Token,
    ) -> Result<ObjectTerm, ParseError> {
        let lexical = self.text(start, end).to_string();
        let id = self
            .interner
            .intern_with_aux(NodeKind::TypedLiteral, datatype, &lexical)
            .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))?;
        Ok(ObjectTerm {
            id,
            kind,
            flags: TripleFlags::HAS_DATATYPE,
        })
    }

    /// `( o1 o2 ... )` desugars into an rdf:first/rdf:rest chain.
    /// Items stack inline; typical collections never touch the heap.
    fn collection(&mut self, open: &Token) -> Result<ObjectTerm, ParseError> {
        let mut items: SmallVec<[ObjectTerm; 8]> = SmallVec::new();
        loop {
            if self.lexer.peek()?.kind == TokenKind::RParen {
                self.lexer.consume()?;
                break;
            }
            if self.lexer.peek()?.kind == TokenKind::Eof {
                return Err(self.at(open, ParseErrorKind::IncompleteStatement));
            }
            items.push(self.object()?);
        }

        if items.is_empty() {
            return Ok(ObjectTerm {
                id: self.vocab.rdf_nil,
                kind: ObjectKind::Iri,
                flags: TripleFlags::empty(),
            });
        }

        let head = self.fresh_bnode(open)?;
        let mut cursor = head;
        let last = items.len() - 1;
        for (i, item) in items.into_iter().enumerate() {
            self.emit(cursor, self.vocab.rdf_first, item)?;
            let rest = if i == last {
                ObjectTerm {
                    id: self.vocab.rdf_nil,
                    kind: ObjectKind::Iri,
                    flags: TripleFlags::empty(),
                }
            } else {
                let next = self.fresh_bnode(open)?;
                ObjectTerm {
                    id: next,
                    kind: ObjectKind::Blank,
                    flags: TripleFlags::empty(),
                }
            };
            let next_id = rest.id;
            self.emit(cursor, self.vocab.rdf_rest, rest)?;
            cursor = next_id;
        }
        Ok(ObjectTerm {
            id: head,
            kind: ObjectKind::Blank,
            flags: TripleFlags::empty(),
        })
    }

    /// `[ p o ; ... ]` introduces a fresh blank node.
    fn bnode_property_list(&mut self) -> Result<NodeId, ParseError> {
        let open = self.lexer.consume()?;
        debug_assert_eq!(open.kind, TokenKind::LBracket);
        let node = self.fresh_bnode(&open)?;
        if self.lexer.skip(&TokenKind::RBracket)? {
            return Ok(node);
        }
        self.predicate_object_list(node)?;
        let close = self.lexer.consume()?;
        if close.kind != TokenKind::RBracket {
            return Err(self.unexpected("']'", &close));
        }
        Ok(node)
    }

    fn fresh_bnode(&mut self, tok: &Token) -> Result<NodeId, ParseError> {
        // '#' cannot appear in a parsed blank label, so generated
        // labels never collide with source labels.
        let label = format!("b#{}", self.bnode_counter);
        self.bnode_counter += 1;
        self.intern(NodeKind::Blank, &label, tok)
    }

    fn emit(&mut self, s: NodeId, p: NodeId, o: ObjectTerm) -> Result<(), ParseError> {
        self.graph
            .insert(Triple::new(s, p, o.id, o.kind, o.flags))
            .map_err(|e| ParseError {
                kind: ParseErrorKind::Graph(e),
                line: self.lexer.position().0,
                column: self.lexer.position().1,
            })?;
        self.stats.triples += 1;
        Ok(())
    }

    // --- token plumbing -------------------------------------------------

    fn expect_dot(&mut self) -> Result<(), ParseError> {
        let tok = self.lexer.consume()?;
        if tok.kind != TokenKind::Dot {
            let err = self.at(&tok, ParseErrorKind::IncompleteStatement);
            self.lexer.push_back(tok);
            return Err(err);
        }
        Ok(())
    }

    /// Build an unexpected-token error and give the token back so
    /// recovery re-examines it.
    fn unexpected(&mut self, expected: &'static str, tok: &Token) -> ParseError {
        let err = self.at(
            tok,
            ParseErrorKind::UnexpectedToken {
                expected,
                found: format!("{:?}", tok.kind),
            },
        );
        self.lexer.push_back(tok.clone());
        err
    }

    fn at(&self, tok: &Token, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            line: tok.line,
            column: tok.column,
        }
    }

    fn text(&self, start: usize, end: usize) -> &str {
        // SAFETY: ranges come from the lexer, which only splits the
        // source at ASCII boundaries.
        unsafe { std::str::from_utf8_unchecked(&self.src[start..end]) }
    }

    /// Skip to just past the next statement terminator (recovery
    /// mode). Invalid bytes are stepped over one at a time.
    fn sync(&mut self) {
        loop {
            match self.lexer.consume() {
                Ok(t) if matches!(t.kind, TokenKind::Dot | TokenKind::Eof) => break,
                Ok(_) => {}
                Err(_) => self.lexer.bump_byte(),
            }
        }
    }

    // --- term construction ----------------------------------------------

    fn intern(&mut self, kind: NodeKind, text: &str, tok: &Token) -> Result<NodeId, ParseError> {
        self.interner
            .intern(kind, text)
            .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))
    }

    fn intern_iri(&mut self, start: usize, end: usize, tok: &Token) -> Result<NodeId, ParseError> {
        self.unescape_iri(start, end, tok)?;
        let resolved = self.resolve_iri(tok)?;
        self.interner
            .intern(NodeKind::Iri, &resolved)
            .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)))
    }

    fn resolve_pname(
        &mut self,
        start: usize,
        colon: usize,
        end: usize,
        tok: &Token,
    ) -> Result<NodeId, ParseError> {
        let prefix = self.text(start, colon).to_string();
        let ns = self
            .graph
            .prefixes()
            .resolve(&prefix)
            .ok_or_else(|| self.at(tok, ParseErrorKind::UndeclaredPrefix(prefix.clone())))?;

        self.scratch.clear();
        self.scratch.push_str(self.interner.str_of(ns));
        // Local part: drop '\' escapes, keep %XX as written.
        let local = &self.src[colon + 1..end];
        let mut i = 0;
        while i < local.len() {
            let b = local[i];
            if b == b'\\' && i + 1 < local.len() {
                self.scratch.push(local[i + 1] as char);
                i += 2;
            } else {
                // SAFETY: the lexer splits at ASCII boundaries only.
                self.scratch.push_str(unsafe {
                    std::str::from_utf8_unchecked(&local[i..i + utf8_len(b)])
                });
                i += utf8_len(b);
            }
        }
        let full = std::mem::take(&mut self.scratch);
        let id = self
            .interner
            .intern(NodeKind::Iri, &full)
            .map_err(|e| self.at(tok, ParseErrorKind::Intern(e)));
        self.scratch = full;
        id
    }

    /// Unescape an IRI body into scratch (\u and \U forms only).
    fn unescape_iri(&mut self, start: usize, end: usize, tok: &Token) -> Result<(), ParseError> {
        self.scratch.clear();
        let body = &self.src[start..end];
        let mut i = 0;
        while i < body.len() {
            let b = body[i];
            if b == b'\\' {
                let (ch, used) = decode_unicode_escape(&body[i..])
                    .ok_or_else(|| self.at(tok, ParseErrorKind::InvalidEscape))?;
                self.scratch.push(ch);
                i += used;
            } else {
                let n = utf8_len(b);
                // SAFETY: source is valid UTF-8 and n spans one char.
                self.scratch
                    .push_str(unsafe { std::str::from_utf8_unchecked(&body[i..i + n]) });
                i += n;
            }
        }
        Ok(())
    }

    /// Resolve the IRI sitting in scratch against the current base.
    fn resolve_iri(&mut self, tok: &Token) -> Result<String, ParseError> {
        let iri = std::mem::take(&mut self.scratch);
        if is_absolute_iri(&iri) {
            return Ok(iri);
        }
        let base = match &self.base {
            Some(b) => b,
            None => return Err(self.at(tok, ParseErrorKind::InvalidIri(iri))),
        };
        Ok(join_iri(base, &iri))
    }

    fn unescape_string(
        &mut self,
        start: usize,
        end: usize,
        _long: bool,
        tok: &Token,
    ) -> Result<String, ParseError> {
        let body = &self.src[start..end];
        let mut out = String::with_capacity(body.len());
        let mut i = 0;
        while i < body.len() {
            let b = body[i];
            if b == b'\\' {
                let next = *body
                    .get(i + 1)
                    .ok_or_else(|| self.at(tok, ParseErrorKind::InvalidEscape))?;
                match next {
                    b't' => {
                        out.push('\t');
                        i += 2;
                    }
                    b'b' => {
                        out.push('\u{8}');
                        i += 2;
                    }
                    b'n' => {
                        out.push('\n');
                        i += 2;
                    }
                    b'r' => {
                        out.push('\r');
                        i += 2;
                    }
                    b'f' => {
                        out.push('\u{c}');
                        i += 2;
                    }
                    b'"' => {
                        out.push('"');
                        i += 2;
                    }
                    b'\'' => {
                        out.push('\'');
                        i += 2;
                    }
                    b'\\' => {
                        out.push('\\');
                        i += 2;
                    }
                    b'u' | b'U' => {
                        let (ch, used) = decode_unicode_escape(&body[i..])
                            .ok_or_else(|| self.at(tok, ParseErrorKind::InvalidEscape))?;
                        out.push(ch);
                        i += used;
                    }
                    _ => return Err(self.at(tok, ParseErrorKind::InvalidEscape)),
                }
            } else {
                let n = utf8_len(b);
                // SAFETY: source is valid UTF-8 and n spans one char.
                out.push_str(unsafe { std::str::from_utf8_unchecked(&body[i..i + n]) });
                i += n;
            }
        }
        Ok(out)
    }
}

fn utf8_len(b: u8) -> usize {
    match b {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

/// Decode `\uXXXX` or `\UXXXXXXXX` at the head of `bytes`.
fn decode_unicode_escape(bytes: &[u8]) -> Option<(char, usize)> {
    let digits = match bytes.get(1)? {
        b'u' => 4,
        b'U' => 8,
        _ => return None,
    };
    if bytes.len() < 2 + digits {
        return None;
    }
    let hex = std::str::from_utf8(&bytes[2..2 + digits]).ok()?;
    let v = u32::from_str_radix(hex, 16).ok()?;
    Some((char::from_u32(v)?, 2 + digits))
}

fn is_absolute_iri(iri: &str) -> bool {
    let bytes = iri.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    for &b in &bytes[1..] {
        match b {
            b':' => return true,
            _ if b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-') => {}
            _ => return false,
        }
    }
    false
}

/// Minimal RFC 3986 merge: fragments, absolute paths, and relative
/// path references against the base.
fn join_iri(base: &str, rel: &str) -> String {
    if rel.is_empty() {
        return base.to_string();
    }
    if let Some(stripped) = rel.strip_prefix('#') {
        let cut = base.find('#').unwrap_or(base.len());
        return format!("{}#{}", &base[..cut], stripped);
    }
    let scheme_end = base.find(':').map(|i| i + 1).unwrap_or(0);
    if rel.starts_with("//") {
        return format!("{}{}", &base[..scheme_end], rel);
    }
    let authority_end = if base[scheme_end..].starts_with("//") {
        base[scheme_end + 2..]
            .find('/')
            .map(|i| scheme_end + 2 + i)
            .unwrap_or(base.len())
    } else {
        scheme_end
    };
    if let Some(stripped) = rel.strip_prefix('/') {
        return format!("{}/{}", &base[..authority_end], stripped);
    }
    let dir_end = base.rfind('/').map(|i| i + 1).unwrap_or(authority_end);
    format!("{}{}", &base[..dir_end.max(authority_end)], rel)
}
