// rust/ttlc-rdf/src/lexer.rs
// Table-driven Turtle tokenizer
// A STATE x 256 transition table over precomputed character classes;
// one lexeme per call, no per-token heap allocation

/// Character class bits, precomputed into a 256-byte table
const CLS_WS: u8 = 1 << 0;
const CLS_DIGIT: u8 = 1 << 1;
const CLS_ALPHA: u8 = 1 << 2;
const CLS_HEX: u8 = 1 << 3;
const CLS_PN: u8 = 1 << 4;
const CLS_IRI: u8 = 1 << 5;

// DFA states. Scanning states first, then consume-accept states.
const S_START: u8 = 0;
const S_IRI: u8 = 1;
const S_IRI_ESC: u8 = 2;
const S_PNAME_PFX: u8 = 3;
const S_PNAME_LOCAL: u8 = 4;
const S_PNAME_DOT: u8 = 5;
const S_PNAME_ESC: u8 = 6;
const S_PCT1: u8 = 7;
const S_PCT2: u8 = 8;
const S_BLANK_US: u8 = 9;
const S_BLANK_BODY: u8 = 10;
const S_BLANK_DOT: u8 = 11;
const S_SIGN: u8 = 12;
const S_SIGN_DOT: u8 = 13;
const S_INT: u8 = 14;
const S_DEC_POINT: u8 = 15;
const S_FRAC: u8 = 16;
const S_EXP_MARK: u8 = 17;
const S_EXP_SIGN: u8 = 18;
const S_EXP: u8 = 19;
const S_DOT: u8 = 20;
const S_DQ1: u8 = 21;
const S_DSTR: u8 = 22;
const S_DSTR_ESC: u8 = 23;
const S_DQ2: u8 = 24;
const S_DLONG: u8 = 25;
const S_DLONG_Q1: u8 = 26;
const S_DLONG_Q2: u8 = 27;
const S_DLONG_ESC: u8 = 28;
const S_SQ1: u8 = 29;
const S_SSTR: u8 = 30;
const S_SSTR_ESC: u8 = 31;
const S_SQ2: u8 = 32;
const S_SLONG: u8 = 33;
const S_SLONG_Q1: u8 = 34;
const S_SLONG_Q2: u8 = 35;
const S_SLONG_ESC: u8 = 36;
const S_AT: u8 = 37;
const S_AT_WORD: u8 = 38;
const S_CARET: u8 = 39;
const S_DONE_IRI: u8 = 40;
const S_DONE_DSTR: u8 = 41;
const S_DONE_DLONG: u8 = 42;
const S_DONE_SSTR: u8 = 43;
const S_DONE_SLONG: u8 = 44;
const S_DONE_CARET2: u8 = 45;
const NSTATES: usize = 46;

/// No transition for (state, byte)
const STUCK: u8 = 0xFF;

/// Lexical token. Payload ranges are byte offsets into the source.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// IRI body between `<` and `>`
    Iri { start: usize, end: usize },
    /// Prefixed name; `colon` is the offset of the separating `:`
    PName { start: usize, colon: usize, end: usize },
    /// Blank node label after `_:`
    BlankLabel { start: usize, end: usize },
    /// String body between quotes; `long` marks `"""`/`'''` forms
    StringLit { start: usize, end: usize, long: bool },
    Integer { start: usize, end: usize },
    Decimal { start: usize, end: usize },
    Double { start: usize, end: usize },
    Boolean(bool),
    /// Language tag after `@`
    LangTag { start: usize, end: usize },
    /// `@prefix` or SPARQL-style `PREFIX`
    PrefixKw { sparql: bool },
    /// `@base` or SPARQL-style `BASE`
    BaseKw { sparql: bool },
    /// The `a` type shorthand
    A,
    Dot,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    /// `^^` typed-literal operator
    DoubleCaret,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("invalid token")]
    InvalidToken,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated IRI")]
    UnterminatedIri,
    #[error("malformed numeric literal")]
    InvalidNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
    pub column: u32,
}

fn build_classes() -> [u8; 256] {
    let mut c = [0u8; 256];
    for b in 0..256usize {
        let byte = b as u8;
        if matches!(byte, b' ' | b'\t' | b'\r' | b'\n') {
            c[b] |= CLS_WS;
        }
        if byte.is_ascii_digit() {
            c[b] |= CLS_DIGIT | CLS_HEX | CLS_PN;
        }
        if byte.is_ascii_alphabetic() {
            c[b] |= CLS_ALPHA | CLS_PN;
        }
        if matches!(byte, b'a'..=b'f' | b'A'..=b'F') {
            c[b] |= CLS_HEX;
        }
        if matches!(byte, b'_' | b'-') {
            c[b] |= CLS_PN;
        }
        if b >= 0x80 {
            c[b] |= CLS_PN;
        }
        // IRI body: everything except controls, space, and the
        // RFC 3987 excluded set
        let iri_excluded = b <= 0x20
            || matches!(byte, b'<' | b'>' | b'"' | b'{' | b'}' | b'|' | b'^' | b'`' | b'\\');
        if !iri_excluded {
            c[b] |= CLS_IRI;
        }
    }
    c
}

fn build_table(classes: &[u8; 256]) -> Vec<[u8; 256]> {
    let mut t = vec![[STUCK; 256]; NSTATES];
    let has = |b: usize, cls: u8| classes[b] & cls != 0;

    for b in 0..256usize {
        let byte = b as u8;

        // Start dispatch
        t[S_START as usize][b] = match byte {
            b'<' => S_IRI,
            b'_' => S_BLANK_US,
            b'+' | b'-' => S_SIGN,
            b'.' => S_DOT,
            b'"' => S_DQ1,
            b'\'' => S_SQ1,
            b'@' => S_AT,
            b'^' => S_CARET,
            b':' => S_PNAME_LOCAL,
            _ if has(b, CLS_DIGIT) => S_INT,
            _ if has(b, CLS_ALPHA) || b >= 0x80 => S_PNAME_PFX,
            _ => STUCK,
        };

        // IRI
        t[S_IRI as usize][b] = match byte {
            b'>' => S_DONE_IRI,
            b'\\' => S_IRI_ESC,
            _ if has(b, CLS_IRI) => S_IRI,
            _ => STUCK,
        };
        t[S_IRI_ESC as usize][b] = if byte == b'\n' { STUCK } else { S_IRI };

        // Prefixed names
        t[S_PNAME_PFX as usize][b] = match byte {
            b':' => S_PNAME_LOCAL,
            _ if has(b, CLS_PN) => S_PNAME_PFX,
            _ => STUCK,
        };
        let local = match byte {
            b'.' => S_PNAME_DOT,
            b'%' => S_PCT1,
            b'\\' => S_PNAME_ESC,
            b':' => S_PNAME_LOCAL,
            _ if has(b, CLS_PN) => S_PNAME_LOCAL,
            _ => STUCK,
        };
        t[S_PNAME_LOCAL as usize][b] = local;
        t[S_PNAME_DOT as usize][b] = local;
        t[S_PNAME_ESC as usize][b] = S_PNAME_LOCAL;
        t[S_PCT1 as usize][b] = if has(b, CLS_HEX) { S_PCT2 } else { STUCK };
        t[S_PCT2 as usize][b] = if has(b, CLS_HEX) { S_PNAME_LOCAL } else { STUCK };

        // Blank node labels
        t[S_BLANK_US as usize][b] = if byte == b':' { S_BLANK_BODY } else { STUCK };
        let blank = match byte {
            b'.' => S_BLANK_DOT,
            _ if has(b, CLS_PN) => S_BLANK_BODY,
            _ => STUCK,
        };
        t[S_BLANK_BODY as usize][b] = blank;
        t[S_BLANK_DOT as usize][b] = blank;

        // Numbers
        t[S_SIGN as usize][b] = match byte {
            b'.' => S_SIGN_DOT,
            _ if has(b, CLS_DIGIT) => S_INT,
            _ => STUCK,
        };
        t[S_SIGN_DOT as usize][b] = if has(b, CLS_DIGIT) { S_FRAC } else { STUCK };
        t[S_INT as usize][b] = match byte {
            b'.' => S_DEC_POINT,
            b'e' | b'E' => S_EXP_MARK,
            _ if has(b, CLS_DIGIT) => S_INT,
            _ => STUCK,
        };
        t[S_DEC_POINT as usize][b] = if has(b, CLS_DIGIT) { S_FRAC } else { STUCK };
        t[S_FRAC as usize][b] = match byte {
            b'e' | b'E' => S_EXP_MARK,
            _ if has(b, CLS_DIGIT) => S_FRAC,
            _ => STUCK,
        };
        t[S_EXP_MARK as usize][b] = match byte {
            b'+' | b'-' => S_EXP_SIGN,
            _ if has(b, CLS_DIGIT) => S_EXP,
            _ => STUCK,
        };
        t[S_EXP_SIGN as usize][b] = if has(b, CLS_DIGIT) { S_EXP } else { STUCK };
        t[S_EXP as usize][b] = if has(b, CLS_DIGIT) { S_EXP } else { STUCK };
        t[S_DOT as usize][b] = if has(b, CLS_DIGIT) { S_FRAC } else { STUCK };

        // Double-quoted strings
        t[S_DQ1 as usize][b] = match byte {
            b'"' => S_DQ2,
            b'\\' => S_DSTR_ESC,
            b'\n' | b'\r' => STUCK,
            _ => S_DSTR,
        };
        t[S_DSTR as usize][b] = match byte {
            b'"' => S_DONE_DSTR,
            b'\\' => S_DSTR_ESC,
            b'\n' | b'\r' => STUCK,
            _ => S_DSTR,
        };
        t[S_DSTR_ESC as usize][b] = if byte == b'\n' { STUCK } else { S_DSTR };
        t[S_DQ2 as usize][b] = if byte == b'"' { S_DLONG } else { STUCK };
        t[S_DLONG as usize][b] = match byte {
            b'"' => S_DLONG_Q1,
            b'\\' => S_DLONG_ESC,
            _ => S_DLONG,
        };
        t[S_DLONG_Q1 as usize][b] = match byte {
            b'"' => S_DLONG_Q2,
            b'\\' => S_DLONG_ESC,
            _ => S_DLONG,
        };
        t[S_DLONG_Q2 as usize][b] = match byte {
            b'"' => S_DONE_DLONG,
            b'\\' => S_DLONG_ESC,
            _ => S_DLONG,
        };
        t[S_DLONG_ESC as usize][b] = S_DLONG;

        // Single-quoted strings
        t[S_SQ1 as usize][b] = match byte {
            b'\'' => S_SQ2,
            b'\\' => S_SSTR_ESC,
            b'\n' | b'\r' => STUCK,
            _ => S_SSTR,
        };
        t[S_SSTR as usize][b] = match byte {
            b'\'' => S_DONE_SSTR,
            b'\\' => S_SSTR_ESC,
            b'\n' | b'\r' => STUCK,
            _ => S_SSTR,
        };
        t[S_SSTR_ESC as usize][b] = if byte == b'\n' { STUCK } else { S_SSTR };
        t[S_SQ2 as usize][b] = if byte == b'\'' { S_SLONG } else { STUCK };
        t[S_SLONG as usize][b] = match byte {
            b'\'' => S_SLONG_Q1,
            b'\\' => S_SLONG_ESC,
            _ => S_SLONG,
        };
        t[S_SLONG_Q1 as usize][b] = match byte {
            b'\'' => S_SLONG_Q2,
            b'\\' => S_SLONG_ESC,
            _ => S_SLONG,
        };
        t[S_SLONG_Q2 as usize][b] = match byte {
            b'\'' => S_DONE_SLONG,
            b'\\' => S_SLONG_ESC,
            _ => S_SLONG,
        };
        t[S_SLONG_ESC as usize][b] = S_SLONG;

        // Directives and language tags
        t[S_AT as usize][b] = if has(b, CLS_ALPHA) { S_AT_WORD } else { STUCK };
        t[S_AT_WORD as usize][b] = match byte {
            b'-' => S_AT_WORD,
            _ if has(b, CLS_ALPHA) || has(b, CLS_DIGIT) => S_AT_WORD,
            _ => STUCK,
        };

        t[S_CARET as usize][b] = if byte == b'^' { S_DONE_CARET2 } else { STUCK };
    }
    t
}

/// DFA tokenizer. Owns its class and transition tables; a builder
/// populates them at construction, so there is no process-wide state.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    classes: [u8; 256],
    table: Vec<[u8; 256]>,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Lexer<'a> {
        let classes = build_classes();
        let table = build_table(&classes);
        let mut lx = Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            classes,
            table,
            lookahead: None,
        };
        // Tolerate a UTF-8 BOM.
        if lx.src.starts_with(&[0xEF, 0xBB, 0xBF]) {
            lx.pos = 3;
        }
        lx
    }

    /// Current position (line, column), 1-based.
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    #[inline]
    fn advance(&mut self, b: u8) {
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if b & 0xC0 != 0x80 {
            // Count characters, not continuation bytes.
            self.col += 1;
        }
    }

    fn skip_trivia(&mut self) {
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if self.classes[b as usize] & CLS_WS != 0 {
                self.advance(b);
            } else if b == b'#' {
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.advance(self.src[self.pos]);
                }
            } else {
                break;
            }
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token, LexError> {
        if self.lookahead.is_none() {
            let tok = self.scan()?;
            self.lookahead = Some(tok);
        }
        Ok(self.lookahead.as_ref().expect("lookahead just filled"))
    }

    /// Consume and return the next token.
    pub fn consume(&mut self) -> Result<Token, LexError> {
        if let Some(tok) = self.lookahead.take() {
            return Ok(tok);
        }
        self.scan()
    }

    /// Return a consumed token to the stream. At most one token of
    /// pushback; used by the parser's error recovery.
    pub fn push_back(&mut self, tok: Token) {
        debug_assert!(self.lookahead.is_none());
        self.lookahead = Some(tok);
    }

    /// Skip one raw byte. Recovery escape hatch when the scanner is
    /// stuck on an invalid byte.
    pub fn bump_byte(&mut self) {
        self.lookahead = None;
        if self.pos < self.src.len() {
            self.advance(self.src[self.pos]);
        }
    }

    /// Consume the next token when its variant matches `kind`.
    pub fn skip(&mut self, kind: &TokenKind) -> Result<bool, LexError> {
        let matches = std::mem::discriminant(&self.peek()?.kind) == std::mem::discriminant(kind);
        if matches {
            self.consume()?;
        }
        Ok(matches)
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let line = self.line;
        let col = self.col;

        if self.pos >= self.src.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                column: col,
            });
        }

        // Single-byte punctuation never enters the DFA.
        let b0 = self.src[self.pos];
        let punct = match b0 {
            b';' => Some(TokenKind::Semicolon),
            b',' => Some(TokenKind::Comma),
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b'{' => Some(TokenKind::LBrace),
            b'}' => Some(TokenKind::RBrace),
            _ => None,
        };
        if let Some(kind) = punct {
            self.advance(b0);
            return Ok(Token {
                kind,
                line,
                column: col,
            });
        }

        let start = self.pos;
        let mut state = S_START;
        let mut colon = 0usize;
        let mut pending_dots = 0usize;

        loop {
            let next = if self.pos < self.src.len() {
                self.table[state as usize][self.src[self.pos] as usize]
            } else {
                STUCK
            };

            if next == STUCK {
                return self.accept(state, start, colon, pending_dots, line, col);
            }

            let b = self.src[self.pos];
            if next == S_PNAME_LOCAL && (state == S_PNAME_PFX || state == S_START) && b == b':' {
                colon = self.pos;
            }
            pending_dots = if next == S_PNAME_DOT || next == S_BLANK_DOT {
                pending_dots + 1
            } else {
                0
            };
            self.advance(b);
            state = next;

            // Consume-accept states terminate the token immediately.
            let done = match state {
                S_DONE_IRI => Some(TokenKind::Iri {
                    start: start + 1,
                    end: self.pos - 1,
                }),
                S_DONE_DSTR | S_DONE_SSTR => Some(TokenKind::StringLit {
                    start: start + 1,
                    end: self.pos - 1,
                    long: false,
                }),
                S_DONE_DLONG | S_DONE_SLONG => Some(TokenKind::StringLit {
                    start: start + 3,
                    end: self.pos - 3,
                    long: true,
                }),
                S_DONE_CARET2 => Some(TokenKind::DoubleCaret),
                _ => None,
            };
            if let Some(kind) = done {
                return Ok(Token {
                    kind,
                    line,
                    column: col,
                });
            }
        }
    }

    /// Stuck-state resolution: emit the maximal accepted token, with a
    /// bounded retract for trailing dots, or report the error kind the
    /// state implies.
    fn accept(
        &mut self,
        state: u8,
        start: usize,
        colon: usize,
        pending_dots: usize,
        line: u32,
        col: u32,
    ) -> Result<Token, LexError> {
        let tok = |kind: TokenKind| {
            Ok(Token {
                kind,
                line,
                column: col,
            })
        };
        let err = |kind: LexErrorKind| {
            Err(LexError {
                kind,
                line,
                column: col,
            })
        };

        match state {
            S_INT => tok(TokenKind::Integer {
                start,
                end: self.pos,
            }),
            S_DEC_POINT => {
                self.retract(1);
                tok(TokenKind::Integer {
                    start,
                    end: self.pos,
                })
            }
            S_FRAC => tok(TokenKind::Decimal {
                start,
                end: self.pos,
            }),
            S_EXP => tok(TokenKind::Double {
                start,
                end: self.pos,
            }),
            S_DOT => tok(TokenKind::Dot),
            S_PNAME_LOCAL => tok(TokenKind::PName {
                start,
                colon,
                end: self.pos,
            }),
            S_PNAME_DOT => {
                self.retract(pending_dots);
                tok(TokenKind::PName {
                    start,
                    colon,
                    end: self.pos,
                })
            }
            S_BLANK_BODY => tok(TokenKind::BlankLabel {
                start: start + 2,
                end: self.pos,
            }),
            S_BLANK_DOT => {
                self.retract(pending_dots);
                tok(TokenKind::BlankLabel {
                    start: start + 2,
                    end: self.pos,
                })
            }
            S_PNAME_PFX => self.bare_word(start, line, col),
            S_DQ2 | S_SQ2 => tok(TokenKind::StringLit {
                start: start + 1,
                end: start + 1,
                long: false,
            }),
            S_AT_WORD => self.at_word(start, line, col),
            S_IRI | S_IRI_ESC => err(LexErrorKind::UnterminatedIri),
            S_DQ1 | S_DSTR | S_DSTR_ESC | S_DLONG | S_DLONG_Q1 | S_DLONG_Q2 | S_DLONG_ESC
            | S_SQ1 | S_SSTR | S_SSTR_ESC | S_SLONG | S_SLONG_Q1 | S_SLONG_Q2 | S_SLONG_ESC => {
                err(LexErrorKind::UnterminatedString)
            }
            S_SIGN | S_SIGN_DOT | S_EXP_MARK | S_EXP_SIGN => err(LexErrorKind::InvalidNumber),
            _ => err(LexErrorKind::InvalidToken),
        }
    }

    fn retract(&mut self, n: usize) {
        // Retracted bytes are always ASCII dots.
        self.pos -= n;
        self.col -= n as u32;
    }

    fn bare_word(&self, start: usize, line: u32, col: u32) -> Result<Token, LexError> {
        let word = &self.src[start..self.pos];
        let kind = match word {
            b"a" => TokenKind::A,
            b"true" => TokenKind::Boolean(true),
            b"false" => TokenKind::Boolean(false),
            _ if word.eq_ignore_ascii_case(b"prefix") => TokenKind::PrefixKw { sparql: true },
            _ if word.eq_ignore_ascii_case(b"base") => TokenKind::BaseKw { sparql: true },
            _ => {
                return Err(LexError {
                    kind: LexErrorKind::InvalidToken,
                    line,
                    column: col,
                })
            }
        };
        Ok(Token {
            kind,
            line,
            column: col,
        })
    }

    fn at_word(&self, start: usize, line: u32, col: u32) -> Result<Token, LexError> {
        let word = &self.src[start + 1..self.pos];
        let kind = match word {
            b"prefix" => TokenKind::PrefixKw { sparql: false },
            b"base" => TokenKind::BaseKw { sparql: false },
            _ => TokenKind::LangTag {
                start: start + 1,
                end: self.pos,
            },
        };
        Ok(Token {
            kind,
            line,
            column: col,
        })
    }
}
