//! Type expressions in Go notation.
//!
//! Field types in record schemas are written as textual type expressions:
//! `*T`, `[]T`, `[4]T`, `map[K]V`, `chan T`, `func(A, B) (C, D)`, named types
//! with an optional module qualifier (`time.Time`,
//! `example.com/lib/pkg.Widget`), and bare identifiers that resolve to a
//! predeclared primitive, a declared type parameter, or a record in the home
//! package.

use crate::error::ParseError;

/// Predeclared primitive type names.
const PRIMITIVES: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "byte",
    "rune",
    "error",
    "any",
];

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// Bidirectional channel (`chan T`).
    Both,
    /// Send-only channel (`chan<- T`).
    Send,
    /// Receive-only channel (`<-chan T`).
    Recv,
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Predeclared primitive type.
    Primitive(String),
    /// Pointer to an element type.
    Pointer(Box<TypeExpr>),
    /// Slice of an element type.
    Slice(Box<TypeExpr>),
    /// Fixed-length array.
    Array(u64, Box<TypeExpr>),
    /// Map from key to value type.
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// Channel with a direction.
    Chan(ChanDir, Box<TypeExpr>),
    /// Function signature.
    Func {
        /// Parameter types, in order.
        params: Vec<TypeExpr>,
        /// Result types, in order.
        results: Vec<TypeExpr>,
    },
    /// Generic type parameter of the enclosing record.
    TypeParam(String),
    /// Named type, optionally qualified by the path of its owning module.
    /// `module` is `None` for types declared in the home package.
    Named {
        /// Owning module path, e.g. `example.com/lib/pkg`.
        module: Option<String>,
        /// Local identifier, e.g. `Widget`.
        ident: String,
    },
    /// A shape the generator does not handle (inline struct or interface
    /// literals). Carries the raw source text for error reporting.
    Unsupported(String),
}

/// Parses a type expression. `type_params` lists the generic parameters
/// declared by the enclosing record; bare identifiers matching one of them
/// parse as [`TypeExpr::TypeParam`].
pub fn parse_type(src: &str, type_params: &[String]) -> Result<TypeExpr, ParseError> {
    let mut cursor = Cursor::new(src, type_params);
    let expr = cursor.parse()?;
    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(ParseError::type_expr(
            src,
            format!("unexpected trailing input at offset {}", cursor.pos),
        ));
    }
    Ok(expr)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    type_params: &'a [String],
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, type_params: &'a [String]) -> Self {
        Self {
            src,
            pos: 0,
            type_params,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            _ => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::type_expr(self.src, message)
    }

    fn parse(&mut self) -> Result<TypeExpr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse()?)))
            }
            Some('[') => self.parse_bracketed(),
            Some('<') => {
                if !self.eat_str("<-") {
                    return Err(self.error("expected '<-chan'"));
                }
                self.skip_whitespace();
                if !self.eat_str("chan") {
                    return Err(self.error("expected 'chan' after '<-'"));
                }
                Ok(TypeExpr::Chan(ChanDir::Recv, Box::new(self.parse()?)))
            }
            Some(c) if is_ident_start(c) => self.parse_keyword_or_name(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("empty type expression")),
        }
    }

    /// Parses `[]T` and `[N]T`.
    fn parse_bracketed(&mut self) -> Result<TypeExpr, ParseError> {
        self.eat('[')?;
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(TypeExpr::Slice(Box::new(self.parse()?)));
        }

        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let digits = &self.src[start..self.pos];
        let length: u64 = digits
            .parse()
            .map_err(|_| self.error("expected array length"))?;
        self.eat(']')?;
        Ok(TypeExpr::Array(length, Box::new(self.parse()?)))
    }

    fn parse_keyword_or_name(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.pos;
        let word = self.take_ident();

        match word {
            "map" => {
                self.eat('[')?;
                let key = self.parse()?;
                self.eat(']')?;
                let value = self.parse()?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            "chan" => {
                // A send direction binds only when '<-' follows 'chan'
                // directly; `chan <-chan T` is a channel of receive channels.
                let dir = if self.eat_str("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan(dir, Box::new(self.parse()?)))
            }
            "func" => self.parse_func(),
            "struct" | "interface" => {
                self.skip_whitespace();
                if self.peek() != Some('{') {
                    return Err(self.error(format!("expected '{{' after '{word}'")));
                }
                self.skip_braced()?;
                Ok(TypeExpr::Unsupported(self.src[start..self.pos].to_string()))
            }
            _ => {
                self.pos = start;
                self.parse_name()
            }
        }
    }

    fn parse_func(&mut self) -> Result<TypeExpr, ParseError> {
        self.eat('(')?;
        let params = self.parse_type_list(')')?;
        self.eat(')')?;

        self.skip_whitespace();
        let results = match self.peek() {
            // Parenthesized result list.
            Some('(') => {
                self.bump();
                let results = self.parse_type_list(')')?;
                self.eat(')')?;
                results
            }
            // A delimiter or end of input means no results.
            None | Some(',') | Some(')') | Some(']') | Some('}') => Vec::new(),
            // Anything else is a single unparenthesized result type.
            Some(_) => vec![self.parse()?],
        };

        Ok(TypeExpr::Func { params, results })
    }

    fn parse_type_list(&mut self, close: char) -> Result<Vec<TypeExpr>, ParseError> {
        let mut list = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(close) {
            return Ok(list);
        }
        loop {
            list.push(self.parse()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(list)
    }

    /// Parses a possibly qualified type name. A qualifier is everything up to
    /// the last '.'; module paths may contain '.', '/' and '-'.
    fn parse_name(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| is_ident_char(c) || c == '.' || c == '/' || c == '-')
        {
            self.bump();
        }
        let name = &self.src[start..self.pos];
        if name.is_empty() {
            return Err(self.error("expected type name"));
        }

        match name.rfind('.') {
            Some(dot) => {
                let (module, ident) = (&name[..dot], &name[dot + 1..]);
                if module.is_empty() || ident.is_empty() {
                    return Err(self.error(format!("malformed qualified name '{name}'")));
                }
                Ok(TypeExpr::Named {
                    module: Some(module.to_string()),
                    ident: ident.to_string(),
                })
            }
            None if PRIMITIVES.contains(&name) => Ok(TypeExpr::Primitive(name.to_string())),
            None if self.type_params.iter().any(|p| p == name) => {
                Ok(TypeExpr::TypeParam(name.to_string()))
            }
            None => Ok(TypeExpr::Named {
                module: None,
                ident: name.to_string(),
            }),
        }
    }

    fn take_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Skips a balanced `{ ... }` block.
    fn skip_braced(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.bump() {
                Some('{') => depth += 1,
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(self.error("unterminated '{' block")),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
