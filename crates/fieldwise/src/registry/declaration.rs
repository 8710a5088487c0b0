// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field names from declaration source text.
//!
//! Only the body between the first `{` and its matching `}` is read.
//! Two body styles are recognized:
//!
//! - **C-like** (the body has a top-level `;`): `type name;`,
//!   `type a, b;`, with initializers (`= v`, `{...}`), array extents and
//!   bitfield widths stripped. Member functions, access specifiers and
//!   `static` / `using` / `typedef` / `friend` members are skipped.
//! - **Rust-like**: `name: Type,` items, with attributes and visibility
//!   skipped.
//!
//! Comments (`//`, `/* */`) are ignored everywhere.
//!
//! ```
//! use fieldwise::registry::declaration::parse_field_names;
//!
//! let names = parse_field_names("struct S { int a; float b; string c; };").unwrap();
//! assert_eq!(names, ["a", "b", "c"]);
//! ```

use std::fmt;

/// Declaration text that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// No `{` in the text.
    MissingBody,
    /// A closing delimiter that does not match the innermost open one.
    UnexpectedDelimiter {
        expected: char,
        found: char,
        offset: usize,
    },
    /// An opening delimiter never closed.
    UnclosedDelimiter { open: char, offset: usize },
    /// `/*` without `*/`.
    UnterminatedComment { offset: usize },
    /// String or character literal without its closing quote.
    UnterminatedLiteral { offset: usize },
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationError::MissingBody => write!(f, "no '{{' body found"),
            DeclarationError::UnexpectedDelimiter {
                expected,
                found,
                offset,
            } => write!(
                f,
                "expected '{}' but found '{}' at offset {}",
                expected, found, offset
            ),
            DeclarationError::UnclosedDelimiter { open, offset } => {
                write!(f, "'{}' at offset {} is never closed", open, offset)
            }
            DeclarationError::UnterminatedComment { offset } => {
                write!(f, "unterminated comment at offset {}", offset)
            }
            DeclarationError::UnterminatedLiteral { offset } => {
                write!(f, "unterminated literal at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for DeclarationError {}

/// Extract the field names of a declaration, in order.
///
/// # Errors
///
/// Returns [`DeclarationError`] when there is no body, delimiters are
/// unbalanced, or a comment or literal is left open.
pub fn parse_field_names(declaration: &str) -> Result<Vec<String>, DeclarationError> {
    let body = body_trees(declaration)?;
    if body.iter().any(|tree| tree.is_punct(';')) {
        Ok(c_fields(&body))
    } else {
        Ok(rust_fields(&body))
    }
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Punct(char),
    /// `::`
    PathSep,
    /// `->`
    Arrow,
    Literal,
    Lifetime,
    Open(char),
    Close(char),
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), DeclarationError> {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.next_char();
                }
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.next_char() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    match self.input[self.pos..].find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => return Err(DeclarationError::UnterminatedComment { offset: start }),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    /// Consume up to and including the closing `quote`.
    fn read_quoted(&mut self, quote: char, start: usize) -> Result<(), DeclarationError> {
        loop {
            match self.next_char() {
                Some('\\') => {
                    self.next_char();
                }
                Some(ch) if ch == quote => return Ok(()),
                Some(_) => {}
                None => return Err(DeclarationError::UnterminatedLiteral { offset: start }),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<(usize, Token)>, DeclarationError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let token = match ch {
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                // r#name
                if ident == "r"
                    && self.peek_char() == Some('#')
                    && self
                        .peek_second()
                        .is_some_and(|c| c.is_alphabetic() || c == '_')
                {
                    self.next_char();
                    Token::Ident(self.read_identifier())
                } else {
                    Token::Ident(ident)
                }
            }
            c if c.is_ascii_digit() => {
                while let Some(c) = self.peek_char() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        self.next_char();
                    } else {
                        break;
                    }
                }
                Token::Literal
            }
            '"' => {
                self.next_char();
                self.read_quoted('"', start)?;
                Token::Literal
            }
            '\'' => self.read_quote_or_lifetime(start)?,
            ':' if self.peek_second() == Some(':') => {
                self.pos += 2;
                Token::PathSep
            }
            '-' if self.peek_second() == Some('>') => {
                self.pos += 2;
                Token::Arrow
            }
            '(' | '[' | '{' => {
                self.next_char();
                Token::Open(ch)
            }
            ')' | ']' | '}' => {
                self.next_char();
                Token::Close(ch)
            }
            _ => {
                self.next_char();
                Token::Punct(ch)
            }
        };
        Ok(Some((start, token)))
    }

    /// `'x'`, `'\n'` or a Rust lifetime `'a`.
    fn read_quote_or_lifetime(&mut self, start: usize) -> Result<Token, DeclarationError> {
        self.next_char();
        match (self.peek_char(), self.peek_second()) {
            (Some('\\'), _) | (Some(_), Some('\'')) => {
                self.read_quoted('\'', start)?;
                Ok(Token::Literal)
            }
            (Some(c), _) if c.is_alphabetic() || c == '_' => {
                self.read_identifier();
                Ok(Token::Lifetime)
            }
            _ => Err(DeclarationError::UnterminatedLiteral { offset: start }),
        }
    }
}

// ============================================================================
// Token trees
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Tree {
    /// Never `Open` / `Close`.
    Leaf(Token),
    Group(char, Vec<Tree>),
}

impl Tree {
    fn is_punct(&self, ch: char) -> bool {
        matches!(self, Tree::Leaf(Token::Punct(c)) if *c == ch)
    }

    fn ident(&self) -> Option<&str> {
        match self {
            Tree::Leaf(Token::Ident(ident)) => Some(ident),
            _ => None,
        }
    }

    fn is_group(&self, delimiter: char) -> bool {
        matches!(self, Tree::Group(d, _) if *d == delimiter)
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Token trees strictly inside the first `{ ... }`.
fn body_trees(declaration: &str) -> Result<Vec<Tree>, DeclarationError> {
    let mut lexer = Lexer::new(declaration);

    let body_offset = loop {
        match lexer.next_token()? {
            Some((offset, Token::Open('{'))) => break offset,
            Some(_) => {}
            None => return Err(DeclarationError::MissingBody),
        }
    };

    let mut open = ('{', body_offset);
    let mut current: Vec<Tree> = Vec::new();
    let mut parents: Vec<((char, usize), Vec<Tree>)> = Vec::new();

    while let Some((offset, token)) = lexer.next_token()? {
        match token {
            Token::Open(delimiter) => {
                parents.push((open, std::mem::take(&mut current)));
                open = (delimiter, offset);
            }
            Token::Close(delimiter) => {
                let expected = closing(open.0);
                if delimiter != expected {
                    return Err(DeclarationError::UnexpectedDelimiter {
                        expected,
                        found: delimiter,
                        offset,
                    });
                }
                let trees = std::mem::take(&mut current);
                match parents.pop() {
                    None => return Ok(trees),
                    Some((parent_open, mut parent)) => {
                        parent.push(Tree::Group(open.0, trees));
                        current = parent;
                        open = parent_open;
                    }
                }
            }
            leaf => current.push(Tree::Leaf(leaf)),
        }
    }

    Err(DeclarationError::UnclosedDelimiter {
        open: open.0,
        offset: open.1,
    })
}

/// Split on top-level commas outside `< >`.
fn split_commas(items: &[Tree]) -> Vec<&[Tree]> {
    let mut parts = Vec::new();
    let mut angle = 0usize;
    let mut start = 0;
    for (i, tree) in items.iter().enumerate() {
        if tree.is_punct('<') {
            angle += 1;
        } else if tree.is_punct('>') {
            angle = angle.saturating_sub(1);
        } else if tree.is_punct(',') && angle == 0 {
            parts.push(&items[start..i]);
            start = i + 1;
        }
    }
    parts.push(&items[start..]);
    parts
}

// ============================================================================
// C-like bodies
// ============================================================================

const SKIPPED_MEMBERS: &[&str] = &[
    "static",
    "using",
    "typedef",
    "friend",
    "template",
    "static_assert",
];
const ACCESS_SPECIFIERS: &[&str] = &["public", "private", "protected"];
const NESTED_TYPES: &[&str] = &["struct", "class", "union", "enum"];
const FUNCTION_QUALIFIERS: &[&str] = &["const", "noexcept", "override", "final", "volatile"];

fn c_fields(body: &[Tree]) -> Vec<String> {
    let mut names = Vec::new();
    let mut start = 0;

    for (i, tree) in body.iter().enumerate() {
        let statement = &body[start..i];
        if tree.is_punct(';') {
            c_statement(statement, &mut names);
            start = i + 1;
        } else if tree.is_group('{') && is_function_head(statement) {
            // member function definition, no ';' required
            start = i + 1;
        } else if tree.is_punct(':') && is_access_specifier(statement) {
            start = i + 1;
        }
    }
    c_statement(&body[start..], &mut names);

    names
}

fn is_access_specifier(statement: &[Tree]) -> bool {
    matches!(statement, [single] if single.ident().is_some_and(|i| ACCESS_SPECIFIERS.contains(&i)))
}

/// `ret name(args) quals`, `name(args) : init(..)` or `auto name(args) -> T`.
fn is_function_head(statement: &[Tree]) -> bool {
    let Some(params) = statement.iter().position(|t| t.is_group('(')) else {
        return false;
    };
    if is_pointer_declarator(&statement[params]) {
        return false;
    }
    let after = &statement[params..];
    if after
        .iter()
        .any(|t| t.is_punct(':') || matches!(t, Tree::Leaf(Token::Arrow)))
    {
        return true;
    }
    let trimmed = statement
        .iter()
        .rposition(|t| !t.ident().is_some_and(|i| FUNCTION_QUALIFIERS.contains(&i)));
    trimmed.is_some_and(|last| statement[last].is_group('('))
}

/// `(*name)` or `(&name)`, as in `void (*name)(args)`.
fn is_pointer_declarator(tree: &Tree) -> bool {
    matches!(tree, Tree::Group('(', inner)
        if inner.first().is_some_and(|p| p.is_punct('*') || p.is_punct('&')))
}

fn c_statement(statement: &[Tree], names: &mut Vec<String>) {
    let Some(first) = statement.first() else {
        return;
    };
    if first.ident().is_some_and(|i| SKIPPED_MEMBERS.contains(&i)) {
        return;
    }

    // int size() const;  virtual void run() = 0;
    let head = statement
        .iter()
        .position(|t| t.is_punct('='))
        .map_or(statement, |eq| &statement[..eq]);
    if is_function_head(head) {
        return;
    }

    // struct Inner { ... } a, b;
    let declarators = if first.ident().is_some_and(|i| NESTED_TYPES.contains(&i)) {
        match statement.iter().position(|t| t.is_group('{')) {
            Some(body) => &statement[body + 1..],
            None => statement,
        }
    } else {
        statement
    };

    for declarator in split_commas(declarators) {
        if let Some(name) = c_declarator_name(declarator) {
            names.push(name);
        }
    }
}

fn c_declarator_name(declarator: &[Tree]) -> Option<String> {
    // initializer, then bitfield width
    let end = declarator
        .iter()
        .position(|t| t.is_punct('=') || t.is_punct(':'))
        .unwrap_or(declarator.len());
    let mut declarator = &declarator[..end];

    // brace initializer and array extents
    while let Some((last, rest)) = declarator.split_last() {
        if last.is_group('{') || last.is_group('[') {
            declarator = rest;
        } else {
            break;
        }
    }

    match declarator.last()? {
        Tree::Leaf(Token::Ident(name)) => Some(name.clone()),
        // void (*name)(args)
        Tree::Group('(', _) => declarator
            .iter()
            .find(|t| is_pointer_declarator(t))
            .and_then(|t| match t {
                Tree::Group(_, inner) => inner.iter().rev().find_map(Tree::ident),
                Tree::Leaf(_) => None,
            })
            .map(str::to_string),
        _ => None,
    }
}

// ============================================================================
// Rust-like bodies
// ============================================================================

fn rust_fields(body: &[Tree]) -> Vec<String> {
    split_commas(body)
        .into_iter()
        .filter_map(rust_field_name)
        .collect()
}

fn rust_field_name(item: &[Tree]) -> Option<String> {
    let mut rest = item;
    loop {
        match rest {
            [hash, Tree::Group('[', _), tail @ ..] if hash.is_punct('#') => rest = tail,
            [vis, Tree::Group('(', _), tail @ ..] if vis.ident() == Some("pub") => rest = tail,
            [vis, tail @ ..] if vis.ident() == Some("pub") => rest = tail,
            _ => break,
        }
    }
    match rest {
        [Tree::Leaf(Token::Ident(name)), colon, ..] if colon.is_punct(':') => Some(name.clone()),
        _ => None,
    }
}
