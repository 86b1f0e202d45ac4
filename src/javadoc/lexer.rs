//! Lightweight Java source lexer that recovers Javadoc comments
//!
//! This is not a Java parser. It tracks braces, parentheses, string literals
//! and comments well enough to attach each `/** ... */` block to the type or
//! field declaration that follows it, and to learn each type's superclass.
//! Method bodies are skipped wholesale.

use super::{CommentLexer, FieldComment, StructuredComment};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Doc(String),
    Word(String),
    Symbol(char),
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Class,
    Interface,
    Enum,
}

struct TypeDecl {
    kind: TypeKind,
    name: String,
    extends: Option<String>,
}

struct Frame {
    record: usize,
    body_depth: usize,
    kind: TypeKind,
    constants_done: bool,
}

/// Default [`CommentLexer`] for Java sources
#[derive(Debug, Clone, Copy, Default)]
pub struct JavadocLexer;

impl JavadocLexer {
    pub fn new() -> Self {
        Self
    }
}

impl CommentLexer for JavadocLexer {
    fn lex(&self, source: &str) -> Vec<StructuredComment> {
        let mut parser = Parser::default();
        for token in tokenize(source) {
            parser.feed(token);
        }
        parser.records
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
        } else if c == '/' && next == Some('/') {
            while i < len && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && next == Some('*') {
            let start = i + 2;
            let mut end = start;
            while end + 1 < len && !(chars[end] == '*' && chars[end + 1] == '/') {
                end += 1;
            }
            let terminated = end + 1 < len;
            if chars.get(start) == Some(&'*') && end > start && terminated {
                tokens.push(Token::Doc(chars[start + 1..end].iter().collect()));
            }
            i = if terminated { end + 2 } else { len };
        } else if c == '"' {
            if next == Some('"') && chars.get(i + 2) == Some(&'"') {
                i += 3;
                while i < len && !closes_text_block(&chars, i) {
                    i += if chars[i] == '\\' { 2 } else { 1 };
                }
                i += 3;
            } else {
                i = skip_quoted(&chars, i + 1, '"');
            }
            tokens.push(Token::Literal);
        } else if c == '\'' {
            i = skip_quoted(&chars, i + 1, '\'');
            tokens.push(Token::Literal);
        } else if is_word_char(c) {
            let start = i;
            while i < len && is_word_char(chars[i]) {
                i += 1;
            }
            tokens.push(Token::Word(chars[start..i].iter().collect()));
        } else {
            tokens.push(Token::Symbol(c));
            i += 1;
        }
    }

    tokens
}

fn closes_text_block(chars: &[char], i: usize) -> bool {
    chars[i..].starts_with(&['"', '"', '"'])
}

/// Returns the index just past the closing quote (or end of line).
fn skip_quoted(chars: &[char], mut i: usize, quote: char) -> usize {
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Splits raw comment text into the body and its block tags.
pub fn parse_comment(raw: &str) -> (Option<String>, HashMap<String, String>) {
    let mut body_lines: Vec<String> = Vec::new();
    let mut tags: HashMap<String, String> = HashMap::new();
    let mut current: Option<(String, String)> = None;

    for line in raw.lines() {
        let line = line.trim_start().trim_start_matches('*');
        let line = line.strip_prefix(' ').unwrap_or(line).trim_end();
        let trimmed = line.trim_start();

        let starts_tag = trimmed.starts_with('@')
            && trimmed[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic());

        if starts_tag {
            if let Some((name, value)) = current.take() {
                tags.entry(name).or_insert(value);
            }
            let rest = &trimmed[1..];
            let (name, value) = match rest.find(char::is_whitespace) {
                Some(pos) => (&rest[..pos], rest[pos..].trim()),
                None => (rest, ""),
            };
            current = Some((name.to_string(), value.to_string()));
        } else if let Some((_, value)) = current.as_mut() {
            if !trimmed.is_empty() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(trimmed);
            }
        } else {
            body_lines.push(line.to_string());
        }
    }
    if let Some((name, value)) = current {
        tags.entry(name).or_insert(value);
    }

    let body = body_lines.join("\n").trim().to_string();
    let body = if body.is_empty() { None } else { Some(body) };
    (body, tags)
}

#[derive(Default)]
struct Parser {
    records: Vec<StructuredComment>,
    package: Option<String>,
    imports: HashMap<String, String>,
    stack: Vec<Frame>,
    depth: usize,
    parens: usize,
    buffer: Vec<Token>,
    doc: Option<String>,
}

impl Parser {
    fn feed(&mut self, token: Token) {
        match token {
            Token::Doc(text) => {
                if self.parens == 0 {
                    self.doc = Some(text);
                }
            }
            Token::Symbol('(') => {
                self.parens += 1;
                self.buffer.push(token);
            }
            Token::Symbol(')') => {
                self.parens = self.parens.saturating_sub(1);
                self.buffer.push(token);
            }
            Token::Symbol('{') if self.parens == 0 => self.open_brace(),
            Token::Symbol('}') if self.parens == 0 => self.close_brace(),
            Token::Symbol(';') if self.parens == 0 => self.end_statement(),
            other => self.buffer.push(other),
        }
    }

    fn at_member_level(&self) -> bool {
        match self.stack.last() {
            Some(frame) => self.depth == frame.body_depth,
            None => self.depth == 0,
        }
    }

    fn in_enum_constants(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|f| f.kind == TypeKind::Enum && !f.constants_done)
    }

    fn open_brace(&mut self) {
        if self.at_member_level() {
            if let Some(decl) = type_declaration(&self.buffer) {
                self.push_type(decl);
            } else if !self.in_enum_constants() {
                self.member();
            }
        }
        self.depth += 1;
        self.reset();
    }

    fn close_brace(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self
            .stack
            .last()
            .is_some_and(|f| self.depth + 1 == f.body_depth)
        {
            self.stack.pop();
        }
        self.reset();
    }

    fn end_statement(&mut self) {
        if self.stack.is_empty() && self.depth == 0 {
            self.header_statement();
        } else if self.at_member_level() {
            if self.in_enum_constants() {
                if let Some(frame) = self.stack.last_mut() {
                    frame.constants_done = true;
                }
            } else {
                self.member();
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.doc = None;
    }

    fn header_statement(&mut self) {
        let words: Vec<&str> = self
            .buffer
            .iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w.as_str()),
                _ => None,
            })
            .collect();

        match words.as_slice() {
            ["package", name, ..] => self.package = Some(name.to_string()),
            ["import", "static", ..] => {}
            ["import", name] if !name.ends_with('.') => {
                if let Some(simple) = name.rsplit('.').next() {
                    self.imports.insert(simple.to_string(), name.to_string());
                }
            }
            _ => {}
        }
    }

    fn push_type(&mut self, decl: TypeDecl) {
        let name = match self.stack.last() {
            Some(frame) => format!("{}${}", self.records[frame.record].name, decl.name),
            None => match &self.package {
                Some(pkg) => format!("{}.{}", pkg, decl.name),
                None => decl.name.clone(),
            },
        };

        let mut record = StructuredComment::new(name);
        if let Some(raw) = &self.doc {
            let (body, tags) = parse_comment(raw);
            record.body = body;
            record.tags = tags;
        }
        if decl.kind == TypeKind::Class {
            record.parent = decl.extends.and_then(|e| self.resolve_type(&e));
        }

        self.records.push(record);
        self.stack.push(Frame {
            record: self.records.len() - 1,
            body_depth: self.depth + 1,
            kind: decl.kind,
            constants_done: false,
        });
    }

    fn resolve_type(&self, name: &str) -> Option<String> {
        if name == "Object" || name == "java.lang.Object" {
            return None;
        }
        if let Some((head, tail)) = name.split_once('.') {
            if let Some(imported) = self.imports.get(head) {
                return Some(format!("{}${}", imported, tail.replace('.', "$")));
            }
            return Some(name.to_string());
        }
        if let Some(imported) = self.imports.get(name) {
            return Some(imported.clone());
        }
        Some(match &self.package {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        })
    }

    fn member(&mut self) {
        let Some(index) = self.stack.last().map(|f| f.record) else {
            return;
        };
        let names = field_names(&self.buffer);
        if names.is_empty() {
            return;
        }

        let comment = match &self.doc {
            Some(raw) => {
                let (body, tags) = parse_comment(raw);
                FieldComment { body, tags }
            }
            None => FieldComment::default(),
        };

        let record = &mut self.records[index];
        for name in names {
            record.fields.entry(name).or_insert_with(|| comment.clone());
        }
    }
}

fn type_declaration(buffer: &[Token]) -> Option<TypeDecl> {
    let mut iter = buffer.iter().enumerate();
    let (pos, kind) = iter.find_map(|(i, t)| match t {
        Token::Word(w) if w == "class" => Some((i, TypeKind::Class)),
        Token::Word(w) if w == "interface" => Some((i, TypeKind::Interface)),
        Token::Word(w) if w == "enum" => Some((i, TypeKind::Enum)),
        _ => None,
    })?;

    let name = match buffer.get(pos + 1) {
        Some(Token::Word(name)) => name.clone(),
        _ => return None,
    };

    let mut angle = 0usize;
    let mut extends = None;
    let mut rest = buffer[pos + 2..].iter();
    while let Some(token) = rest.next() {
        match token {
            Token::Symbol('<') => angle += 1,
            Token::Symbol('>') => angle = angle.saturating_sub(1),
            Token::Word(w) if w == "extends" && angle == 0 => {
                if let Some(Token::Word(parent)) = rest.next() {
                    extends = Some(parent.clone());
                }
                break;
            }
            _ => {}
        }
    }

    Some(TypeDecl {
        kind,
        name,
        extends,
    })
}

/// Removes `@Annotation` and `@Annotation(...)` from a declaration.
fn strip_annotations(buffer: &[Token]) -> Vec<&Token> {
    let mut out = Vec::with_capacity(buffer.len());
    let mut i = 0;
    while i < buffer.len() {
        if buffer[i] == Token::Symbol('@') {
            i += 2;
            if buffer.get(i) == Some(&Token::Symbol('(')) {
                let mut parens = 0usize;
                while i < buffer.len() {
                    match buffer[i] {
                        Token::Symbol('(') => parens += 1,
                        Token::Symbol(')') => {
                            parens -= 1;
                            if parens == 0 {
                                i += 1;
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
            }
            continue;
        }
        out.push(&buffer[i]);
        i += 1;
    }
    out
}

fn is_identifier(word: &str) -> bool {
    !word.contains('.')
        && word
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
}

/// Names declared by a field declaration, or nothing for methods,
/// constructors and initializer blocks.
fn field_names(buffer: &[Token]) -> Vec<String> {
    let tokens = strip_annotations(buffer);

    let mut segments: Vec<Vec<&Token>> = vec![Vec::new()];
    let mut angle = 0usize;
    let mut parens = 0usize;
    let mut in_initializer = false;
    for token in tokens {
        match token {
            Token::Symbol('(') if !in_initializer => return Vec::new(),
            Token::Symbol('(') => parens += 1,
            Token::Symbol(')') => parens = parens.saturating_sub(1),
            Token::Symbol('<') if !in_initializer => angle += 1,
            Token::Symbol('>') if !in_initializer => angle = angle.saturating_sub(1),
            Token::Symbol('=') => in_initializer = true,
            Token::Symbol(',') if angle == 0 && parens == 0 => {
                segments.push(Vec::new());
                in_initializer = false;
                continue;
            }
            _ => {}
        }
        if !in_initializer {
            if let Some(segment) = segments.last_mut() {
                segment.push(token);
            }
        }
    }

    let words = |segment: &[&Token]| -> Vec<String> {
        segment
            .iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w.clone()),
                _ => None,
            })
            .collect()
    };

    let first = words(&segments[0]);
    if first.len() < 2 {
        return Vec::new();
    }

    segments
        .iter()
        .filter_map(|segment| words(segment).pop())
        .filter(|name| is_identifier(name))
        .collect()
}
