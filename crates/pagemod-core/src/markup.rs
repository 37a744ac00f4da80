//! A lightweight scanner for JSX elements and ES import declarations.
//!
//! This is not a parser. It recognises just enough structure (tag name,
//! attributes, matching close tag, named-import lists) for codemods to make
//! span-precise edits without reformatting anything around them.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Byte span in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unterminated <{name}> tag at byte {offset}")]
    UnterminatedTag { name: String, offset: usize },

    #[error("unterminated value for attribute '{attr}' at byte {offset}")]
    UnterminatedValue { attr: String, offset: usize },

    #[error("unexpected '{found}' inside <{name}> at byte {offset}")]
    UnexpectedChar {
        name: String,
        found: char,
        offset: usize,
    },

    #[error("no closing </{name}> for element at byte {offset}")]
    MissingClose { name: String, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `name="text"` or `name='text'`
    Str { quote: char, text: String },
    /// `name={expr}`, braces excluded
    Expr(String),
    /// Bare `name`
    Flag,
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Source form as written after `name=`; empty for flags
    pub fn to_source(&self) -> String {
        match self {
            AttrValue::Str { quote, text } => format!("{quote}{text}{quote}"),
            AttrValue::Expr(expr) => format!("{{{expr}}}"),
            AttrValue::Flag => String::new(),
        }
    }
}

/// One attribute of an opening tag. Spread attributes (`{...props}`) have an
/// empty name and an [`AttrValue::Expr`] value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
    pub span: Span,
}

impl Attribute {
    pub fn is_spread(&self) -> bool {
        self.name.is_empty()
    }

    pub fn to_source(&self) -> String {
        match &self.value {
            _ if self.is_spread() => self.value.to_source(),
            AttrValue::Flag => self.name.clone(),
            value => format!("{}={}", self.name, value.to_source()),
        }
    }
}

/// A scanned element: opening tag, attributes and (unless self-closing) the
/// span of its matching close tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub open: Span,
    pub close: Option<Span>,
    pub self_closing: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Whole element, children included
    pub fn span(&self) -> Span {
        Span::new(
            self.open.start,
            self.close.map_or(self.open.end, |close| close.end),
        )
    }
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':' | b'$')
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}

/// Find `needle` at or after `from` where the following byte does not
/// continue the tag name
fn find_tag_token(src: &str, needle: &str, from: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut pos = from;
    while let Some(rel) = src.get(pos..)?.find(needle) {
        let start = pos + rel;
        let after = start + needle.len();
        if bytes.get(after).is_none_or(|b| !is_name_char(*b)) {
            return Some(start);
        }
        pos = after;
    }
    None
}

fn find_open(src: &str, name: &str, from: usize) -> Option<usize> {
    find_tag_token(src, &format!("<{name}"), from)
}

fn find_close(src: &str, name: &str, from: usize) -> Option<usize> {
    find_tag_token(src, &format!("</{name}"), from)
}

/// Index just past the closing quote of the string literal starting at `open`
fn skip_string(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = *bytes.get(open)?;
    let mut pos = open + 1;
    while let Some(&b) = bytes.get(pos) {
        if b == b'\\' {
            pos += 2;
            continue;
        }
        if b == quote {
            return Some(pos + 1);
        }
        pos += 1;
    }
    None
}

/// Index just past the `}` matching the `{` at `open`. String literals and
/// comments are skipped so braces inside them do not count.
fn scan_braces(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open;
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            b'"' | b'\'' | b'`' => {
                pos = skip_string(bytes, pos)?;
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let rel = bytes.get(pos + 2..)?.windows(2).position(|w| w == b"*/")?;
                pos = pos + 2 + rel + 2;
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = bytes[pos..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |rel| pos + rel);
                continue;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Scan the opening tag at `start` (which points at `<`). Returns the
/// attributes, the index just past the tag and whether it self-closes.
fn scan_open_tag(
    src: &str,
    name: &str,
    start: usize,
) -> Result<(Vec<Attribute>, usize, bool), MarkupError> {
    let bytes = src.as_bytes();
    let mut pos = start + 1 + name.len();
    let mut attrs = Vec::new();

    loop {
        pos = skip_ws(bytes, pos);
        let Some(&b) = bytes.get(pos) else {
            return Err(MarkupError::UnterminatedTag {
                name: name.to_string(),
                offset: start,
            });
        };

        match b {
            b'>' => return Ok((attrs, pos + 1, false)),
            b'/' if bytes.get(pos + 1) == Some(&b'>') => return Ok((attrs, pos + 2, true)),
            b'{' => {
                let end = scan_braces(bytes, pos).ok_or_else(|| MarkupError::UnterminatedValue {
                    attr: "...".to_string(),
                    offset: pos,
                })?;
                attrs.push(Attribute {
                    name: String::new(),
                    value: AttrValue::Expr(src[pos + 1..end - 1].to_string()),
                    span: Span::new(pos, end),
                });
                pos = end;
            }
            b if is_name_char(b) => {
                let name_start = pos;
                while bytes.get(pos).is_some_and(|b| is_name_char(*b)) {
                    pos += 1;
                }
                let attr_name = src[name_start..pos].to_string();
                let name_end = pos;

                let eq = skip_ws(bytes, pos);
                if bytes.get(eq) != Some(&b'=') {
                    attrs.push(Attribute {
                        name: attr_name,
                        value: AttrValue::Flag,
                        span: Span::new(name_start, name_end),
                    });
                    continue;
                }

                let value_start = skip_ws(bytes, eq + 1);
                let unterminated = || MarkupError::UnterminatedValue {
                    attr: attr_name.clone(),
                    offset: value_start,
                };
                let value = match bytes.get(value_start) {
                    Some(&q @ (b'"' | b'\'')) => {
                        let close = src[value_start + 1..]
                            .find(q as char)
                            .map(|rel| value_start + 1 + rel)
                            .ok_or_else(unterminated)?;
                        pos = close + 1;
                        AttrValue::Str {
                            quote: q as char,
                            text: src[value_start + 1..close].to_string(),
                        }
                    }
                    Some(b'{') => {
                        let end = scan_braces(bytes, value_start).ok_or_else(unterminated)?;
                        pos = end;
                        AttrValue::Expr(src[value_start + 1..end - 1].to_string())
                    }
                    _ => return Err(unterminated()),
                };

                attrs.push(Attribute {
                    name: attr_name,
                    value,
                    span: Span::new(name_start, pos),
                });
            }
            _ => {
                return Err(MarkupError::UnexpectedChar {
                    name: name.to_string(),
                    found: src[pos..].chars().next().unwrap_or('?'),
                    offset: pos,
                });
            }
        }
    }
}

/// Span of the close tag matching an element opened at `start`, counting
/// nested elements of the same name
fn find_matching_close(
    src: &str,
    name: &str,
    start: usize,
    from: usize,
) -> Result<Span, MarkupError> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut pos = from;

    loop {
        match (find_open(src, name, pos), find_close(src, name, pos)) {
            (Some(open), Some(close)) if open < close => {
                let (_, end, self_closing) = scan_open_tag(src, name, open)?;
                if !self_closing {
                    depth += 1;
                }
                pos = end;
            }
            (_, Some(close)) => {
                let gt = skip_ws(bytes, close + 2 + name.len());
                if bytes.get(gt) != Some(&b'>') {
                    return Err(MarkupError::UnterminatedTag {
                        name: name.to_string(),
                        offset: close,
                    });
                }
                if depth == 0 {
                    return Ok(Span::new(close, gt + 1));
                }
                depth -= 1;
                pos = gt + 1;
            }
            (_, None) => {
                return Err(MarkupError::MissingClose {
                    name: name.to_string(),
                    offset: start,
                });
            }
        }
    }
}

fn scan_element(src: &str, name: &str, start: usize) -> Result<Element, MarkupError> {
    let (attrs, open_end, self_closing) = scan_open_tag(src, name, start)?;
    let close = if self_closing {
        None
    } else {
        Some(find_matching_close(src, name, start, open_end)?)
    };
    Ok(Element {
        name: name.to_string(),
        attrs,
        open: Span::new(start, open_end),
        close,
        self_closing,
    })
}

/// First `<name ...>` element in `src`. `<NameSuffix` does not match `Name`.
pub fn find_element(src: &str, name: &str) -> Result<Option<Element>, MarkupError> {
    find_element_from(src, name, 0)
}

/// First `<name ...>` element opening at or after byte `from`
pub fn find_element_from(
    src: &str,
    name: &str,
    from: usize,
) -> Result<Option<Element>, MarkupError> {
    match find_open(src, name, from) {
        Some(start) => scan_element(src, name, start).map(Some),
        None => Ok(None),
    }
}

/// Whether `src` contains an opening `<name` tag
pub fn contains_element(src: &str, name: &str) -> bool {
    find_open(src, name, 0).is_some()
}

/// Byte offsets of every opening `<name` tag in `src`
pub fn element_offsets(src: &str, name: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_open(src, name, pos) {
        offsets.push(start);
        pos = start + 1;
    }
    offsets
}

/// Number of opening `<name` tags inside `span`
pub fn count_elements(src: &str, name: &str, span: Span) -> usize {
    element_offsets(src, name)
        .into_iter()
        .filter(|&at| at >= span.start && at < span.end)
        .count()
}

static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*import[ \t]+(?:type[ \t]+)?\{(?P<list>[^}]*)\}\s*from\s*(?P<quote>['"])(?P<module>[^'"\n]+)['"][ \t]*;?"#,
    )
    .expect("named import pattern")
});

static ANY_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\b[^;'"]*['"][^'"\n]+['"][ \t]*;?"#).expect("import pattern")
});

/// `import { A, B as C } from 'module';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Whole declaration, trailing `;` included
    pub span: Span,
    /// Text between the braces
    pub list: Span,
    pub module: String,
    pub quote: char,
    /// Local bindings in declaration order (`C` for `B as C`)
    pub names: Vec<String>,
}

impl ImportDecl {
    pub fn imports(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Remove `//` and `/* */` comments
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn local_bindings(list: &str) -> Vec<String> {
    strip_comments(list)
        .split(',')
        .filter_map(|entry| entry.split_whitespace().last())
        .map(String::from)
        .collect()
}

/// All named-import declarations in source order
pub fn find_imports(src: &str) -> Vec<ImportDecl> {
    NAMED_IMPORT
        .captures_iter(src)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let list = caps.name("list")?;
            Some(ImportDecl {
                span: Span::new(whole.start(), whole.end()),
                list: Span::new(list.start(), list.end()),
                module: caps.name("module")?.as_str().to_string(),
                quote: caps.name("quote")?.as_str().chars().next()?,
                names: local_bindings(list.as_str()),
            })
        })
        .collect()
}

/// The first named-import declaration from `module`
pub fn find_import(src: &str, module: &str) -> Option<ImportDecl> {
    find_imports(src).into_iter().find(|decl| decl.module == module)
}

/// Whether any named import binds `name`
pub fn is_imported(src: &str, name: &str) -> bool {
    find_imports(src).iter().any(|decl| decl.imports(name))
}

/// Index just past the last top-level import statement
pub fn last_import_end(src: &str) -> Option<usize> {
    ANY_IMPORT.find_iter(src).last().map(|m| m.end())
}
