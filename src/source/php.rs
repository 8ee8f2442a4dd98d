//! Text parser for PHP glyph tables.
//!
//! Recognises assignments of array literals into the table variable:
//!
//! ```text
//! $c[0x41] = array(0, 1, 1, 0, ...);
//! $c['.notdef'] = [1, 1, 1, ...];
//! $data->c[65] = array();
//! ```
//!
//! `//`, `#` and `/* */` comments are ignored. Nothing is executed.

use std::path::{Path, PathBuf};

use super::{read_source, GlyphSource, GlyphTable};
use crate::error::{DefontError, Result};
use crate::types::GlyphKey;

/// Name of the table variable.
const TABLE_VAR: &str = "c";

/// Reads a PHP glyph table as text.
#[derive(Debug, Clone)]
pub struct PhpArraySource {
    path: PathBuf,
}

impl PhpArraySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl GlyphSource for PhpArraySource {
    fn load(&self) -> Result<GlyphTable> {
        let text = read_source(&self.path)?;
        parse_php_table(&text)
    }

    fn describe(&self) -> String {
        format!("php {}", self.path.display())
    }
}

/// Parse every table assignment in `source`, in order.
pub fn parse_php_table(source: &str) -> Result<GlyphTable> {
    let text = strip_comments(source);
    let mut table = GlyphTable::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find('$') {
        let start = pos + found;
        let mut cursor = Cursor::new(&text, start + 1);

        if !cursor.table_target() {
            pos = start + 1;
            continue;
        }

        match cursor.assignment() {
            Ok(Some((key, pixels))) => {
                table.insert(key, pixels);
                pos = cursor.pos;
            }
            Ok(None) => pos = start + 1,
            Err(message) => return Err(parse_error(&text, cursor.pos, message)),
        }
    }

    if table.is_empty() {
        return Err(DefontError::Parse {
            message: "no glyph assignments found".to_string(),
            help: Some("Expected lines like $c[0x41] = array(0, 1, ...);".to_string()),
        });
    }

    Ok(table)
}

fn parse_error(text: &str, offset: usize, message: String) -> DefontError {
    let line = text[..offset.min(text.len())].matches('\n').count() + 1;
    DefontError::Parse {
        message: format!("line {}: {}", line, message),
        help: None,
    }
}

/// Blank out comments, keeping newlines so line numbers survive.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push(c);
                while let Some(s) = chars.next() {
                    out.push(s);
                    if s == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if s == c {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => skip_line(&mut chars, &mut out),
            '#' if chars.peek() != Some(&'[') => skip_line(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for s in chars.by_ref() {
                    out.push(if s == '\n' { '\n' } else { ' ' });
                    if prev == '*' && s == '/' {
                        break;
                    }
                    prev = s;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    out.push(' ');
    while let Some(&s) = chars.peek() {
        if s == '\n' {
            break;
        }
        out.push(' ');
        chars.next();
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn ident(&mut self) -> &'a str {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// `c[` or `data->c[`, positioned just after the `$`.
    fn table_target(&mut self) -> bool {
        let name = self.ident();
        if name.is_empty() {
            return false;
        }
        if name == TABLE_VAR && self.rest().starts_with('[') {
            self.pos += 1;
            return true;
        }
        if self.eat("->") {
            self.skip_ws();
            return self.ident() == TABLE_VAR && self.eat("[");
        }
        false
    }

    /// Key, `=` and array literal. `Ok(None)` when this is a read of the
    /// table rather than an assignment.
    fn assignment(&mut self) -> std::result::Result<Option<(GlyphKey, Vec<u8>)>, String> {
        let key = self.key()?;

        if !self.eat("=") || self.rest().starts_with('=') {
            return Ok(None);
        }

        self.skip_ws();
        let close = if self.eat("[") {
            "]"
        } else if self.ident().eq_ignore_ascii_case("array") && self.eat("(") {
            ")"
        } else {
            return Err(format!("expected array literal for key {}", key));
        };

        let pixels = self.values(close)?;
        if !self.eat(";") {
            return Err(format!("expected ';' after array for key {}", key));
        }

        Ok(Some((key, pixels)))
    }

    fn key(&mut self) -> std::result::Result<GlyphKey, String> {
        self.skip_ws();
        let key = match self.rest().chars().next() {
            Some(quote @ ('\'' | '"')) => {
                let name = self.string_literal(quote)?;
                GlyphKey::parse(&name)
            }
            _ => {
                let raw = self.take_while(|c| c != ']' && c != '\n');
                parse_int_key(raw.trim())?
            }
        };

        if !self.eat("]") {
            return Err("expected ']' after key".to_string());
        }
        Ok(key)
    }

    fn string_literal(&mut self, quote: char) -> std::result::Result<String, String> {
        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);

        while let Some((i, c)) = chars.next() {
            if c == quote {
                self.pos += i + c.len_utf8();
                return Ok(value);
            }
            if c == '\\' {
                match chars.next() {
                    Some((_, e)) if e == quote || e == '\\' => value.push(e),
                    Some((_, e)) => {
                        value.push('\\');
                        value.push(e);
                    }
                    None => break,
                }
            } else {
                value.push(c);
            }
        }

        Err("unterminated string key".to_string())
    }

    fn values(&mut self, close: &str) -> std::result::Result<Vec<u8>, String> {
        let mut pixels = Vec::new();

        loop {
            if self.eat(close) {
                return Ok(pixels);
            }

            self.skip_ws();
            let negative = self.eat("-");
            self.skip_ws();
            let literal = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if literal.is_empty() {
                return Err(format!("expected integer or '{}'", close));
            }
            let value = parse_int(literal)
                .ok_or_else(|| format!("invalid pixel literal '{}'", literal))?;
            if negative && value != 0 {
                return Err(format!("pixel value -{} out of range", value));
            }
            let pixel =
                u8::try_from(value).map_err(|_| format!("pixel value {} out of range", value))?;
            pixels.push(pixel);

            if !self.eat(",") {
                if self.eat(close) {
                    return Ok(pixels);
                }
                return Err(format!("expected ',' or '{}'", close));
            }
        }
    }
}

fn parse_int(literal: &str) -> Option<u64> {
    let literal = literal.replace('_', "");
    if let Some(hex) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = literal
        .strip_prefix("0b")
        .or_else(|| literal.strip_prefix("0B"))
    {
        return u64::from_str_radix(bin, 2).ok();
    }
    literal.parse().ok()
}

fn parse_int_key(raw: &str) -> std::result::Result<GlyphKey, String> {
    if raw.is_empty() {
        return Err("empty key".to_string());
    }
    parse_int(raw)
        .and_then(|v| u32::try_from(v).ok())
        .map(GlyphKey::Codepoint)
        .ok_or_else(|| format!("invalid key '{}'", raw))
}
