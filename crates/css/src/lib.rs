//! CSS reference scanning and rewriting, built on `cssparser` the way the
//! teacher's `css_syntax` crate is — but where that module only tokenizes
//! rules and declarations for reading, this one also needs to find and
//! *replace* the two reference shapes that matter to migration:
//! `url(...)` functions and `@import` targets. `cssparser`'s token-level
//! API (`Parser`, `ParserInput`, `parse_nested_block`) is reused directly;
//! the rule/declaration-tree parser the teacher built is not, since
//! migration never needs a structured stylesheet, only its references.

use cssparser::{Parser, ParserInput, SourcePosition, Token};

/// What kind of reference a scanned/rewritten span represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// A `url(...)` function, quoted or bare.
    Url,
    /// The target of an `@import` rule.
    Import,
}

/// One reference found while scanning, with its raw (un-resolved) text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssRef {
    pub kind: RefKind,
    pub raw: String,
}

/// Every `url(...)` and `@import` target in `css`, in source order.
#[must_use]
pub fn scan(css: &str) -> Vec<CssRef> {
    let mut found = Vec::new();
    let _ = walk(css, |raw: &str, kind| {
        found.push(CssRef {
            kind,
            raw: raw.to_owned(),
        });
        None
    });
    found
}

/// Rewrite every `url(...)` and `@import` target in `css`, replacing each
/// with whatever `resolve` returns for it (or leaving it untouched when
/// `resolve` returns `None`).
#[must_use]
pub fn rewrite(css: &str, resolve: impl FnMut(&str, RefKind) -> Option<String>) -> String {
    walk(css, resolve)
}

fn walk(css: &str, mut resolve: impl FnMut(&str, RefKind) -> Option<String>) -> String {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(css.len());
    let mut last_end: SourcePosition = parser.position();

    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::UnquotedUrl(ref raw) => {
                let raw = raw.to_string();
                let end = parser.position();
                emit_replaceable(&mut out, &parser, last_end, start, end, &raw, RefKind::Url, &mut resolve);
                last_end = end;
            }
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                let inner = read_nested_string(&mut parser);
                let end = parser.position();
                if let Some(raw) = inner {
                    emit_replaceable(&mut out, &parser, last_end, start, end, &raw, RefKind::Url, &mut resolve);
                } else {
                    out.push_str(parser.slice(last_end..end));
                }
                last_end = end;
            }
            Token::AtKeyword(ref name) if name.eq_ignore_ascii_case("import") => {
                if let Some((raw, span_start, span_end)) = read_import_target(&mut parser) {
                    emit_replaceable(&mut out, &parser, last_end, span_start, span_end, &raw, RefKind::Import, &mut resolve);
                    last_end = span_end;
                }
            }
            _ => {}
        }
    }
    out.push_str(parser.slice_from(last_end));
    out
}

fn emit_replaceable(
    out: &mut String,
    parser: &Parser,
    last_end: SourcePosition,
    span_start: SourcePosition,
    span_end: SourcePosition,
    raw: &str,
    kind: RefKind,
    resolve: &mut impl FnMut(&str, RefKind) -> Option<String>,
) {
    out.push_str(parser.slice(last_end..span_start));
    match resolve(raw, kind) {
        Some(replacement) => out.push_str(&format!("url({})", quote(&replacement))),
        None => {
            log::trace!("leaving {kind:?} reference '{raw}' unresolved");
            out.push_str(parser.slice(span_start..span_end));
        }
    }
}

/// Consume a `url(...)` function's contents (already past the opening
/// paren), returning the quoted string inside if that's what it holds.
fn read_nested_string(parser: &mut Parser) -> Option<String> {
    let mut inner = None;
    let _ = parser.parse_nested_block::<_, (), ()>(|input| {
        while let Ok(token) = input.next_including_whitespace_and_comments() {
            if let Token::QuotedString(value) = token {
                inner = Some(value.to_string());
            }
            if !matches!(token, Token::WhiteSpace(_) | Token::Comment(_)) {
                break;
            }
        }
        Ok(())
    });
    inner
}

/// Past an `@import` keyword, find the string or `url(...)` target that
/// follows, skipping whitespace/comments. Returns the raw URL text and
/// the span it occupied (so the media-query tail, if any, is untouched).
fn read_import_target(parser: &mut Parser) -> Option<(String, SourcePosition, SourcePosition)> {
    loop {
        let start = parser.position();
        let token = parser.next_including_whitespace_and_comments().ok()?.clone();
        match token {
            Token::WhiteSpace(_) | Token::Comment(_) => continue,
            Token::QuotedString(value) => return Some((value.to_string(), start, parser.position())),
            Token::UnquotedUrl(value) => return Some((value.to_string(), start, parser.position())),
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                let inner = read_nested_string(parser)?;
                return Some((inner, start, parser.position()));
            }
            _ => return None,
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
