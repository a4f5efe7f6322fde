//! Header scan for model files.
//!
//! Only the `namespace` and `import` declarations are read. Everything else
//! in the file is passed through untouched.

use crate::error::ModelError;

/// One `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportDecl {
    pub name: String,
    pub uri: Option<String>,
}

/// Declarations found at the top of a model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub namespace: Option<String>,
    pub imports: Vec<ImportDecl>,
}

pub(crate) fn scan(definitions: &str) -> Result<Header, ModelError> {
    let mut header = Header {
        namespace: None,
        imports: Vec::new(),
    };
    let mut in_block = false;

    for (idx, raw) in definitions.lines().enumerate() {
        let line = strip_comments(raw, &mut in_block);
        let mut tokens = line.split_whitespace();
        let malformed = || ModelError::MalformedDeclaration {
            line: idx + 1,
            text: raw.trim().to_string(),
        };

        match tokens.next() {
            Some("namespace") => {
                let ns = tokens.next().ok_or_else(malformed)?;
                // first declaration wins
                if header.namespace.is_none() {
                    header.namespace = Some(ns.to_string());
                }
            }
            Some("import") => {
                let name = tokens.next().ok_or_else(malformed)?;
                let uri = match tokens.next() {
                    Some("from") => Some(tokens.next().ok_or_else(malformed)?.to_string()),
                    Some(_) => return Err(malformed()),
                    None => None,
                };
                header.imports.push(ImportDecl {
                    name: name.to_string(),
                    uri,
                });
            }
            _ => {}
        }
    }

    Ok(header)
}

/// Remove `/* */` and `//` comments from one line.
///
/// A comment opens only at the start of a token, so `//` and `/*` inside a
/// URI are kept.
fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    loop {
        if *in_block {
            let Some(end) = rest.find("*/") else {
                return out;
            };
            out.push(' ');
            rest = &rest[end + 2..];
            *in_block = false;
        }

        match comment_start(rest) {
            Some((at, Comment::Line)) => {
                out.push_str(&rest[..at]);
                return out;
            }
            Some((at, Comment::Block)) => {
                out.push_str(&rest[..at]);
                rest = &rest[at + 2..];
                *in_block = true;
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

enum Comment {
    Line,
    Block,
}

/// First `//` or `/*` that starts a token.
fn comment_start(s: &str) -> Option<(usize, Comment)> {
    s.match_indices('/')
        .map(|(i, _)| i)
        .filter(|&i| s[..i].chars().next_back().is_none_or(char::is_whitespace))
        .find_map(|i| match s.as_bytes().get(i + 1) {
            Some(b'/') => Some((i, Comment::Line)),
            Some(b'*') => Some((i, Comment::Block)),
            _ => None,
        })
}
