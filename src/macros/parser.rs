//! Path-template parser.
//!
//! Turns a registered path such as `/users/{id:int range(1,500) else 400}/files/{p:path}`
//! into an ordered list of [`ParameterDescriptor`]s plus the same path in the
//! bare router syntax (`/users/:id/files/*p`).
//!
//! A parameter starts at `{` (or the legacy `:name` / `*name` prefixes) and
//! must occupy a whole segment. Inside a block, parentheses nest, so function
//! arguments may contain `}` or `/` (`regexp(^[a-z]{2}$)`).

use super::ast::{FuncArg, ParamFunc, ParamType, ParameterDescriptor};
use crate::error::RouteError;

/// Character that starts a named parameter in the bare router syntax.
pub const PARAM_START: char = ':';
/// Character that starts a wildcard parameter in the bare router syntax.
pub const WILDCARD_PARAM_START: char = '*';

/// Output of [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// The path with every block reduced to `:name` / `*name`
    pub path: String,
    /// Parameters in declaration order
    pub params: Vec<ParameterDescriptor>,
}

/// Parse a registered path.
///
/// # Errors
///
/// Returns [`RouteError::Parse`] for malformed syntax, [`RouteError::UnknownType`]
/// for an unknown type identifier, [`RouteError::WildcardNotLast`] when a
/// `path` parameter is followed by more segments and
/// [`RouteError::DuplicateParam`] when a name repeats.
pub fn parse(src: &str) -> Result<ParsedPath, RouteError> {
    let bytes = src.as_bytes();
    let mut out = String::with_capacity(src.len());
    let mut params: Vec<ParameterDescriptor> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let at_segment_start = i == 0 || bytes[i - 1] == b'/';
        match bytes[i] {
            b'{' => {
                if !at_segment_start {
                    return Err(RouteError::parse(
                        src,
                        i,
                        "a parameter must start a path segment",
                    ));
                }
                let end = block_end(src, i)?;
                let param = parse_block(src, i, &src[i + 1..end])?;
                i = end + 1;
                if i < bytes.len() && bytes[i] != b'/' {
                    return Err(RouteError::parse(
                        src,
                        i,
                        "a parameter must end its path segment",
                    ));
                }
                i = push_param(src, i, param, &mut out, &mut params)?;
            }
            b':' | b'*' if at_segment_start => {
                let name_end = src[i + 1..].find('/').map_or(src.len(), |p| p + i + 1);
                let name = &src[i + 1..name_end];
                if name.is_empty() || !name.bytes().all(is_ident_byte) {
                    return Err(RouteError::parse(src, i, "invalid parameter name"));
                }
                let ty = if bytes[i] == b'*' {
                    ParamType::Path
                } else {
                    ParamType::String
                };
                let param = ParameterDescriptor::new(&src[i..name_end], name, ty);
                i = push_param(src, name_end, param, &mut out, &mut params)?;
            }
            b':' | b'*' | b'}' => {
                return Err(RouteError::parse(
                    src,
                    i,
                    format!("reserved character '{}' in a static segment", bytes[i] as char),
                ));
            }
            _ => {
                let next = src[i..]
                    .find(['{', '}', ':', '*'])
                    .map_or(src.len(), |p| p + i);
                out.push_str(&src[i..next]);
                i = next;
            }
        }
    }

    Ok(ParsedPath { path: out, params })
}

/// Record a parsed parameter and return the index to continue from.
fn push_param(
    src: &str,
    next: usize,
    param: ParameterDescriptor,
    out: &mut String,
    params: &mut Vec<ParameterDescriptor>,
) -> Result<usize, RouteError> {
    if params.iter().any(|p| p.name == param.name) {
        return Err(RouteError::DuplicateParam {
            path: src.to_string(),
            param: param.name,
        });
    }

    if param.ty.is_wildcard() {
        // only an optional trailing slash may follow a wildcard
        let rest = &src[next..];
        if !rest.is_empty() && rest != "/" {
            return Err(RouteError::WildcardNotLast {
                path: src.to_string(),
            });
        }
        out.push(WILDCARD_PARAM_START);
        out.push_str(&param.name);
        params.push(param);
        return Ok(src.len());
    }

    out.push(PARAM_START);
    out.push_str(&param.name);
    params.push(param);
    Ok(next)
}

/// Index of the `}` closing the block opened at `start`.
fn block_end(src: &str, start: usize) -> Result<usize, RouteError> {
    let mut depth = 0usize;
    for (offset, b) in src.as_bytes()[start + 1..].iter().enumerate() {
        let idx = start + 1 + offset;
        match b {
            b'(' => depth += 1,
            b')' => {
                if depth == 0 {
                    return Err(RouteError::parse(src, idx, "unbalanced ')'"));
                }
                depth -= 1;
            }
            b'}' if depth == 0 => return Ok(idx),
            b'/' if depth == 0 => break,
            _ => {}
        }
    }
    Err(RouteError::parse(src, start, "unterminated parameter"))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parse the inside of one `{...}` block.
fn parse_block(src: &str, offset: usize, inner: &str) -> Result<ParameterDescriptor, RouteError> {
    let block = &src[offset..offset + inner.len() + 2];
    let inner = inner.trim();

    let name_len = inner.bytes().take_while(|b| is_ident_byte(*b)).count();
    if name_len == 0 {
        return Err(RouteError::parse(src, offset, "missing parameter name"));
    }
    let name = &inner[..name_len];
    let mut rest = &inner[name_len..];

    let mut ty = ParamType::String;
    if let Some(after_colon) = rest.strip_prefix(':') {
        let type_len = after_colon.bytes().take_while(|b| is_ident_byte(*b)).count();
        if type_len == 0 {
            return Err(RouteError::parse(src, offset, "missing parameter type after ':'"));
        }
        let type_name = &after_colon[..type_len];
        ty = ParamType::lookup(type_name);
        if ty == ParamType::Unexpected {
            return Err(RouteError::UnknownType {
                param: name.to_string(),
                type_name: type_name.to_string(),
            });
        }
        rest = &after_colon[type_len..];
    }

    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Err(RouteError::parse(
            src,
            offset,
            format!("unexpected '{rest}' after parameter '{name}'"),
        ));
    }

    let mut param = ParameterDescriptor::new(block, name, ty);
    let mut tokens = split_top_level(rest.trim(), |c| c.is_whitespace()).into_iter();
    while let Some(token) = tokens.next() {
        if token == "else" {
            let code = tokens
                .next()
                .ok_or_else(|| RouteError::parse(src, offset, "missing status code after 'else'"))?;
            param.error_code = code
                .parse::<u16>()
                .ok()
                .filter(|c| (100..=599).contains(c))
                .ok_or_else(|| {
                    RouteError::parse(src, offset, format!("invalid status code '{code}'"))
                })?;
            if let Some(extra) = tokens.next() {
                return Err(RouteError::parse(
                    src,
                    offset,
                    format!("unexpected '{extra}' after the status code"),
                ));
            }
            break;
        }
        param.funcs.push(parse_func(src, offset, token)?);
    }

    Ok(param)
}

/// Parse `fname(arg1,arg2)`.
fn parse_func(src: &str, offset: usize, token: &str) -> Result<ParamFunc, RouteError> {
    let name_len = token.bytes().take_while(|b| is_ident_byte(*b)).count();
    let name = &token[..name_len];
    let args = token[name_len..]
        .strip_prefix('(')
        .and_then(|a| a.strip_suffix(')'));
    let (true, Some(args)) = (name_len > 0, args) else {
        return Err(RouteError::parse(
            src,
            offset,
            format!("expected a function call like 'name(args)', got '{token}'"),
        ));
    };

    let args = if args.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(args, |c| c == ',')
            .into_iter()
            .map(|a| FuncArg::from_literal(a.trim()))
            .collect()
    };

    Ok(ParamFunc {
        name: name.to_string(),
        args,
    })
}

/// Split on `sep` outside of any bracket pair, dropping empty pieces for
/// whitespace separators.
fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if depth == 0 && sep(c) => {
                pieces.push(&s[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&s[start..]);
    if sep(' ') {
        pieces.retain(|p| !p.is_empty());
    }
    pieces
}
