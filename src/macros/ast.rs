//! Parsed form of a `{name:type func(args) else code}` block.

use std::fmt;

/// Type of a path parameter.
///
/// Decides which characters a captured value may contain and whether the
/// parameter may span several segments (`Path` only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Returned by [`ParamType::lookup`] for an unknown identifier.
    Unexpected,
    /// Anything inside one segment. Default when the type is omitted.
    String,
    /// ASCII digits only.
    Int,
    /// ASCII letters only.
    Alphabetical,
    /// Letters, digits, `_`, `-` and `.`.
    File,
    /// The rest of the path, slashes included. Must be the last segment.
    Path,
}

impl ParamType {
    /// All types a template may name.
    pub const ALL: [ParamType; 5] = [
        ParamType::String,
        ParamType::Int,
        ParamType::Alphabetical,
        ParamType::File,
        ParamType::Path,
    ];

    /// Resolve a type identifier as written in a template.
    #[must_use]
    pub fn lookup(ident: &str) -> Self {
        match ident {
            "string" => ParamType::String,
            "int" => ParamType::Int,
            "alphabetical" => ParamType::Alphabetical,
            "file" => ParamType::File,
            "path" => ParamType::Path,
            _ => ParamType::Unexpected,
        }
    }

    /// The identifier used in templates.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Unexpected => "unexpected",
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::Alphabetical => "alphabetical",
            ParamType::File => "file",
            ParamType::Path => "path",
        }
    }

    /// True for the path-tail type.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, ParamType::Path)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal argument of a parameter function: `range(1,5)`, `prefix(v1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuncArg {
    /// Literal that parsed as an integer
    Int(i64),
    /// Anything else, kept verbatim
    Str(String),
}

impl FuncArg {
    pub(crate) fn from_literal(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => FuncArg::Int(n),
            Err(_) => FuncArg::Str(raw.to_string()),
        }
    }

    /// Integer view of the argument.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FuncArg::Int(n) => Some(*n),
            FuncArg::Str(_) => None,
        }
    }

    /// String view of the argument; integers are rendered back to text.
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            FuncArg::Int(n) => n.to_string(),
            FuncArg::Str(s) => s.clone(),
        }
    }
}

/// One function call attached to a parameter, e.g. `range(1,5)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamFunc {
    /// Function name (`range`)
    pub name: String,
    /// Positional literal arguments (`[1, 5]`)
    pub args: Vec<FuncArg>,
}

/// Default status code used when a parameter fails validation.
pub const DEFAULT_ERROR_CODE: u16 = 404;

/// Everything the parser learned about one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// The original block, e.g. `{id:int range(1,5) else 404}`
    pub src: String,
    /// Parameter name (`id`)
    pub name: String,
    /// Declared type (`Int`)
    pub ty: ParamType,
    /// Attached functions, in declaration order
    pub funcs: Vec<ParamFunc>,
    /// Status code reported when validation fails
    pub error_code: u16,
}

impl ParameterDescriptor {
    pub(crate) fn new(src: &str, name: &str, ty: ParamType) -> Self {
        Self {
            src: src.to_string(),
            name: name.to_string(),
            ty,
            funcs: Vec::new(),
            error_code: DEFAULT_ERROR_CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown_types() {
        for ty in ParamType::ALL {
            assert_eq!(ParamType::lookup(ty.as_str()), ty);
        }
        assert_eq!(ParamType::lookup("uuid"), ParamType::Unexpected);
        assert!(ParamType::Path.is_wildcard());
        assert!(!ParamType::Int.is_wildcard());
    }

    #[test]
    fn test_func_arg_literals() {
        assert_eq!(FuncArg::from_literal("42"), FuncArg::Int(42));
        assert_eq!(FuncArg::from_literal("-3").as_int(), Some(-3));
        assert_eq!(FuncArg::from_literal("^[a-z]+$").as_int(), None);
        assert_eq!(FuncArg::Int(7).as_string(), "7");
    }
}
