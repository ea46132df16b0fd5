//! Macro/type registry.
//!
//! Every [`ParamType`] has a [`Macro`]: a character-class evaluator plus a
//! table of named parameter functions. A function is registered as a
//! builder that receives the literal arguments written in the template
//! (`range(1,5)`) and returns the request-time [`Validator`]. Builders run
//! once, while a template compiles; requests only ever call the returned
//! validators.
//!
//! ```rust
//! use brrtmux::macros::{MacroMap, ParamType};
//! use std::sync::Arc;
//!
//! let mut macros = MacroMap::default();
//! macros
//!     .macro_mut(ParamType::Int)
//!     .register_func("even", |args| {
//!         args.expect_len(0)?;
//!         Ok(Arc::new(|v: &str| v.parse::<i64>().is_ok_and(|n| n % 2 == 0)))
//!     });
//! assert!(macros.get(ParamType::Int).has_func("even"));
//! ```
//!
//! The registry is filled at configuration time and read-only afterwards.
//! Registering functions while routes are being compiled elsewhere is not
//! supported.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::ast::{FuncArg, ParamType};

/// Request-time check bound to one parameter function.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Character-class check for a parameter type.
pub type Evaluator = fn(&str) -> bool;

type FuncBuilder = Arc<dyn Fn(&FuncArgs<'_>) -> Result<Validator, ArgError> + Send + Sync>;

/// Why a function builder rejected its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgError(pub String);

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ArgError {}

/// Typed access to the literal arguments of one function call.
#[derive(Debug, Clone, Copy)]
pub struct FuncArgs<'a> {
    args: &'a [FuncArg],
}

impl<'a> FuncArgs<'a> {
    pub(crate) fn new(args: &'a [FuncArg]) -> Self {
        Self { args }
    }

    /// Number of arguments written in the template.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// True when the call had no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Fail unless exactly `n` arguments were given.
    pub fn expect_len(&self, n: usize) -> Result<(), ArgError> {
        if self.args.len() == n {
            Ok(())
        } else {
            Err(ArgError(format!(
                "expected {n} argument(s), got {}",
                self.args.len()
            )))
        }
    }

    /// The `idx`-th argument as an integer.
    pub fn int(&self, idx: usize) -> Result<i64, ArgError> {
        match self.args.get(idx) {
            Some(FuncArg::Int(n)) => Ok(*n),
            Some(FuncArg::Str(s)) => Err(ArgError(format!(
                "argument {} must be a number, got '{s}'",
                idx + 1
            ))),
            None => Err(ArgError(format!("missing argument {}", idx + 1))),
        }
    }

    /// The `idx`-th argument as text.
    pub fn str(&self, idx: usize) -> Result<String, ArgError> {
        self.args
            .get(idx)
            .map(FuncArg::as_string)
            .ok_or_else(|| ArgError(format!("missing argument {}", idx + 1)))
    }
}

/// Evaluator and function table of one parameter type.
#[derive(Clone)]
pub struct Macro {
    ty: ParamType,
    evaluator: Evaluator,
    funcs: HashMap<String, FuncBuilder>,
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Macro")
            .field("ty", &self.ty)
            .field("funcs", &names)
            .finish()
    }
}

impl Macro {
    fn new(ty: ParamType, evaluator: Evaluator) -> Self {
        Self {
            ty,
            evaluator,
            funcs: HashMap::new(),
        }
    }

    /// The type this macro validates.
    #[must_use]
    pub fn ty(&self) -> ParamType {
        self.ty
    }

    /// The character-class check for this type.
    #[must_use]
    pub fn evaluator(&self) -> Evaluator {
        self.evaluator
    }

    /// Register (or replace) a parameter function.
    pub fn register_func<F>(&mut self, name: &str, builder: F) -> &mut Self
    where
        F: Fn(&FuncArgs<'_>) -> Result<Validator, ArgError> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Arc::new(builder));
        self
    }

    /// True when `name` is registered on this type.
    #[must_use]
    pub fn has_func(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Bind literal arguments to the function `name`.
    ///
    /// `None` when no such function is registered.
    pub(crate) fn bind(&self, name: &str, args: &[FuncArg]) -> Option<Result<Validator, ArgError>> {
        self.funcs
            .get(name)
            .map(|builder| builder(&FuncArgs::new(args)))
    }
}

/// The registry: one [`Macro`] per parameter type.
#[derive(Debug, Clone)]
pub struct MacroMap {
    string: Macro,
    int: Macro,
    alphabetical: Macro,
    file: Macro,
    path: Macro,
}

impl Default for MacroMap {
    fn default() -> Self {
        let mut string = Macro::new(ParamType::String, |v| !v.is_empty());
        let mut int = Macro::new(ParamType::Int, |v| {
            !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit())
        });
        let mut alphabetical = Macro::new(ParamType::Alphabetical, |v| {
            !v.is_empty() && v.bytes().all(|b| b.is_ascii_alphabetic())
        });
        let mut file = Macro::new(ParamType::File, |v| {
            !v.is_empty()
                && v
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        });
        let mut path = Macro::new(ParamType::Path, |_| true);

        for m in [
            &mut string,
            &mut int,
            &mut alphabetical,
            &mut file,
            &mut path,
        ] {
            m.register_func("regexp", regexp);
        }
        for m in [&mut string, &mut path] {
            m.register_func("prefix", |args| {
                args.expect_len(1)?;
                let prefix = args.str(0)?;
                Ok(Arc::new(move |v: &str| v.starts_with(prefix.as_str())))
            })
            .register_func("suffix", |args| {
                args.expect_len(1)?;
                let suffix = args.str(0)?;
                Ok(Arc::new(move |v: &str| v.ends_with(suffix.as_str())))
            })
            .register_func("contains", |args| {
                args.expect_len(1)?;
                let needle = args.str(0)?;
                Ok(Arc::new(move |v: &str| v.contains(needle.as_str())))
            });
        }
        for m in [&mut string, &mut alphabetical, &mut file] {
            m.register_func("min", |args| {
                args.expect_len(1)?;
                let min = args.int(0)?;
                Ok(Arc::new(move |v: &str| v.chars().count() as i64 >= min))
            })
            .register_func("max", |args| {
                args.expect_len(1)?;
                let max = args.int(0)?;
                Ok(Arc::new(move |v: &str| v.chars().count() as i64 <= max))
            });
        }

        int.register_func("min", |args| {
            args.expect_len(1)?;
            let min = args.int(0)?;
            Ok(Arc::new(move |v: &str| v.parse::<i64>().is_ok_and(|n| n >= min)))
        })
        .register_func("max", |args| {
            args.expect_len(1)?;
            let max = args.int(0)?;
            Ok(Arc::new(move |v: &str| v.parse::<i64>().is_ok_and(|n| n <= max)))
        })
        .register_func("range", |args| {
            args.expect_len(2)?;
            let (min, max) = (args.int(0)?, args.int(1)?);
            if min > max {
                return Err(ArgError(format!("range({min},{max}) is empty")));
            }
            Ok(Arc::new(move |v: &str| {
                v.parse::<i64>().is_ok_and(|n| (min..=max).contains(&n))
            }))
        });

        Self {
            string,
            int,
            alphabetical,
            file,
            path,
        }
    }
}

fn regexp(args: &FuncArgs<'_>) -> Result<Validator, ArgError> {
    args.expect_len(1)?;
    let expr = args.str(0)?;
    let re = Regex::new(&expr).map_err(|e| ArgError(format!("invalid regexp '{expr}': {e}")))?;
    Ok(Arc::new(move |v: &str| re.is_match(v)))
}

impl MacroMap {
    /// Registry with the built-in types and functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Macro of a type. [`ParamType::Unexpected`] maps to the string macro.
    #[must_use]
    pub fn get(&self, ty: ParamType) -> &Macro {
        match ty {
            ParamType::Int => &self.int,
            ParamType::Alphabetical => &self.alphabetical,
            ParamType::File => &self.file,
            ParamType::Path => &self.path,
            ParamType::String | ParamType::Unexpected => &self.string,
        }
    }

    /// Mutable macro of a type, for registering functions.
    pub fn macro_mut(&mut self, ty: ParamType) -> &mut Macro {
        match ty {
            ParamType::Int => &mut self.int,
            ParamType::Alphabetical => &mut self.alphabetical,
            ParamType::File => &mut self.file,
            ParamType::Path => &mut self.path,
            ParamType::String | ParamType::Unexpected => &mut self.string,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(macros: &MacroMap, ty: ParamType, name: &str, args: &[FuncArg]) -> Validator {
        macros.get(ty).bind(name, args).unwrap().unwrap()
    }

    #[test]
    fn test_type_evaluators() {
        let macros = MacroMap::default();
        let int = macros.get(ParamType::Int).evaluator();
        assert!(int("42"));
        assert!(!int("-1"));
        assert!(!int("4a"));
        assert!(!int(""));

        let alpha = macros.get(ParamType::Alphabetical).evaluator();
        assert!(alpha("Hello"));
        assert!(!alpha("hello1"));

        let file = macros.get(ParamType::File).evaluator();
        assert!(file("app-v1_2.min.js"));
        assert!(!file("a b"));

        assert!(macros.get(ParamType::String).evaluator()("anything here"));
        assert!(macros.get(ParamType::Path).evaluator()("a/b/c"));
    }

    #[test]
    fn test_int_range_is_inclusive() {
        let macros = MacroMap::default();
        let range = bind(&macros, ParamType::Int, "range", &[FuncArg::Int(1), FuncArg::Int(5)]);
        assert!(range("1"));
        assert!(range("5"));
        assert!(!range("0"));
        assert!(!range("6"));
        assert!(!range("99999999999999999999999"));
    }

    #[test]
    fn test_argument_errors() {
        let macros = MacroMap::default();
        let int = macros.get(ParamType::Int);
        let err = int
            .bind("range", &[FuncArg::Int(1)])
            .unwrap()
            .err()
            .unwrap();
        assert_eq!(err.0, "expected 2 argument(s), got 1");

        let err = int
            .bind("min", &[FuncArg::Str("one".into())])
            .unwrap()
            .err()
            .unwrap();
        assert!(err.0.contains("must be a number"));

        assert!(macros
            .get(ParamType::String)
            .bind("regexp", &[FuncArg::Str("([".into())])
            .unwrap()
            .is_err());
        assert!(int.bind("nope", &[]).is_none());
    }

    #[test]
    fn test_string_functions() {
        let macros = MacroMap::default();
        let prefix = bind(&macros, ParamType::String, "prefix", &[FuncArg::Str("v".into())]);
        assert!(prefix("v2"));
        assert!(!prefix("2v"));

        let min = bind(&macros, ParamType::String, "min", &[FuncArg::Int(3)]);
        assert!(min("abc"));
        assert!(!min("ab"));

        let re = bind(
            &macros,
            ParamType::String,
            "regexp",
            &[FuncArg::Str("^[a-z]+$".into())],
        );
        assert!(re("lower"));
        assert!(!re("Upper"));
    }

    #[test]
    fn test_user_registered_function() {
        let mut macros = MacroMap::default();
        macros
            .macro_mut(ParamType::Int)
            .register_func("even", |args| {
                args.expect_len(0)?;
                Ok(Arc::new(|v: &str| v.parse::<i64>().is_ok_and(|n| n % 2 == 0)))
            });
        let even = bind(&macros, ParamType::Int, "even", &[]);
        assert!(even("4"));
        assert!(!even("5"));
        assert!(!macros.get(ParamType::String).has_func("even"));
    }
}
