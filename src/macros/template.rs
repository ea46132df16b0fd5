//! Template compiler.
//!
//! Combines the parser output with a [`MacroMap`] into a [`Template`]: the
//! original source, the router path, the tree-normalized path and one
//! compiled [`TemplateParam`] per parameter. Function names are resolved and
//! their arguments bound here, so request-time validation never looks
//! anything up by name.

use std::fmt;
use std::sync::Arc;

use super::ast::{ParamType, ParameterDescriptor, DEFAULT_ERROR_CODE};
use super::parser::{self, PARAM_START, WILDCARD_PARAM_START};
use super::registry::{Evaluator, MacroMap, Validator};
use crate::error::RouteError;
use crate::path::clean_path;

/// A compiled parameter: type check plus bound functions.
#[derive(Clone)]
pub struct TemplateParam {
    /// Parameter name
    pub name: Arc<str>,
    /// Declared type
    pub ty: ParamType,
    /// The original `{...}` block
    pub src: String,
    /// Status reported when validation fails
    pub error_code: u16,
    evaluator: Evaluator,
    funcs: Vec<Validator>,
}

impl fmt::Debug for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateParam")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("src", &self.src)
            .field("error_code", &self.error_code)
            .field("funcs", &self.funcs.len())
            .finish()
    }
}

impl TemplateParam {
    fn compile(desc: ParameterDescriptor, macros: &MacroMap) -> Result<Self, RouteError> {
        let m = macros.get(desc.ty);
        let mut funcs = Vec::with_capacity(desc.funcs.len());
        for func in &desc.funcs {
            let validator = m
                .bind(&func.name, &func.args)
                .ok_or_else(|| RouteError::UnknownFunction {
                    param: desc.name.clone(),
                    type_name: desc.ty.to_string(),
                    function: func.name.clone(),
                })?
                .map_err(|e| RouteError::InvalidArgument {
                    param: desc.name.clone(),
                    function: func.name.clone(),
                    message: e.0,
                })?;
            funcs.push(validator);
        }

        Ok(Self {
            name: Arc::from(desc.name.as_str()),
            ty: desc.ty,
            src: desc.src,
            error_code: desc.error_code,
            evaluator: m.evaluator(),
            funcs,
        })
    }

    /// Type check, then every bound function in declared order.
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        (self.evaluator)(value) && self.funcs.iter().all(|f| f(value))
    }
}

/// A compiled path template.
#[derive(Clone, Debug)]
pub struct Template {
    /// Original unparsed source, e.g. `/api/user/{id:int min(1)}`
    pub src: String,
    /// Cleaned router path in bare syntax, e.g. `/api/user/:id`
    pub path: String,
    /// Tree path with parameters collapsed to markers, e.g. `/api/user/:`
    pub normalized: String,
    params: Vec<TemplateParam>,
}

impl Template {
    /// Parse and compile `src` against `macros`.
    ///
    /// # Errors
    ///
    /// Every parse error of [`parser::parse`], plus
    /// [`RouteError::UnknownFunction`] and [`RouteError::InvalidArgument`].
    pub fn compile(src: &str, macros: &MacroMap) -> Result<Self, RouteError> {
        let parsed = parser::parse(src)?;
        let params = parsed
            .params
            .into_iter()
            .map(|desc| TemplateParam::compile(desc, macros))
            .collect::<Result<Vec<_>, _>>()?;

        let path = clean_path(&parsed.path);
        let kept = path
            .split('/')
            .filter(|segment| segment.starts_with([PARAM_START, WILDCARD_PARAM_START]))
            .count();
        if kept != params.len() {
            let position = src.find("/..").map_or(0, |idx| idx + 1);
            return Err(RouteError::parse(
                src,
                position,
                "'..' removes a parameter segment",
            ));
        }
        let normalized = normalize(&path);

        Ok(Self {
            src: src.to_string(),
            path,
            normalized,
            params,
        })
    }

    /// Compiled parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[TemplateParam] {
        &self.params
    }

    /// True when the template declares no parameter.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.params.is_empty()
    }

    /// Names of the single-segment parameters, in order.
    #[must_use]
    pub fn dynamic_names(&self) -> Vec<Arc<str>> {
        self.params
            .iter()
            .filter(|p| !p.ty.is_wildcard())
            .map(|p| Arc::clone(&p.name))
            .collect()
    }

    /// Name of the trailing wildcard parameter, if any.
    #[must_use]
    pub fn wildcard_name(&self) -> Option<Arc<str>> {
        self.params
            .last()
            .filter(|p| p.ty.is_wildcard())
            .map(|p| Arc::clone(&p.name))
    }

    /// Validate captured values, given positionally in declaration order.
    ///
    /// Returns the `else` status of the first parameter that rejects its
    /// value. A value count that does not match the parameter count is
    /// rejected with the default status.
    pub fn validate(&self, values: &[&str]) -> Result<(), u16> {
        if values.len() != self.params.len() {
            return Err(DEFAULT_ERROR_CODE);
        }
        for (param, value) in self.params.iter().zip(values) {
            if !param.accepts(value) {
                return Err(param.error_code);
            }
        }
        Ok(())
    }
}

/// Collapse `:name` to `:` and `*name` to `*`.
fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        if segment.starts_with(PARAM_START) {
            out.push(PARAM_START);
        } else if segment.starts_with(WILDCARD_PARAM_START) {
            out.push(WILDCARD_PARAM_START);
        } else {
            out.push_str(segment);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_normalizes_path() {
        let macros = MacroMap::default();
        let t = Template::compile("/api//users/{id:int min(1)}/files/{p:path}", &macros).unwrap();
        assert_eq!(t.path, "/api/users/:id/files/*p");
        assert_eq!(t.normalized, "/api/users/:/files/*");
        assert_eq!(t.dynamic_names(), vec![Arc::from("id")]);
        assert_eq!(t.wildcard_name(), Some(Arc::from("p")));
        assert!(!t.is_static());
    }

    #[test]
    fn test_static_template() {
        let t = Template::compile("/health/", &MacroMap::default()).unwrap();
        assert_eq!(t.path, "/health");
        assert_eq!(t.normalized, "/health");
        assert!(t.is_static());
        assert_eq!(t.validate(&[]), Ok(()));
    }

    #[test]
    fn test_validate_short_circuits_with_error_code() {
        let macros = MacroMap::default();
        let t = Template::compile(
            "/profile/{id:int min(1)}/friends/{friendid:int min(1) else 504}",
            &macros,
        )
        .unwrap();
        assert_eq!(t.validate(&["3", "4"]), Ok(()));
        assert_eq!(t.validate(&["0", "4"]), Err(404));
        assert_eq!(t.validate(&["3", "0"]), Err(504));
        assert_eq!(t.validate(&["3", "abc"]), Err(504));
        assert_eq!(t.validate(&["3"]), Err(404));
    }

    #[test]
    fn test_dot_dot_may_not_drop_a_parameter() {
        let macros = MacroMap::default();
        let err = Template::compile("/{a}/../x", &macros).unwrap_err();
        assert!(
            matches!(err, RouteError::Parse { position: 5, .. }),
            "{err:?}"
        );
        assert!(Template::compile("/users/{id}/files/../../{p:path}", &macros).is_err());

        // dropping a literal segment is fine
        let t = Template::compile("/a/b/../{id:int}", &macros).unwrap();
        assert_eq!(t.path, "/a/:id");
        assert_eq!(t.validate(&["7"]), Ok(()));
    }

    #[test]
    fn test_unknown_function_and_bad_arguments() {
        let macros = MacroMap::default();
        assert_eq!(
            Template::compile("/{id:int between(1,2)}", &macros).unwrap_err(),
            RouteError::UnknownFunction {
                param: "id".into(),
                type_name: "int".into(),
                function: "between".into(),
            }
        );
        // prefix is a string function, not an int one
        assert!(matches!(
            Template::compile("/{id:int prefix(1)}", &macros),
            Err(RouteError::UnknownFunction { .. })
        ));
        assert!(matches!(
            Template::compile("/{id:int range(1)}", &macros),
            Err(RouteError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Template::compile("/{id:int min(abc)}", &macros),
            Err(RouteError::InvalidArgument { .. })
        ));
    }
}
