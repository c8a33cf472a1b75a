//! Path pattern matching for access control
//!
//! Patterns are route templates compiled once into anchored regexes:
//!
//! - `literal` segments match exactly
//! - `*` matches one segment
//! - `{name}` matches one segment and binds it to `name`
//! - `**` matches zero or more trailing segments (last segment only)
//! - `{*name}` matches zero or more trailing segments and binds them,
//!   including the leading `/` (last segment only)

use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Compiled path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    variables: Vec<String>,
    shape: String,
    catch_all: bool,
}

impl PathPattern {
    /// Parse and compile a path pattern
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(ConfigError::invalid_pattern(pattern, "must start with '/'"));
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut expr = String::from("^");
        let mut shape = String::new();
        let mut variables: Vec<String> = Vec::new();
        let mut catch_all = false;

        if rest.is_empty() {
            expr.push('/');
            shape.push('/');
        } else {
            let segments: Vec<&str> = rest.split('/').collect();
            let last = segments.len() - 1;
            catch_all = last == 0 && (segments[0] == "**" || segments[0].starts_with("{*"));

            for (index, segment) in segments.iter().enumerate() {
                match *segment {
                    "" => {
                        return Err(ConfigError::invalid_pattern(pattern, "empty path segment"));
                    }
                    "**" => {
                        if index != last {
                            return Err(ConfigError::invalid_pattern(
                                pattern,
                                "'**' is only allowed as the last segment",
                            ));
                        }
                        expr.push_str("(?s:/.*)?");
                        shape.push_str("/**");
                    }
                    "*" => {
                        expr.push_str("/[^/]+");
                        shape.push_str("/*");
                    }
                    _ => {
                        if let Some(inner) = segment
                            .strip_prefix('{')
                            .and_then(|s| s.strip_suffix('}'))
                        {
                            let (name, capture_rest) = match inner.strip_prefix('*') {
                                Some(name) => (name, true),
                                None => (inner, false),
                            };
                            validate_variable_name(pattern, name, &variables)?;

                            if capture_rest {
                                if index != last {
                                    return Err(ConfigError::invalid_pattern(
                                        pattern,
                                        format!("'{{*{name}}}' is only allowed as the last segment"),
                                    ));
                                }
                                expr.push_str(&format!("(?P<{name}>(?s:/.*)?)"));
                                shape.push_str("/**");
                            } else {
                                expr.push_str(&format!("/(?P<{name}>[^/]+)"));
                                shape.push_str("/*");
                            }
                            variables.push(name.to_string());
                        } else if segment.contains(['{', '}', '*']) {
                            return Err(ConfigError::invalid_pattern(
                                pattern,
                                format!(
                                    "segment '{segment}' mixes literal text with a wildcard or variable"
                                ),
                            ));
                        } else {
                            expr.push('/');
                            expr.push_str(&regex::escape(segment));
                            shape.push('/');
                            shape.push_str(segment);
                        }
                    }
                }
            }
        }

        expr.push('$');

        let regex =
            Regex::new(&expr).map_err(|e| ConfigError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            variables,
            shape,
            catch_all,
        })
    }

    /// The pattern as written in configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the variables this pattern binds, in declaration order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Whether the pattern binds a variable with this name
    pub fn binds(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Whether this pattern matches every path
    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// The pattern with variable names erased and any trailing `/` dropped
    ///
    /// Two patterns with the same canonical form match exactly the same paths.
    pub fn canonical(&self) -> &str {
        &self.shape
    }

    /// Match a request path, returning the bound (percent-decoded) variables
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(normalize(path))?;

        let variables = self
            .variables
            .iter()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.clone(), decode(m.as_str())))
            })
            .collect();

        Some(variables)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Drop one trailing separator so `/users/alice/` and `/users/alice` match alike
fn normalize(path: &str) -> &str {
    if path.is_empty() {
        return "/";
    }
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn validate_variable_name(pattern: &str, name: &str, seen: &[String]) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid {
        return Err(ConfigError::invalid_pattern(
            pattern,
            format!("invalid variable name '{name}'"),
        ));
    }
    if seen.iter().any(|s| s == name) {
        return Err(ConfigError::invalid_pattern(
            pattern,
            format!("variable '{name}' is bound more than once"),
        ));
    }
    Ok(())
}
