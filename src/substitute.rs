//! `%{name}` variable substitution with list expansion.
//!
//! A template is filled from a [`MetaVars`] map. When every referenced
//! variable holds a single value the result is one string. When some
//! referenced variables hold lists, the template is expanded over every
//! candidate of every such variable and the result is the de-duplicated
//! list of all strings produced:
//!
//! ```text
//! "%{a} - %{b}"  with  a = ["x", "y"], b = "z"   →   ["x - z", "y - z"]
//! "%{a}"         with  a = "x", b = ["1", "2"]   →   "x"
//! ```
//!
//! Variables that are lists but are not referenced by the template never
//! trigger expansion.

use crate::error::MetaError;
use crate::types::{MetaVars, VarValue};
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%\{(\w+)\}").unwrap());

/// Result of a substitution: one string, or every expanded candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substituted {
    One(String),
    Many(Vec<String>),
}

impl Substituted {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Substituted::One(s) => vec![s],
            Substituted::Many(list) => list,
        }
    }
}

/// Placeholder names referenced by `template`, first occurrence order, no repeats.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Fill `template` from `vars`, expanding over list-valued variables.
///
/// Fails with [`MetaError::MissingVariable`] when a referenced placeholder has
/// no variable.
pub fn substitute(template: &str, vars: &MetaVars) -> Result<Substituted, MetaError> {
    let names = placeholders(template);
    let expansion: Vec<(&String, &Vec<String>)> = vars
        .iter()
        .filter_map(|(name, value)| match value {
            VarValue::Many(candidates) if names.contains(name) => Some((name, candidates)),
            _ => None,
        })
        .collect();

    if expansion.is_empty() {
        return interpolate(template, vars).map(Substituted::One);
    }

    tracing::trace!(
        template,
        keys = ?expansion.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
        "expanding template"
    );

    let mut results: Vec<String> = Vec::new();
    for (name, candidates) in expansion {
        for candidate in candidates {
            let mut pinned = vars.clone();
            pinned.insert(name.clone(), VarValue::One(candidate.clone()));
            for result in substitute(template, &pinned)?.into_vec() {
                if !results.contains(&result) {
                    results.push(result);
                }
            }
        }
    }
    Ok(Substituted::Many(results))
}

/// Substitute every part of a list value, flattening expanded candidates.
pub fn substitute_all(parts: &[String], vars: &MetaVars) -> Result<Vec<String>, MetaError> {
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        out.extend(substitute(part, vars)?.into_vec());
    }
    Ok(out)
}

/// Straight replacement of every placeholder with its single value.
fn interpolate(template: &str, vars: &MetaVars) -> Result<String, MetaError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = &caps[1];
        let value = match vars.get(name) {
            Some(VarValue::One(v)) => v.as_str(),
            // Referenced lists are pinned before interpolation.
            Some(VarValue::Many(_)) | None => {
                return Err(MetaError::MissingVariable {
                    name: name.to_string(),
                    template: template.to_string(),
                });
            }
        };
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, VarValue)]) -> MetaVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn placeholders_in_order_without_repeats() {
        assert_eq!(
            placeholders("%{b} and %{a}, again %{b}"),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn placeholders_ignore_malformed() {
        assert!(placeholders("100% {x} %{} %{with space}").is_empty());
    }

    #[test]
    fn scalar_substitution() {
        let v = vars(&[("name", "Alice".into())]);
        assert_eq!(
            substitute("Profile of %{name}", &v).unwrap(),
            Substituted::One("Profile of Alice".into())
        );
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        assert_eq!(
            substitute("Login", &MetaVars::new()).unwrap(),
            Substituted::One("Login".into())
        );
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = substitute("Hi %{name}", &MetaVars::new()).unwrap_err();
        assert_eq!(
            err,
            MetaError::MissingVariable {
                name: "name".into(),
                template: "Hi %{name}".into()
            }
        );
    }

    #[test]
    fn list_variable_expands() {
        let v = vars(&[("a", vec!["x", "y"].into()), ("b", "z".into())]);
        assert_eq!(
            substitute("%{a} - %{b}", &v).unwrap(),
            Substituted::Many(vec!["x - z".into(), "y - z".into()])
        );
    }

    #[test]
    fn unreferenced_list_variable_does_not_expand() {
        let v = vars(&[("a", "x".into()), ("b", vec!["1", "2"].into())]);
        assert_eq!(substitute("%{a}", &v).unwrap(), Substituted::One("x".into()));
    }

    #[test]
    fn cross_product_over_two_lists() {
        let v = vars(&[("a", vec!["x", "y"].into()), ("b", vec!["1", "2"].into())]);
        assert_eq!(
            substitute("%{a}%{b}", &v).unwrap().into_vec(),
            vec!["x1", "x2", "y1", "y2"]
        );
    }

    #[test]
    fn expansion_deduplicates() {
        let v = vars(&[("a", vec!["x", "x", "y"].into())]);
        assert_eq!(substitute("%{a}", &v).unwrap().into_vec(), vec!["x", "y"]);
    }

    #[test]
    fn substitute_all_flattens() {
        let v = vars(&[("a", vec!["1", "2"].into())]);
        let parts = vec!["Users".to_string(), "#%{a}".to_string()];
        assert_eq!(substitute_all(&parts, &v).unwrap(), vec!["Users", "#1", "#2"]);
    }
}
