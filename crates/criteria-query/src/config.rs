//! Translator options.

use serde::Deserialize;

use crate::error::{CriteriaError, Result};

/// Naming options for generated aliases and parameters.
///
/// Both prefixes end up verbatim in query text, so they must be plain
/// identifiers: an ASCII letter or `_`, followed by ASCII alphanumerics or
/// `_`.
///
/// ```
/// use criteria_query::TranslatorOptions;
///
/// let options: TranslatorOptions = serde_json::from_str(r#"{"alias_prefix": "e"}"#).unwrap();
/// assert_eq!(options.alias_prefix, "e");
/// assert_eq!(options.parameter_prefix, "parameter_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorOptions {
    /// Prefix of table aliases; the root entity is `<prefix>0`.
    pub alias_prefix: String,
    /// Prefix of bound parameter names.
    pub parameter_prefix: String,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        TranslatorOptions {
            alias_prefix: "_t".to_string(),
            parameter_prefix: "parameter_".to_string(),
        }
    }
}

impl TranslatorOptions {
    /// Checks that both prefixes are plain identifiers.
    pub fn validate(&self) -> Result<()> {
        check_identifier("alias_prefix", &self.alias_prefix)?;
        check_identifier("parameter_prefix", &self.parameter_prefix)
    }
}

fn check_identifier(option: &'static str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CriteriaError::InvalidOption {
            option,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = TranslatorOptions::default();
        assert_eq!(options.alias_prefix, "_t");
        assert_eq!(options.parameter_prefix, "parameter_");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_non_identifiers() {
        let options = TranslatorOptions {
            alias_prefix: "t0 ; --".into(),
            ..TranslatorOptions::default()
        };
        assert_eq!(
            options.validate(),
            Err(CriteriaError::InvalidOption {
                option: "alias_prefix",
                value: "t0 ; --".into(),
            })
        );

        let options = TranslatorOptions {
            parameter_prefix: String::new(),
            ..TranslatorOptions::default()
        };
        assert!(options.validate().is_err());

        let options = TranslatorOptions {
            parameter_prefix: "1p".into(),
            ..TranslatorOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn deserialize_rejects_unknown_keys() {
        assert!(serde_yaml::from_str::<TranslatorOptions>("alias: x").is_err());
    }
}
