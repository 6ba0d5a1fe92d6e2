//! Typed command-line options.
//!
//! A [`Field`] is one option as the `arena` tool expects it. Validation and
//! rendering are separate so a builder can check and render in one pass and
//! still report exactly which option was wrong.

use crate::error::{Result, ValidationError, ValidationErrorKind};

/// Separator between key and value in most map options (`--env=K=V`).
pub const EQUALS: char = '=';

/// Separator used by path-pair map options (`--data=pvc:/mnt`).
pub const COLON: char = ':';

/// One named command-line option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// `flag=value`.
    Scalar {
        /// The flag, including leading dashes.
        flag: String,
        /// The value.
        value: String,
    },
    /// One `flag=element` token per element.
    List {
        /// The flag, including leading dashes.
        flag: String,
        /// Elements in render order.
        values: Vec<String>,
    },
    /// One `flag=key<sep>value` token per entry.
    Map {
        /// The flag, including leading dashes.
        flag: String,
        /// Entries in render order.
        entries: Vec<(String, String)>,
        /// Joins key and value.
        separator: char,
    },
    /// A bare boolean switch.
    Flag {
        /// The flag, including leading dashes.
        name: String,
    },
}

impl Field {
    /// Create a scalar option.
    #[must_use]
    pub fn scalar(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Scalar {
            flag: flag.into(),
            value: value.into(),
        }
    }

    /// Create a list option.
    #[must_use]
    pub fn list<I, S>(flag: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List {
            flag: flag.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a map option. Entries render in the iterator's order.
    #[must_use]
    pub fn map<I, K, V>(flag: impl Into<String>, entries: I, separator: char) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map {
            flag: flag.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            separator,
        }
    }

    /// Create a boolean switch.
    #[must_use]
    pub fn flag(name: impl Into<String>) -> Self {
        Self::Flag { name: name.into() }
    }

    /// The flag this option renders.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { flag, .. } | Self::List { flag, .. } | Self::Map { flag, .. } => flag,
            Self::Flag { name } => name,
        }
    }

    /// Check that the option carries everything it needs to render.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the flag when the flag itself,
    /// a scalar value, a list or a map is empty.
    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        if name.is_empty() {
            return Err(ValidationError::new(name, ValidationErrorKind::EmptyFlag));
        }
        match self {
            Self::Scalar { value, .. } if value.is_empty() => Err(ValidationError::empty(name)),
            Self::List { values, .. } if values.is_empty() => {
                Err(ValidationError::empty_list(name))
            }
            Self::Map { entries, .. } if entries.is_empty() => {
                Err(ValidationError::new(name, ValidationErrorKind::EmptyMap))
            }
            _ => Ok(()),
        }
    }

    /// Append this option's tokens to `out`.
    pub fn render_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Scalar { flag, value } => out.push(format!("{flag}={value}")),
            Self::List { flag, values } => {
                out.extend(values.iter().map(|v| format!("{flag}={v}")));
            }
            Self::Map {
                flag,
                entries,
                separator,
            } => {
                out.extend(
                    entries
                        .iter()
                        .map(|(k, v)| format!("{flag}={k}{separator}{v}")),
                );
            }
            Self::Flag { name } => out.push(name.clone()),
        }
    }

    /// Render this option's tokens.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.render_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scalar_render() {
        let field = Field::scalar("--image", "tensorflow:1.5");
        assert!(field.validate().is_ok());
        assert_eq!(field.render(), vec!["--image=tensorflow:1.5"]);
    }

    #[test]
    fn test_scalar_empty_value() {
        let err = Field::scalar("--image", "").validate().unwrap_err();
        assert_eq!(err.flag, "--image");
        assert_eq!(err.kind, ValidationErrorKind::EmptyValue);
    }

    #[test]
    fn test_list_render() {
        let field = Field::list("--toleration", ["gpu", "master"]);
        assert_eq!(field.render(), vec!["--toleration=gpu", "--toleration=master"]);
    }

    #[test]
    fn test_list_empty() {
        let err = Field::list("--toleration", Vec::<String>::new())
            .validate()
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyList);
    }

    #[test]
    fn test_map_render_in_entry_order() {
        let field = Field::map("--env", [("a", "1"), ("b", "2")], EQUALS);
        assert!(field.validate().is_ok());
        assert_eq!(field.render(), vec!["--env=a=1", "--env=b=2"]);
    }

    #[test]
    fn test_map_colon_separator() {
        let field = Field::map("--data", [("training-data", "/mnt/data")], COLON);
        assert_eq!(field.render(), vec!["--data=training-data:/mnt/data"]);
    }

    #[test]
    fn test_map_empty() {
        let err = Field::map("--env", Vec::<(String, String)>::new(), EQUALS)
            .validate()
            .unwrap_err();
        assert_eq!(err.flag, "--env");
        assert_eq!(err.kind, ValidationErrorKind::EmptyMap);
    }

    #[test]
    fn test_flag_render() {
        let field = Field::flag("--tensorboard");
        assert!(field.validate().is_ok());
        assert_eq!(field.render(), vec!["--tensorboard"]);
    }

    #[test]
    fn test_empty_flag_name() {
        let err = Field::flag("").validate().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyFlag);
    }

    #[test]
    fn test_render_into_appends() {
        let mut out = vec!["submit".to_string()];
        Field::scalar("--name", "tf1").render_into(&mut out);
        Field::flag("--rdma").render_into(&mut out);
        assert_eq!(out, vec!["submit", "--name=tf1", "--rdma"]);
    }

    proptest! {
        #[test]
        fn scalar_validates_iff_nonempty(value in ".*") {
            let field = Field::scalar("--flag", value.clone());
            prop_assert_eq!(field.validate().is_ok(), !value.is_empty());
            if !value.is_empty() {
                prop_assert_eq!(field.render(), vec![format!("--flag={value}")]);
            }
        }

        #[test]
        fn list_validates_iff_nonempty(values in proptest::collection::vec("[a-z0-9]{1,8}", 0..6)) {
            let field = Field::list("--flag", values.clone());
            prop_assert_eq!(field.validate().is_ok(), !values.is_empty());
            prop_assert_eq!(field.render().len(), values.len());
        }

        #[test]
        fn map_validates_iff_nonempty(
            entries in proptest::collection::vec(("[a-z]{1,6}", "[a-z0-9]{1,6}"), 0..6)
        ) {
            let field = Field::map("--flag", entries.clone(), EQUALS);
            prop_assert_eq!(field.validate().is_ok(), !entries.is_empty());
            let rendered = field.render();
            for ((k, v), token) in entries.iter().zip(&rendered) {
                prop_assert_eq!(token, &format!("--flag={k}={v}"));
            }
        }
    }
}
