//! Argument sanitization applied before a process is spawned.
//!
//! Values for environment, annotation and label flags are sometimes written
//! with shell-style quoting (`--env="A=b c"`). No shell sits between us and
//! the process, so the quotes would reach the tool verbatim; they are removed
//! here instead.

use std::borrow::Cow;

/// Flags whose values have double quotes stripped.
pub const QUOTE_STRIPPED_FLAGS: &[&str] = &["--env", "--annotation", "--label"];

/// Sanitize a single argument.
///
/// The flag name is the text before the first `=`. Only an exact match
/// against [`QUOTE_STRIPPED_FLAGS`] triggers stripping, so `--envs=...` or a
/// positional value that merely mentions `--env` is left alone.
#[must_use]
pub fn sanitize_argument(arg: &str) -> Cow<'_, str> {
    let flag = arg.split_once('=').map_or(arg, |(flag, _)| flag);
    if QUOTE_STRIPPED_FLAGS.contains(&flag) && arg.contains('"') {
        Cow::Owned(arg.replace('"', ""))
    } else {
        Cow::Borrowed(arg)
    }
}

/// Sanitize every argument in order.
#[must_use]
pub fn sanitize_arguments<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| sanitize_argument(arg.as_ref()).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("--env=\"A=1\"", "--env=A=1" ; "env value")]
    #[test_case("--annotation=\"team=ml\"", "--annotation=team=ml" ; "annotation value")]
    #[test_case("--label=\"app=\"demo\"\"", "--label=app=demo" ; "nested quotes")]
    #[test_case("--name=\"quoted\"", "--name=\"quoted\"" ; "other flag untouched")]
    #[test_case("--envs=\"x\"", "--envs=\"x\"" ; "prefix of flag untouched")]
    #[test_case("python -c \"print('--env')\"", "python -c \"print('--env')\"" ; "command text untouched")]
    #[test_case("--env", "--env" ; "bare flag")]
    fn test_sanitize_argument(input: &str, expected: &str) {
        assert_eq!(sanitize_argument(input), expected);
    }

    #[test]
    fn test_sanitize_borrows_when_unchanged() {
        assert!(matches!(sanitize_argument("--gpus=1"), Cow::Borrowed(_)));
        assert!(matches!(sanitize_argument("--env=A=1"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_arguments_preserves_order() {
        let args = sanitize_arguments(["submit", "--env=\"A=1\"", "--gpus=2"]);
        assert_eq!(args, vec!["submit", "--env=A=1", "--gpus=2"]);
    }
}
