//! Positional-argument handling shared by the batch binaries.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;

/// Result of parsing a batch command line
#[derive(Debug)]
pub enum ArgsOutcome<T> {
    /// Arguments are complete
    Parsed(T),

    /// Wrong number of arguments: usage followed by the guidance text.
    /// Printed to stdout; not an error.
    Usage(String),

    /// `--help`, `--version` or a malformed flag; clap prints and exits
    Exit(clap::Error),
}

/// Parse `args`, turning a wrong argument count into usage + guidance.
pub fn parse_args<T, I, S>(args: I, guidance: &str) -> ArgsOutcome<T>
where
    T: Parser,
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(parsed) => ArgsOutcome::Parsed(parsed),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::UnknownArgument
                    | ErrorKind::TooManyValues
                    | ErrorKind::WrongNumberOfValues
            ) =>
        {
            let usage = T::command().render_usage();
            ArgsOutcome::Usage(format!("{}\n\n{}", usage, guidance))
        }
        Err(e) => ArgsOutcome::Exit(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    #[command(name = "pair")]
    struct Pair {
        first: String,
        second: String,
    }

    const GUIDANCE: &str = "Please provide two paths.";

    #[test]
    fn test_complete_arguments_parse() {
        match parse_args::<Pair, _, _>(["pair", "a", "b"], GUIDANCE) {
            ArgsOutcome::Parsed(p) => {
                assert_eq!(p.first, "a");
                assert_eq!(p.second, "b");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_count_gives_usage_and_guidance() {
        for args in [vec!["pair", "a"], vec!["pair", "a", "b", "c"], vec!["pair"]] {
            match parse_args::<Pair, _, _>(args, GUIDANCE) {
                ArgsOutcome::Usage(text) => {
                    assert!(text.contains("pair"));
                    assert!(text.ends_with(GUIDANCE));
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    #[test]
    fn test_help_is_left_to_clap() {
        assert!(matches!(
            parse_args::<Pair, _, _>(["pair", "--help"], GUIDANCE),
            ArgsOutcome::Exit(_)
        ));
    }
}
