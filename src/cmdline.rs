//! Command line assembly for driving the choco CLI.
//!
//! Chocolatey is handed a single pre-built argument string, so every argument
//! has to be escaped for the Windows command line grammar before joining.
//! The quoting rules follow the MSVC argument parsing convention:
//! <https://learn.microsoft.com/en-us/cpp/cpp/main-function-command-line-args>

/// Escape each argument and join them with single spaces.
pub fn from_args<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|a| escape_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape a single argument for the Windows command line.
///
/// Backslash-quote pairs are doubled before bare quotes are escaped; the
/// passes must run in that order or the backslashes added by the first pass
/// would be escaped again by the second.
pub fn escape_arg(arg: &str) -> String {
    let escaped = arg.replace("\\\"", "\\\\\"").replace('"', "\\\"");
    if escaped.is_empty() || escaped.contains(' ') || escaped.contains('\t') {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_arg_untouched() {
        assert_eq!(escape_arg("upgrade"), "upgrade");
        assert_eq!(escape_arg("--fail-on-unfound"), "--fail-on-unfound");
    }

    #[test]
    fn test_empty_arg_quoted() {
        assert_eq!(escape_arg(""), "\"\"");
    }

    #[test]
    fn test_whitespace_args_quoted() {
        assert_eq!(escape_arg("hello world"), "\"hello world\"");
        assert_eq!(escape_arg("tab\there"), "\"tab\there\"");
    }

    #[test]
    fn test_bare_quotes_escaped() {
        assert_eq!(escape_arg("say \"hi\""), r#""say \"hi\"""#);
    }

    #[test]
    fn test_backslash_quote_doubled_then_escaped() {
        // \" pairs become \\\" and the whole thing is quoted for the spaces
        assert_eq!(
            escape_arg(r#"he said \"hi\""#),
            r#""he said \\\"hi\\\"""#
        );
    }

    #[test]
    fn test_from_args_joins_with_spaces() {
        let line = from_args(["upgrade", "--yes", "my package"]);
        assert_eq!(line, "upgrade --yes \"my package\"");
    }
}
