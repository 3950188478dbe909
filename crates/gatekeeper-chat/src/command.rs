//! Chat command parsing.
//!
//! A command line looks like `$name args` or `!name args`:
//!
//! ```text
//! line    = " "* prefix " "* name ( " "+ args )?
//! prefix  = "$" | "!"
//! name    = [A-Za-z0-9_-]+
//! args    = any characters except a line feed, up to end of line
//! ```
//!
//! The whole line must match; there is no partial parse. All spaces between
//! the name and the arguments are consumed, while spaces inside and at the
//! end of the arguments are kept verbatim.

use std::fmt;

use serde::Serialize;

/// Characters that introduce a command.
pub const COMMAND_PREFIXES: [char; 2] = ['$', '!'];

/// The only separator the grammar accepts between tokens.
const SEPARATOR: char = ' ';

/// A chat line that matched the command grammar.
///
/// Only [`parse_command`] constructs this type, so holding a `Command`
/// means the source line was a well-formed command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Command {
    prefix: char,
    name: String,
    args: String,
}

impl Command {
    /// The trigger character, one of [`COMMAND_PREFIXES`].
    pub const fn prefix(&self) -> char {
        self.prefix
    }

    /// The command name, e.g. `gen` for `!gen foo`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Everything after the name and its separating spaces. May be empty.
    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.name)?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args)?;
        }
        Ok(())
    }
}

/// Parse a chat line into a [`Command`].
///
/// Returns `None` when the line is not a command. That is the normal outcome
/// for ordinary chat, not an error.
pub fn parse_command(source: &str) -> Option<Command> {
    let rest = source.trim_start_matches(SEPARATOR);

    let mut chars = rest.chars();
    let prefix = chars.next().filter(|c| COMMAND_PREFIXES.contains(c))?;
    let rest = chars.as_str().trim_start_matches(SEPARATOR);

    let name_len = rest.bytes().take_while(|b| is_name_byte(*b)).count();
    if name_len == 0 {
        return None;
    }
    let (name, rest) = rest.split_at(name_len);

    let args = if rest.is_empty() {
        ""
    } else {
        let args = rest.strip_prefix(SEPARATOR)?.trim_start_matches(SEPARATOR);
        if args.contains('\n') {
            return None;
        }
        args
    };

    Some(Command {
        prefix,
        name: name.to_owned(),
        args: args.to_owned(),
    })
}

/// Whether `byte` may appear in a command name.
const fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> (char, String, String) {
        let cmd = parse_command(line).unwrap();
        (cmd.prefix(), cmd.name().to_owned(), cmd.args().to_owned())
    }

    #[test]
    fn bare_command() {
        assert_eq!(parsed("$hello"), ('$', "hello".to_owned(), String::new()));
    }

    #[test]
    fn command_with_args() {
        assert_eq!(
            parsed("!gen foo bar"),
            ('!', "gen".to_owned(), "foo bar".to_owned())
        );
    }

    #[test]
    fn args_keep_interior_and_trailing_spaces() {
        assert_eq!(
            parsed("  $cmd  arg with   spaces  "),
            ('$', "cmd".to_owned(), "arg with   spaces  ".to_owned())
        );
    }

    #[test]
    fn spaces_after_prefix_are_skipped() {
        assert_eq!(parsed("!   ping"), ('!', "ping".to_owned(), String::new()));
    }

    #[test]
    fn trailing_spaces_only_give_empty_args() {
        assert_eq!(parsed("$cmd   "), ('$', "cmd".to_owned(), String::new()));
    }

    #[test]
    fn numeric_and_punctuated_names() {
        assert_eq!(parsed("$42").1, "42");
        assert_eq!(parsed("$snake_case-name x").1, "snake_case-name");
    }

    #[test]
    fn name_is_case_sensitive_and_args_keep_case() {
        assert_eq!(
            parsed("$Gen HeLLo WoRLD"),
            ('$', "Gen".to_owned(), "HeLLo WoRLD".to_owned())
        );
    }

    #[test]
    fn args_may_contain_anything_but_a_line_feed() {
        assert_eq!(parsed("!say $hi! <@1>\t\r").2, "$hi! <@1>\t\r");
        assert!(parse_command("!say one\ntwo").is_none());
    }

    #[test]
    fn non_commands_are_rejected() {
        for line in [
            "",
            "   ",
            "$",
            "!  ",
            "hello",
            "$he!lo",
            "$hello!",
            "$cmd\targ",
            "\t$cmd",
            "$cmd\n",
            "#cmd",
            "$ $cmd",
            "$cmd\u{a0}arg",
            "$naïve",
            "x $cmd",
        ] {
            assert!(parse_command(line).is_none(), "{line:?} should not parse");
        }
    }

    #[test]
    fn display_renders_canonical_form() {
        let cmd = parse_command("  !  gen   a  b ").unwrap();
        assert_eq!(cmd.to_string(), "!gen a  b ");
        let bare = parse_command("$ping").unwrap();
        assert_eq!(bare.to_string(), "$ping");
    }

    #[test]
    fn serializes_as_triple() {
        let cmd = parse_command("!gen foo").unwrap();
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "prefix": "!", "name": "gen", "args": "foo" })
        );
    }
}
