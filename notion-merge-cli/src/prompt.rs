//! Interactive input, read once at the start of a command.

use std::io::{self, BufRead, Write};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Ask for a value on stdin. Empty input yields `default`; when there is no
/// default and the field is required, the question is repeated.
pub(crate) fn read_line(
    prompt: &str,
    default: Option<&str>,
    required: bool,
) -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    read_line_from(&mut stdin.lock(), prompt, default, required)
}

/// Like [`read_line`] but never returns `None`.
pub(crate) fn read_required(prompt: &str) -> Result<String, CliError> {
    read_line(prompt, None, true)?
        .ok_or_else(|| CliError::input(format!("{} is required", prompt)))
}

fn read_line_from(
    input: &mut impl BufRead,
    prompt: &str,
    default: Option<&str>,
    required: bool,
) -> Result<Option<String>, CliError> {
    loop {
        match default {
            Some(def) => print!("  {} [{}]: ", prompt, def),
            None => print!("  {}: ", prompt),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF: nothing more will arrive.
            return match default {
                Some(def) => Ok(Some(def.to_string())),
                None if required => Err(CliError::input(format!("{} is required", prompt))),
                None => Ok(None),
            };
        }

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
        if let Some(def) = default {
            return Ok(Some(def.to_string()));
        }
        if !required {
            return Ok(None);
        }
        println!(
            "    {}",
            "This field is required.".if_supports_color(Stdout, |t| t.yellow()),
        );
    }
}

/// Split a comma-separated list of IDs, trimming blanks and dropping empty
/// entries.
pub(crate) fn split_ids(list: &str) -> Vec<String> {
    clean_ids(list.split(','))
}

pub(crate) fn clean_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_drop_blanks() {
        assert_eq!(split_ids(" a, b ,,c ,"), vec!["a", "b", "c"]);
        assert!(split_ids(" , ").is_empty());
    }

    #[test]
    fn empty_answer_falls_back_to_default() {
        let mut input = io::Cursor::new("\n");
        let value = read_line_from(&mut input, "Version", Some("2022-06-28"), false).unwrap();
        assert_eq!(value.as_deref(), Some("2022-06-28"));
    }

    #[test]
    fn required_question_repeats_until_answered() {
        let mut input = io::Cursor::new("\n  \n parent-id \n");
        let value = read_line_from(&mut input, "Parent page ID", None, true).unwrap();
        assert_eq!(value.as_deref(), Some("parent-id"));
    }

    #[test]
    fn end_of_input_on_required_question_is_an_error() {
        let mut input = io::Cursor::new("");
        let err = read_line_from(&mut input, "Title", None, true).unwrap_err();
        assert!(matches!(err, CliError::Input(_)));
    }
}
