use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output;

/// Entry point for the ledger shell. Script mode (`BALANCE_CORE_CLI_SCRIPT`
/// set) reads commands from stdin; otherwise an interactive prompt is shown.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os("BALANCE_CORE_CLI_SCRIPT").is_some() {
        colored::control::set_override(false);
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let outcome = match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    };
    let failures = context.failures;
    context.close()?;
    outcome?;

    if mode == CliMode::Script && failures > 0 {
        return Err(CliError::ScriptFailed(failures));
    }
    Ok(())
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("Type `help` for a list of commands.");

    while context.running {
        if let (Some(helper), Ok(names)) =
            (editor.helper_mut(), context.store().get_category_names())
        {
            helper.categories = names;
        }
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if handle_line(context, trimmed) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if handle_line(context, trimmed) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Completes command names in the first position and category names after it.
struct CommandHelper {
    commands: Vec<String>,
    categories: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(String::from).collect();
        commands.sort();
        Self {
            commands,
            categories: Vec::new(),
        }
    }

    fn candidates(&self, first_word: bool, needle: &str) -> Vec<Pair> {
        let pool = if first_word {
            &self.commands
        } else {
            &self.categories
        };
        let needle = needle.to_lowercase();
        pool.iter()
            .filter(|name| name.to_lowercase().starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: if name.contains(char::is_whitespace) {
                    format!("\"{name}\"")
                } else {
                    name.clone()
                },
            })
            .collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);
        let first_word = prefix[..start].trim().is_empty();
        Ok((start, self.candidates(first_word, &prefix[start..])))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {}

/// Runs one command line, reporting any failure through the context.
pub(crate) fn handle_line(context: &mut ShellContext, line: &str) -> LoopControl {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse `{line}`: {err}"));
            return LoopControl::Continue;
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return LoopControl::Continue;
    };

    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    tracing::debug!(command = %command, args = args.len(), "Dispatching command");

    match context.dispatch(&command, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            LoopControl::Exit
        }
        Ok(LoopControl::Continue) => LoopControl::Continue,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, storage::SqliteStorage};

    fn context() -> ShellContext {
        let store = SqliteStorage::open_in_memory().unwrap();
        ShellContext::with_store(CliMode::Script, Config::default(), store).unwrap()
    }

    #[test]
    fn quoted_names_survive_splitting() {
        let mut ctx = context();
        handle_line(
            &mut ctx,
            r#"add-account "GH Bank (partnered savings)" 19377 Assets --remarks "50% of 38,754""#,
        );
        assert_eq!(ctx.failures, 0);
        let record = ctx
            .store()
            .get_account_by_name("GH Bank (partnered savings)")
            .unwrap()
            .unwrap();
        assert_eq!(record.remarks.as_deref(), Some("50% of 38,754"));
    }

    #[test]
    fn completion_switches_from_commands_to_categories() {
        let mut helper = CommandHelper::new(vec!["tree", "balance-sheet", "accounts-in"]);
        helper.categories = vec!["Assets".into(), "Current Assets".into()];

        let commands: Vec<String> = helper
            .candidates(true, "ba")
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(commands, vec!["balance-sheet"]);

        let categories: Vec<String> = helper
            .candidates(false, "cu")
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(categories, vec!["\"Current Assets\""]);
    }

    #[test]
    fn completion_handles_multibyte_whitespace() {
        let mut helper = CommandHelper::new(vec!["tree"]);
        helper.categories = vec!["Assets".into(), "Liabilities".into()];
        let history = DefaultHistory::new();
        let ctx = ReadlineContext::new(&history);

        for line in ["tree\u{a0}As", "tree\u{3000}As"] {
            let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
            assert_eq!(&line[start..], "As");
            let names: Vec<&str> = pairs.iter().map(|pair| pair.display.as_str()).collect();
            assert_eq!(names, vec!["Assets"]);
        }
    }

    #[test]
    fn failures_are_counted_not_fatal() {
        let mut ctx = context();
        assert_eq!(
            handle_line(&mut ctx, "add-account Cash 10 Equity"),
            LoopControl::Continue
        );
        assert_eq!(ctx.failures, 1);
        assert_eq!(handle_line(&mut ctx, "exit"), LoopControl::Exit);
        assert!(!ctx.running);
    }
}
