//! Command dispatch and shell context for the ledger CLI.

use std::io;

use chrono::Local;
use rustyline::error::ReadlineError;

use crate::{
    config::{Config, ConfigManager},
    errors::{LedgerError, RecordKind},
    ledger::{Account, AccountRecord, Category},
    report::BalanceSheet,
    storage::SqliteStorage,
};

use super::output;
use super::selection::{resolve_category, suggest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Failure of a single command. The shell reports it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Failure of the shell itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("{0} script command(s) failed")]
    ScriptFailed(usize),
}

pub type CommandResult = Result<LoopControl, CommandError>;

/// Command names with a one-line usage summary, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    (
        "add-category",
        "add-category <name> [--parent <name>] [--description <text>]",
    ),
    (
        "add-account",
        "add-account <name> <value> <category> [--remarks <text>] [--disabled]",
    ),
    ("disable", "disable <account>..."),
    ("enable", "enable <account>..."),
    ("remove-account", "remove-account <account>"),
    ("remove-category", "remove-category <category>"),
    ("categories", "categories"),
    ("subcategories", "subcategories <category>"),
    ("leaves", "leaves <category>"),
    ("accounts", "accounts [--disabled]"),
    ("accounts-in", "accounts-in <category>"),
    ("account", "account <name>"),
    ("tree", "tree <category> [--json]"),
    ("balance-sheet", "balance-sheet [--json]"),
    ("help", "help"),
    ("exit", "exit"),
];

pub struct ShellContext {
    pub mode: CliMode,
    pub running: bool,
    pub failures: usize,
    config: Config,
    store: SqliteStorage,
}

impl ShellContext {
    /// Loads the configuration and opens the configured database.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let store = SqliteStorage::open_in_dir(manager.database_dir(), &config.database)?;
        Self::with_store(mode, config, store)
    }

    pub fn with_store(mode: CliMode, config: Config, store: SqliteStorage) -> Result<Self, CliError> {
        let context = Self {
            mode,
            running: true,
            failures: 0,
            config,
            store,
        };
        context.seed_default_roots()?;
        Ok(context)
    }

    fn seed_default_roots(&self) -> Result<(), LedgerError> {
        if !self.config.seed_default_roots || !self.store.get_category_names()?.is_empty() {
            return Ok(());
        }
        for root in [&self.config.assets_category, &self.config.liabilities_category] {
            self.store.upsert_category(&Category::new(root.as_str()))?;
        }
        tracing::info!("Seeded default root categories");
        Ok(())
    }

    pub fn store(&self) -> &SqliteStorage {
        &self.store
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|(name, _)| *name).collect()
    }

    pub fn prompt(&self) -> String {
        "ledger> ".to_string()
    }

    /// Releases the database connection.
    pub fn close(self) -> Result<(), CliError> {
        self.store.close()?;
        Ok(())
    }

    pub fn report_error(&mut self, err: CommandError) {
        self.failures += 1;
        output::error(&err);
        if let CommandError::Ledger(LedgerError::NotFound {
            kind: RecordKind::Category,
            name,
        }) = &err
        {
            if let Ok(known) = self.store.get_category_names() {
                if let Some(best) = suggest(&known, name) {
                    output::info(format!("Did you mean `{best}`?"));
                }
            }
        }
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> CommandResult {
        match command {
            "add-category" => self.add_category(args),
            "add-account" => self.add_account(args),
            "disable" => self.toggle(args, true),
            "enable" => self.toggle(args, false),
            "remove-account" => {
                let name = single(args, "remove-account <account>")?;
                self.store.remove_account(name)?;
                output::success(format!("Removed account {name}."));
                Ok(LoopControl::Continue)
            }
            "remove-category" => {
                let name = self.category_arg(args, "remove-category <category>")?;
                self.store.remove_category(&name)?;
                output::success(format!("Removed category {name}."));
                Ok(LoopControl::Continue)
            }
            "categories" => {
                if !args.is_empty() {
                    return Err(usage("categories"));
                }
                output::section("Categories");
                output::list(&self.store.get_category_names()?);
                Ok(LoopControl::Continue)
            }
            "subcategories" => {
                let name = self.category_arg(args, "subcategories <category>")?;
                output::section(format!("Subcategories of {name}"));
                output::list(&self.store.get_subcategories(&name)?);
                Ok(LoopControl::Continue)
            }
            "leaves" => {
                let name = self.category_arg(args, "leaves <category>")?;
                output::section(format!("Leaf categories under {name}"));
                output::list(&self.store.get_leaf_categories(&name)?);
                Ok(LoopControl::Continue)
            }
            "accounts" => {
                let (rest, flags) = split_flags(args, &[], &["--disabled"])?;
                if !rest.is_empty() {
                    return Err(usage("accounts [--disabled]"));
                }
                let enabled = !flags.contains(&"--disabled");
                output::section(if enabled {
                    "Enabled accounts"
                } else {
                    "Disabled accounts"
                });
                output::list(&self.store.get_accounts(enabled)?);
                Ok(LoopControl::Continue)
            }
            "accounts-in" => {
                let name = self.category_arg(args, "accounts-in <category>")?;
                output::section(format!("Accounts in {name}"));
                output::list(&self.store.get_all_account_names_in_category(&name)?);
                Ok(LoopControl::Continue)
            }
            "account" => {
                let name = single(args, "account <name>")?;
                let record = self
                    .store
                    .get_account_by_name(name)?
                    .ok_or_else(|| LedgerError::account_not_found(name))?;
                output::plain(serde_json::to_string_pretty(&record)?);
                Ok(LoopControl::Continue)
            }
            "tree" => self.tree(args),
            "balance-sheet" => self.balance_sheet(args),
            "help" => {
                output::section("Commands");
                for (_, line) in COMMANDS {
                    output::plain(format!("  {line}"));
                }
                Ok(LoopControl::Continue)
            }
            "exit" | "quit" => Ok(LoopControl::Exit),
            other => {
                let known: Vec<String> = self
                    .command_names()
                    .into_iter()
                    .map(String::from)
                    .collect();
                let hint = suggest(&known, other)
                    .map(|best| format!(" Did you mean `{best}`?"))
                    .unwrap_or_default();
                Err(CommandError::InvalidArguments(format!(
                    "Unknown command `{other}`.{hint}"
                )))
            }
        }
    }

    fn category_arg(&self, args: &[&str], usage: &str) -> Result<String, CommandError> {
        let raw = single(args, usage)?;
        self.resolve(raw)
    }

    fn resolve(&self, raw: &str) -> Result<String, CommandError> {
        let known = self.store.get_category_names()?;
        Ok(resolve_category(&known, raw)?)
    }

    fn add_category(&mut self, args: &[&str]) -> CommandResult {
        let (positional, options) = split_options(args, &["--parent", "--description"])?;
        let [name] = positional.as_slice() else {
            return Err(usage("add-category <name> [--parent <name>] [--description <text>]"));
        };
        let mut category = Category::new(*name);
        if let Some(parent) = option(&options, "--parent") {
            category.parent = Some(self.resolve(parent)?);
        }
        if let Some(description) = option(&options, "--description") {
            category.description = description.to_string();
        }
        let record = self.store.upsert_category(&category)?;
        output::success(format!("Saved category {} (id {}).", record.name, record.id));
        Ok(LoopControl::Continue)
    }

    fn add_account(&mut self, args: &[&str]) -> CommandResult {
        let (rest, flags) = split_flags(args, &["--remarks"], &["--disabled"])?;
        let (positional, options) = split_options(&rest, &["--remarks"])?;
        let [name, value, category] = positional.as_slice() else {
            return Err(usage(
                "add-account <name> <value> <category> [--remarks <text>] [--disabled]",
            ));
        };
        let value: f64 = value.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{value}` is not a valid amount"))
        })?;
        let mut account = Account::new(*name, value, self.resolve(category)?);
        if let Some(remarks) = option(&options, "--remarks") {
            account.remarks = Some(remarks.to_string());
        }
        account.is_disabled = flags.contains(&"--disabled");
        let record = self.store.upsert_account(&account)?;
        output::success(format!(
            "Saved {}: {} under {}.",
            record.name,
            crate::currency::format_amount(&self.config.locale, record.value),
            account.category
        ));
        Ok(LoopControl::Continue)
    }

    fn toggle(&mut self, args: &[&str], disable: bool) -> CommandResult {
        if args.is_empty() {
            return Err(usage(if disable {
                "disable <account>..."
            } else {
                "enable <account>..."
            }));
        }
        let records: Vec<AccountRecord> = if disable {
            self.store.disable_accounts(args)?
        } else {
            self.store.enable_accounts(args)?
        };
        let verb = if disable { "Disabled" } else { "Enabled" };
        for record in records {
            output::success(format!("{verb} {}.", record.name));
        }
        Ok(LoopControl::Continue)
    }

    fn tree(&mut self, args: &[&str]) -> CommandResult {
        let (rest, flags) = split_flags(args, &[], &["--json"])?;
        let name = self.category_arg(&rest, "tree <category> [--json]")?;
        let tree = self.store.get_category_tree(&name)?;
        if flags.contains(&"--json") {
            output::plain(serde_json::to_string_pretty(&tree)?);
        } else {
            let mut text = String::new();
            crate::report::balance_sheet::render_composite(&mut text, &tree, &self.config.locale);
            print!("{text}");
        }
        Ok(LoopControl::Continue)
    }

    fn balance_sheet(&mut self, args: &[&str]) -> CommandResult {
        let (rest, flags) = split_flags(args, &[], &["--json"])?;
        if !rest.is_empty() {
            return Err(usage("balance-sheet [--json]"));
        }
        let sheet = BalanceSheet::from_source(
            &self.store,
            &self.config.assets_category,
            &self.config.liabilities_category,
            Local::now().date_naive(),
        )?;
        if flags.contains(&"--json") {
            output::plain(serde_json::to_string_pretty(&sheet)?);
        } else {
            print!("{}", sheet.render(&self.config.locale));
        }
        Ok(LoopControl::Continue)
    }
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Usage: {text}"))
}

fn single<'a>(args: &[&'a str], text: &str) -> Result<&'a str, CommandError> {
    match args {
        [only] => Ok(*only),
        _ => Err(usage(text)),
    }
}

/// Separates boolean `flags` from the remaining arguments. Values that follow
/// an option in `valued` are never mistaken for flags.
fn split_flags<'a>(
    args: &[&'a str],
    valued: &[&str],
    flags: &[&'static str],
) -> Result<(Vec<&'a str>, Vec<&'a str>), CommandError> {
    let mut rest = Vec::new();
    let mut found = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if valued.contains(arg) {
            rest.push(*arg);
            if let Some(value) = iter.next() {
                rest.push(*value);
            }
        } else if flags.contains(arg) {
            found.push(*arg);
        } else if arg.starts_with("--") && !is_number(arg) {
            return Err(CommandError::InvalidArguments(format!(
                "Unknown flag `{arg}`"
            )));
        } else {
            rest.push(*arg);
        }
    }
    Ok((rest, found))
}

/// Separates `--option value` pairs from positional arguments.
fn split_options<'a>(
    args: &[&'a str],
    names: &[&str],
) -> Result<(Vec<&'a str>, Vec<(&'a str, &'a str)>), CommandError> {
    let mut positional = Vec::new();
    let mut options = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if names.contains(arg) {
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!("`{arg}` expects a value"))
            })?;
            options.push((*arg, *value));
        } else if arg.starts_with("--") && !is_number(arg) {
            return Err(CommandError::InvalidArguments(format!(
                "Unknown option `{arg}`"
            )));
        } else {
            positional.push(*arg);
        }
    }
    Ok((positional, options))
}

fn option<'a>(options: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
    options
        .iter()
        .rev()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

fn is_number(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}
