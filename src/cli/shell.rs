use std::{
    borrow::Cow,
    cell::RefCell,
    env,
    io::{self, BufRead},
    rc::Rc,
};

use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Context as ReadlineContext, Editor, Helper,
};
use shell_words::split;
use strsim::levenshtein;
use tracing::warn;

use crate::{
    config::{Config, ConfigManager},
    currency::MoneyAmount,
    errors::CliError,
    payment::{CashPaymentDialog, PaymentOutcome},
    utils::build_info,
};

use super::output::{self, OutputPreferences};
use super::render::print_state;

/// Set to run the CLI against stdin instead of an interactive editor.
pub const SCRIPT_ENV: &str = "BOX_OFFICE_CLI_SCRIPT";

const PROMPT: &str = "tendered> ";
const COMMANDS: [(&str, &str); 5] = [
    (":ok", "confirm the payment (only when enough cash was tendered)"),
    (":cancel", "abort the payment"),
    (":clear", "empty the tendered field"),
    (":price", "change the price due, e.g. `:price 12,50`"),
    (":help", "show this help"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Confirm,
    Cancel,
    Clear,
    Price(MoneyAmount),
    Help,
    Input(String),
}

pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("{}", build_info::current().summary());
        return Ok(());
    }

    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let config = ConfigManager::new()?.load()?;
    output::set_preferences(OutputPreferences::from(&config));
    if mode == CliMode::Script {
        colored::control::set_override(false);
    }

    let theme = ColorfulTheme::default();
    let price = resolve_price(args.first().map(String::as_str), &config, mode, &theme)?;
    let mut session = PaymentSession::new(mode, &config, theme);
    session.dialog.open(price);

    let result = match mode {
        CliMode::Interactive => run_interactive(&mut session),
        CliMode::Script => run_script(&mut session),
    };

    if session.dialog.is_open() {
        session.dialog.cancel();
    }
    session.report_outcome();
    result
}

fn resolve_price(
    arg: Option<&str>,
    config: &Config,
    mode: CliMode,
    theme: &ColorfulTheme,
) -> Result<MoneyAmount, CliError> {
    if let Some(raw) = arg {
        return Ok(MoneyAmount::from_text(raw)?);
    }
    if let Some(price) = config.default_price {
        return Ok(price);
    }
    match mode {
        CliMode::Interactive => {
            let raw: String = Input::with_theme(theme)
                .with_prompt("Price due (e.g. 11,90)")
                .validate_with(|input: &String| -> Result<(), &'static str> {
                    if MoneyAmount::is_valid_text(input) {
                        Ok(())
                    } else {
                        Err("Use digits, a comma and two digits")
                    }
                })
                .interact_text()?;
            Ok(MoneyAmount::from_text(&raw)?)
        }
        CliMode::Script => Err(CliError::Input(
            "no price given; pass it as the first argument or set `default_price`".into(),
        )),
    }
}

struct PaymentSession {
    dialog: CashPaymentDialog,
    outcome: Rc<RefCell<Option<PaymentOutcome>>>,
    symbol: String,
    theme: ColorfulTheme,
}

impl PaymentSession {
    fn new(mode: CliMode, config: &Config, theme: ColorfulTheme) -> Self {
        let outcome = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&outcome);
        let mut dialog = CashPaymentDialog::new(move |result| {
            sink.borrow_mut().replace(result);
        });

        let symbol = config.currency_symbol.clone();
        let view_symbol = symbol.clone();
        dialog.subscribe(move |state| {
            if mode == CliMode::Interactive {
                clear_screen();
            }
            print_state(state, &view_symbol);
        });

        Self {
            dialog,
            outcome,
            symbol,
            theme,
        }
    }

    fn handle_line(&mut self, line: &str) -> LoopControl {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(message) => {
                output::warning(message);
                return LoopControl::Continue;
            }
        };

        match command {
            SessionCommand::Confirm => {
                if self.dialog.confirm() {
                    return LoopControl::Exit;
                }
                output::warning("Confirmation is disabled until enough cash is tendered.");
            }
            SessionCommand::Cancel => {
                self.dialog.cancel();
                return LoopControl::Exit;
            }
            SessionCommand::Clear => self.dialog.reset(),
            SessionCommand::Price(price) => self.dialog.update_price(price),
            SessionCommand::Help => print_help(),
            SessionCommand::Input(text) => self.dialog.input_changed(&text),
        }
        LoopControl::Continue
    }

    fn confirm_abort(&self) -> Result<bool, CliError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Cancel the payment?")
            .default(false)
            .interact()?)
    }

    fn report_outcome(&self) {
        match *self.outcome.borrow() {
            Some(PaymentOutcome::Confirmed {
                tendered, change, ..
            }) => output::success(format!(
                "Payment confirmed. Tendered {}, change {}.",
                tendered.format_with_symbol(&self.symbol),
                change.format_with_symbol(&self.symbol)
            )),
            Some(PaymentOutcome::Cancelled) | None => output::warning("Payment cancelled."),
        }
    }
}

fn run_interactive(session: &mut PaymentSession) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new()));

    while session.dialog.is_open() {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str()).ok();
                }
                if session.handle_line(&line) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if session.confirm_abort()? {
                    session.dialog.cancel();
                    break;
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(session: &mut PaymentSession) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut buf = Vec::new();
    while let Some(line) = next_script_line(&mut reader, &mut buf)? {
        if session.handle_line(&line) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Reads one line without its terminator. Bytes that are not UTF-8 become
/// replacement characters, so the dialog sees them as invalid input.
fn next_script_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn parse_line(line: &str) -> Result<SessionCommand, String> {
    if !line.starts_with(':') {
        return Ok(SessionCommand::Input(line.to_string()));
    }

    let tokens = split(line).map_err(|err| err.to_string())?;
    let Some(name) = tokens.first().map(|token| token.to_ascii_lowercase()) else {
        return Ok(SessionCommand::Help);
    };
    let args = &tokens[1..];

    match name.as_str() {
        ":ok" | ":confirm" => Ok(SessionCommand::Confirm),
        ":cancel" | ":quit" => Ok(SessionCommand::Cancel),
        ":clear" => Ok(SessionCommand::Clear),
        ":help" | ":?" => Ok(SessionCommand::Help),
        ":price" => match args {
            [raw] => MoneyAmount::from_text(raw)
                .map(SessionCommand::Price)
                .map_err(|err| err.to_string()),
            _ => Err("usage: :price <amount>, e.g. :price 12,50".to_string()),
        },
        other => {
            warn!(command = other, "unknown command");
            Err(match suggest_command(other) {
                Some(candidate) => {
                    format!("Unknown command `{other}`. Did you mean `{candidate}`?")
                }
                None => format!("Unknown command `{other}`. Type :help for a list."),
            })
        }
    }
}

fn suggest_command(input: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|(name, _)| (*name, levenshtein(input, name)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

fn print_help() {
    output::section("Commands");
    output::info("Type an amount such as 20,00 to tender it.");
    for (name, description) in COMMANDS {
        output::info(format!("{name:<8} {description}"));
    }
}

fn clear_screen() {
    let mut stdout = io::stdout();
    let _ = stdout.execute(terminal::Clear(ClearType::All));
    let _ = stdout.execute(cursor::MoveTo(0, 0));
}

struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| *name).collect(),
        }
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
        if !prefix.starts_with(':') || prefix.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let needle = prefix.to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
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

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_tendered_input() {
        assert_eq!(
            parse_line("20,00"),
            Ok(SessionCommand::Input("20,00".into()))
        );
        assert_eq!(parse_line(""), Ok(SessionCommand::Input(String::new())));
        assert_eq!(
            parse_line(" 5,00"),
            Ok(SessionCommand::Input(" 5,00".into()))
        );
    }

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(parse_line(":OK"), Ok(SessionCommand::Confirm));
        assert_eq!(parse_line(":cancel"), Ok(SessionCommand::Cancel));
        assert_eq!(parse_line(":clear"), Ok(SessionCommand::Clear));
        assert_eq!(
            parse_line(":price 12,50"),
            Ok(SessionCommand::Price(MoneyAmount::from_minor_units(1250).unwrap()))
        );
    }

    #[test]
    fn price_command_requires_canonical_amount() {
        assert!(parse_line(":price").is_err());
        assert!(parse_line(":price 12.50").is_err());
    }

    #[test]
    fn script_lines_survive_invalid_utf8() {
        let mut reader = io::Cursor::new(b"\xff\xfe,00\n20,00\r\n:ok".to_vec());
        let mut buf = Vec::new();

        let first = next_script_line(&mut reader, &mut buf).unwrap().unwrap();
        assert_eq!(first, "\u{FFFD}\u{FFFD},00");
        assert!(!MoneyAmount::is_valid_text(&first));
        assert_eq!(
            next_script_line(&mut reader, &mut buf).unwrap().as_deref(),
            Some("20,00")
        );
        assert_eq!(
            next_script_line(&mut reader, &mut buf).unwrap().as_deref(),
            Some(":ok")
        );
        assert_eq!(next_script_line(&mut reader, &mut buf).unwrap(), None);
    }

    #[test]
    fn unknown_commands_get_suggestions() {
        let err = parse_line(":cancle").unwrap_err();
        assert!(err.contains("Did you mean `:cancel`?"), "{err}");
        let err = parse_line(":frobnicate").unwrap_err();
        assert!(err.contains(":help"), "{err}");
    }
}
