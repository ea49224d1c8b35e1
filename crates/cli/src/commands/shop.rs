use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use bookworm_core::config::{AppConfig, LoadOptions, StorefrontConfig};
use bookworm_core::errors::ApplicationError;
use bookworm_core::storefront::catalog::Catalog;
use bookworm_core::Session;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::commands::{build_loader, current_thread_runtime, CommandResult};
use crate::screen::{format_amount, render, COMMAND_HINT};

/// One line of shopper input. Card numbers are 1-based as shown on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopInput {
    Increment(usize),
    Decrement(usize),
    AddToCart(usize),
    ToggleDiscount,
    Help,
    Quit,
    Redraw,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` needs a card number, e.g. `{0} 1`")]
    MissingCard(String),
    #[error("`{0}` is not a card number")]
    InvalidCard(String),
}

impl FromStr for ShopInput {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(Self::Redraw);
        };
        let verb = verb.to_ascii_lowercase();

        let card = |parts: &mut std::str::SplitWhitespace<'_>| -> Result<usize, InputError> {
            let raw = parts.next().ok_or_else(|| InputError::MissingCard(verb.clone()))?;
            match raw.parse::<usize>() {
                Ok(card) if card > 0 => Ok(card),
                _ => Err(InputError::InvalidCard(raw.to_string())),
            }
        };

        match verb.as_str() {
            "+" | "inc" => Ok(Self::Increment(card(&mut parts)?)),
            "-" | "dec" => Ok(Self::Decrement(card(&mut parts)?)),
            "add" => Ok(Self::AddToCart(card(&mut parts)?)),
            "d" | "discount" => Ok(Self::ToggleDiscount),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

pub fn run(options: &LoadOptions, feed_file: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("shop", error),
    };

    let mut session = Session::new(config.storefront.discount());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(error) = writeln!(out, "{}", render(&session, &config.storefront, None)) {
        return CommandResult::failure("shop", "io", error.to_string(), 1);
    }

    let catalog = load_catalog(&config, feed_file);
    if let Err(error) = session.settle(catalog) {
        return CommandResult::failure("shop", "session", error.to_string(), 1);
    }

    let stdin = io::stdin();
    match run_session(&mut session, &config.storefront, stdin.lock(), &mut out) {
        Ok(()) => session_summary(&session, &config.storefront),
        Err(error) => CommandResult::failure("shop", "io", error.to_string(), 1),
    }
}

/// Closing summary. Stdout holds the last screen, so it goes to stderr.
pub fn session_summary(session: &Session, storefront: &StorefrontConfig) -> CommandResult {
    let summary = session.summary();
    CommandResult::success(
        "shop",
        format!(
            "session ended with {} item(s) in cart, total {} {}",
            summary.item_count,
            format_amount(summary.total),
            storefront.currency
        ),
    )
    .on_stderr()
}

/// Single fetch; any failure degrades to an empty shelf.
fn load_catalog(config: &AppConfig, feed_file: Option<&Path>) -> Catalog {
    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(runtime_error) => {
            error!(
                event_name = "shop.runtime.failed",
                error = %runtime_error,
                "failed to initialize async runtime; showing empty catalog"
            );
            return Catalog::empty();
        }
    };

    runtime.block_on(async {
        match build_loader(config, feed_file).await {
            Ok(mut loader) => loader.load().await,
            Err(load_error) => {
                error!(
                    event_name = "shop.feed.unavailable",
                    error = %format!("{load_error:#}"),
                    "bestseller feed could not be set up; showing empty catalog"
                );
                Catalog::empty()
            }
        }
    })
}

/// Redraws the screen after every input line until `quit` or end of input.
pub fn run_session<R, W>(
    session: &mut Session,
    storefront: &StorefrontConfig,
    mut input: R,
    output: &mut W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", render(session, storefront, None))?;

    let mut raw = Vec::new();
    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        // Undecodable bytes become U+FFFD and fall through to the unknown-command hint.
        let line = String::from_utf8_lossy(&raw);
        let notice = match line.trim_end_matches(['\n', '\r']).parse::<ShopInput>() {
            Ok(ShopInput::Quit) => break,
            Ok(command) => apply(session, command),
            Err(input_error) => Some(format!("{input_error}; {COMMAND_HINT}")),
        };
        writeln!(output, "{}", render(session, storefront, notice.as_deref()))?;
    }

    output.flush()?;
    info!(
        event_name = "shop.session.ended",
        cart_lines = session.cart().lines().len(),
        "storefront session ended"
    );
    Ok(())
}

/// Applies one shopper command, returning the notice to show under the screen.
pub fn apply(session: &mut Session, command: ShopInput) -> Option<String> {
    let result = match command {
        ShopInput::Increment(card) | ShopInput::AddToCart(card) => session.add_at(position(card)),
        ShopInput::Decrement(card) => session.remove_at(position(card)),
        ShopInput::ToggleDiscount => session.toggle_discount(),
        ShopInput::Help => return Some(COMMAND_HINT.to_string()),
        ShopInput::Redraw | ShopInput::Quit => return None,
    };

    match result {
        Ok(outcome) => {
            debug!(event_name = "shop.session.transition", event = ?outcome.event, "applied");
            None
        }
        Err(domain_error) if domain_error.is_ignorable() => {
            debug!(event_name = "shop.session.noop", error = %domain_error, "ignored");
            None
        }
        Err(domain_error) => Some(ApplicationError::from(domain_error).user_message().to_string()),
    }
}

fn position(card: usize) -> usize {
    card.checked_sub(1).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bookworm_core::config::AppConfig;
    use bookworm_core::domain::book::{BookId, BookRecord, ListMetadata};
    use bookworm_core::storefront::catalog::{Catalog, FixedPriceAssigner};
    use bookworm_core::Session;
    use rust_decimal::Decimal;

    use crate::commands::OutputStream;

    use super::{apply, run_session, session_summary, InputError, ShopInput};

    fn ready_session() -> Session {
        let records = ["A", "B"]
            .iter()
            .map(|id| BookRecord {
                id: (*id).to_string(),
                title: format!("Title {id}"),
                ..BookRecord::default()
            })
            .collect();
        let catalog = Catalog::from_records(
            ListMetadata::default(),
            records,
            &mut FixedPriceAssigner(Decimal::from(50)),
        );
        let mut session = Session::default();
        session.settle(catalog).expect("settle");
        session
    }

    #[test]
    fn parses_commands_and_card_numbers() {
        assert_eq!("+ 2".parse::<ShopInput>(), Ok(ShopInput::Increment(2)));
        assert_eq!("dec 1".parse::<ShopInput>(), Ok(ShopInput::Decrement(1)));
        assert_eq!("ADD 3".parse::<ShopInput>(), Ok(ShopInput::AddToCart(3)));
        assert_eq!("discount".parse::<ShopInput>(), Ok(ShopInput::ToggleDiscount));
        assert_eq!("q".parse::<ShopInput>(), Ok(ShopInput::Quit));
        assert_eq!("   ".parse::<ShopInput>(), Ok(ShopInput::Redraw));
    }

    #[test]
    fn rejects_bad_input_with_reason() {
        assert_eq!("+".parse::<ShopInput>(), Err(InputError::MissingCard("+".into())));
        assert_eq!("add 0".parse::<ShopInput>(), Err(InputError::InvalidCard("0".into())));
        assert_eq!("buy 1".parse::<ShopInput>(), Err(InputError::UnknownCommand("buy".into())));
    }

    #[test]
    fn decrement_without_line_is_silent_noop() {
        let mut session = ready_session();
        let before = session.cart().clone();

        assert_eq!(apply(&mut session, ShopInput::Decrement(1)), None);
        assert_eq!(session.cart(), &before);
    }

    #[test]
    fn unknown_card_reports_hint() {
        let mut session = ready_session();
        let notice = apply(&mut session, ShopInput::Increment(9)).expect("notice");
        assert!(notice.contains("not on the shelf"));
    }

    #[test]
    fn add_to_cart_matches_increment() {
        let mut session = ready_session();
        apply(&mut session, ShopInput::AddToCart(2));
        apply(&mut session, ShopInput::Increment(2));
        assert_eq!(session.quantity_of(&BookId::new("B")), 2);
    }

    #[test]
    fn session_loop_redraws_after_each_line_and_stops_at_quit() {
        let mut session = ready_session();
        let input = Cursor::new("+ 1\n+ 1\ndiscount\nquit\n+ 1\n");
        let mut output = Vec::new();

        run_session(&mut session, &AppConfig::default().storefront, input, &mut output)
            .expect("session runs");

        let screen = String::from_utf8(output).expect("utf8");
        assert_eq!(screen.matches("Cart total:").count(), 4);
        assert!(screen.contains("Cart total: 100 TL"));
        assert!(screen.contains("Cart total: 80 TL"));
        assert_eq!(session.quantity_of(&BookId::new("A")), 2);
    }

    #[test]
    fn session_loop_ends_at_end_of_input() {
        let mut session = ready_session();
        let mut output = Vec::new();

        run_session(
            &mut session,
            &AppConfig::default().storefront,
            Cursor::new("bogus\n"),
            &mut output,
        )
        .expect("session runs");

        let screen = String::from_utf8(output).expect("utf8");
        assert!(screen.contains("unknown command `bogus`"));
    }

    #[test]
    fn undecodable_input_line_is_hinted_and_session_continues() {
        let mut session = ready_session();
        let mut output = Vec::new();
        let input: &[u8] = &[0xff, b'\n', b'd', b'\r', b'\n'];

        run_session(&mut session, &AppConfig::default().storefront, input, &mut output)
            .expect("session survives bad bytes");

        let screen = String::from_utf8(output).expect("utf8");
        assert!(screen.contains("unknown command"));
        assert!(session.discount_applied());
    }

    #[test]
    fn closing_summary_stays_off_the_screen() {
        let mut session = ready_session();
        apply(&mut session, ShopInput::AddToCart(1));

        let result = session_summary(&session, &AppConfig::default().storefront);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stream, OutputStream::Stderr);
        assert!(result.output.contains("1 item(s) in cart, total 50 TL"));
    }
}
