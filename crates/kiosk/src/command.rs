//! Parsing of kiosk input lines into commands.

use domain::{MenuItemId, PaymentMethod};
use thiserror::Error;

/// Separates the customer name from special instructions in `checkout`.
pub const NOTES_SEPARATOR: &str = "--";

/// A customer intent typed at the kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Menu,
    Scan(String),
    Demo,
    Add(MenuItemId),
    Remove(MenuItemId),
    Delete(MenuItemId),
    Clear,
    Cart,
    Checkout {
        payment_method: PaymentMethod,
        name: String,
        notes: Option<String>,
    },
    NewOrder,
    Status,
    Json,
    SimulateFailure(bool),
    Metrics,
    Help,
    Quit,
}

/// Input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty input")]
    Empty,

    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("not a menu item number: {0}")]
    InvalidItemId(String),

    #[error("unknown payment method: {0} (use cash, card, duitnow, tng or grabpay)")]
    InvalidPaymentMethod(String),

    #[error("expected `on` or `off`, got: {0}")]
    InvalidToggle(String),
}

impl Command {
    /// Returns a short name for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Menu => "menu",
            Command::Scan(_) => "scan",
            Command::Demo => "demo",
            Command::Add(_) => "add",
            Command::Remove(_) => "remove",
            Command::Delete(_) => "delete",
            Command::Clear => "clear",
            Command::Cart => "cart",
            Command::Checkout { .. } => "checkout",
            Command::NewOrder => "new",
            Command::Status => "status",
            Command::Json => "json",
            Command::SimulateFailure(_) => "fail",
            Command::Metrics => "metrics",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

impl std::str::FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "menu" => Ok(Command::Menu),
            "scan" => {
                if rest.is_empty() {
                    Err(CommandError::MissingArgument {
                        command: "scan",
                        argument: "a QR payload",
                    })
                } else {
                    Ok(Command::Scan(rest.to_string()))
                }
            }
            "demo" => Ok(Command::Demo),
            "add" | "+" => item_id("add", rest).map(Command::Add),
            "remove" | "-" => item_id("remove", rest).map(Command::Remove),
            "delete" | "del" => item_id("delete", rest).map(Command::Delete),
            "clear" => Ok(Command::Clear),
            "cart" => Ok(Command::Cart),
            "checkout" | "order" => checkout(rest),
            "new" => Ok(Command::NewOrder),
            "status" => Ok(Command::Status),
            "json" => Ok(Command::Json),
            "fail" => match rest.to_ascii_lowercase().as_str() {
                "on" => Ok(Command::SimulateFailure(true)),
                "off" => Ok(Command::SimulateFailure(false)),
                other => Err(CommandError::InvalidToggle(other.to_string())),
            },
            "metrics" => Ok(Command::Metrics),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn item_id(command: &'static str, arg: &str) -> Result<MenuItemId, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "a menu item number",
        });
    }
    arg.parse()
        .map_err(|_| CommandError::InvalidItemId(arg.to_string()))
}

// checkout <payment> <name...> [-- notes...]
fn checkout(rest: &str) -> Result<Command, CommandError> {
    let (method, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if method.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "checkout",
            argument: "a payment method and your name",
        });
    }
    let payment_method: PaymentMethod = method
        .parse()
        .map_err(|_| CommandError::InvalidPaymentMethod(method.to_string()))?;

    let (name, notes) = match rest.split_once(NOTES_SEPARATOR) {
        Some((name, notes)) => (name.trim(), Some(notes.trim().to_string())),
        None => (rest.trim(), None),
    };
    if name.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "checkout",
            argument: "your name",
        });
    }

    Ok(Command::Checkout {
        payment_method,
        name: name.to_string(),
        notes: notes.filter(|n| !n.is_empty()),
    })
}
