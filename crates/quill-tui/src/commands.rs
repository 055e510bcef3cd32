//! Slash command parsing.
//!
//! Anything not starting with `/` is a chat message. Parsing never fails:
//! bad input becomes [`Command::Unknown`] or [`Command::InvalidArgs`] so the
//! caller can show a notice.

use quill_proto::ModelId;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a chat message.
    Message {
        /// Message text.
        content: String,
    },
    /// Attach a passage of the document.
    Select {
        /// Passage text.
        text: String,
    },
    /// Drop one selection.
    Unselect {
        /// Selection id, e.g. `sel-2`.
        id: String,
    },
    /// Drop every selection.
    ClearSelection,
    /// Switch model.
    Model {
        /// New model.
        model: ModelId,
    },
    /// List models.
    Models,
    /// Toggle agent mode.
    Agent {
        /// New flag.
        enabled: bool,
    },
    /// Replace one document paragraph.
    Edit {
        /// Zero-based paragraph index.
        block: usize,
        /// New paragraph text.
        text: String,
    },
    /// Empty the transcript.
    Clear,
    /// Connect, keeping the reconnect budget.
    Connect,
    /// Connect with a fresh reconnect budget.
    Retry,
    /// Close the socket.
    Disconnect,
    /// Exit.
    Quit,
    /// Unrecognized command.
    Unknown {
        /// The raw input.
        input: String,
    },
    /// Known command with bad arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: String,
        /// What was wrong.
        error: String,
    },
}

/// Parse one input line.
pub fn parse(input: &str) -> Command {
    let Some(rest) = input.strip_prefix('/') else {
        return Command::Message { content: input.to_owned() };
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "select" | "sel" => {
            if args.is_empty() {
                invalid(name, "expected text to select")
            } else {
                Command::Select { text: args.to_owned() }
            }
        },
        "unselect" => {
            if args.is_empty() {
                invalid(name, "expected a selection id")
            } else {
                Command::Unselect { id: args.to_owned() }
            }
        },
        "clear-selection" => Command::ClearSelection,
        "model" => match args.parse::<ModelId>() {
            Ok(model) => Command::Model { model },
            Err(_) if args.is_empty() => Command::Models,
            Err(_) => invalid(name, &format!("unknown model '{args}', see /models")),
        },
        "models" => Command::Models,
        "agent" => match args {
            "on" => Command::Agent { enabled: true },
            "off" => Command::Agent { enabled: false },
            _ => invalid(name, "expected on or off"),
        },
        "edit" => parse_edit(args).unwrap_or_else(|| invalid(name, "expected <paragraph> <text>")),
        "clear" => Command::Clear,
        "connect" => Command::Connect,
        "retry" => Command::Retry,
        "disconnect" => Command::Disconnect,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown { input: input.to_owned() },
    }
}

fn parse_edit(args: &str) -> Option<Command> {
    let (index, text) = args.split_once(char::is_whitespace)?;
    let block = index.parse().ok()?;
    Some(Command::Edit { block, text: text.trim_start().to_owned() })
}

fn invalid(command: &str, error: &str) -> Command {
    Command::InvalidArgs { command: command.to_owned(), error: error.to_owned() }
}
