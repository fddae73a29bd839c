//! Chat messages, command parsing, and the fixed reply texts.

use crate::domain::error::CommandError;
use crate::domain::magnet::{MAGNET_PREFIX, contains_magnet};

pub const PLEASE_WAIT: &str = "Executing your command, please wait...";
pub const NOT_AUTHORIZED: &str = "Sorry, this is a private bot";
pub const NO_TORRENTS: &str = "There are no active torrents";
pub const BAD_MAGNET: &str = "Please check your magnet link and try again";
pub const NO_MAGNET_ON_PAGE: &str =
    "Can't find a magnet link for your URL, please provide it directly";
pub const DESTROY_SENT: &str = "Destroy request was sent";

const WELCOME: &str = "\nWelcome to Transmission management bot!\nCommands available:\n\
/add - Add torrent to transfers list by URL or magnet link.\n\
/list - Print information for current torrents with provided ids\n\
/list_w_files - Print information for current torrents with files listing\n\
/wanted - Download only the given files of a torrent: /wanted <id> <file ids>\n\
/delete - Delete torrent from transfers list by IDs\n\
/stop - Stop torrent by IDs\n\
/go - Start torrent by IDs\n\
/destroy - Tear down the Transmission host\n\
/help - Print help message";

/// Who a message came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub file_id: String,
    pub file_name: Option<String>,
}

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub update_id: i64,
    pub chat: ChatInfo,
    pub text: Option<String>,
    pub document: Option<DocumentRef>,
}

impl IncomingMessage {
    /// Text used in traffic logs.
    #[must_use]
    pub fn log_text(&self) -> &str {
        match (&self.text, &self.document) {
            (Some(text), _) => text,
            (None, Some(doc)) => doc.file_name.as_deref().unwrap_or("<document>"),
            (None, None) => "",
        }
    }
}

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    List,
    ListWithFiles,
    Wanted { torrent_id: i64, file_ids: Vec<usize> },
    AddMagnet(String),
    AddFromPage(String),
    AddTorrentFile(DocumentRef),
    Start(Vec<String>),
    Stop(Vec<String>),
    Delete(Vec<String>),
    Destroy,
    /// `/add` without a usable magnet link.
    InvalidMagnet,
}

impl ChatCommand {
    /// Recognise the command carried by a message.
    ///
    /// Returns `Ok(None)` for messages the bot does not handle; they get no
    /// reply at all.
    ///
    /// # Errors
    ///
    /// Returns an error if a known command has malformed arguments.
    pub fn parse(message: &IncomingMessage) -> Result<Option<Self>, CommandError> {
        let Some(text) = message.text.as_deref() else {
            return Ok(message.document.clone().map(Self::AddTorrentFile));
        };
        let text = text.trim();

        // Free-form links are checked before slash commands, and `/add`
        // matches as a plain prefix.
        if let Some(rest) = text.strip_prefix("/add") {
            let link = rest.strip_prefix(' ').unwrap_or(rest).trim();
            return Ok(Some(if contains_magnet(link) {
                Self::AddMagnet(link.to_string())
            } else {
                Self::InvalidMagnet
            }));
        }
        if text.starts_with(MAGNET_PREFIX) {
            return Ok(Some(Self::AddMagnet(text.to_string())));
        }
        if text.starts_with("https://") {
            return Ok(Some(Self::AddFromPage(text.to_string())));
        }

        let Some((name, args)) = split_command(text) else {
            return Ok(None);
        };
        let command = match name {
            "start" | "help" => Self::Help,
            "list" => Self::List,
            "list_w_files" => Self::ListWithFiles,
            "wanted" => parse_wanted(&args)?,
            "go" => Self::Start(args),
            "stop" => Self::Stop(args),
            "delete" => Self::Delete(args),
            "destroy" => Self::Destroy,
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

/// Split `/name@bot arg1 arg2` into `("name", ["arg1", "arg2"])`.
fn split_command(text: &str) -> Option<(&str, Vec<String>)> {
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let head = parts.next()?;
    let name = head.split('@').next().unwrap_or(head);
    Some((name, parts.map(str::to_string).collect()))
}

fn parse_wanted(args: &[String]) -> Result<ChatCommand, CommandError> {
    const USAGE: &str = "/wanted <torrent id> <file id> [file id...]";
    let (first, rest) = args.split_first().ok_or(CommandError::Usage(USAGE))?;
    if rest.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }
    let torrent_id = first
        .parse()
        .map_err(|_| CommandError::InvalidId(first.clone()))?;
    let file_ids = rest
        .iter()
        .map(|s| s.parse().map_err(|_| CommandError::InvalidId(s.clone())))
        .collect::<Result<Vec<usize>, _>>()?;
    Ok(ChatCommand::Wanted {
        torrent_id,
        file_ids,
    })
}

/// Greeting for `/start` and `/help`, addressed by name or chat title.
#[must_use]
pub fn greeting(chat: &ChatInfo) -> String {
    let addressee = match (&chat.first_name, &chat.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.clone(),
        (None, _) => chat.title.clone().unwrap_or_default(),
    };
    format!("Hello, {addressee} {WELCOME}")
}

/// Reply after `/go`, `/stop` or `/delete`.
#[must_use]
pub fn ids_reply(ids: &[String], verb: &str) -> String {
    format!("Torrents with IDs {} were {verb}.\n", ids.join(" "))
}

// ── Unit tests ────────────────────────────────────────────────────────────────
