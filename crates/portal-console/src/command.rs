use portal_core::{CoreError, ShortToken};
use thiserror::Error;
use url::Url;

/// A parsed console request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create <url> [limit]`
    Create { url: String, limit: Option<u32> },
    /// `info <token>`
    Info(ShortToken),
    /// `update <token> <limit>`
    Update { token: ShortToken, limit: u32 },
    /// `delete <token>`
    Delete(ShortToken),
    /// A bare token: follow the link.
    Visit(ShortToken),
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("wrong format, use: {0}")]
    Usage(&'static str),
    #[error("limit must be a non-negative number, got '{0}'")]
    InvalidLimit(String),
    #[error("invalid URL '{0}', make sure it starts with http:// or https://")]
    InvalidUrl(String),
    #[error("not a short link: {0}")]
    InvalidToken(#[from] CoreError),
    #[error("unknown command '{0}', type 'help' for the list of commands")]
    UnknownCommand(String),
}

const CREATE_USAGE: &str = "create <url> [limit]";
const INFO_USAGE: &str = "info <short_link>";
const UPDATE_USAGE: &str = "update <short_link> <new_limit>";
const DELETE_USAGE: &str = "delete <short_link>";

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "create" => match args {
                [url] => Command::Create {
                    url: parse_url(url)?,
                    limit: None,
                },
                [url, limit] => Command::Create {
                    url: parse_url(url)?,
                    limit: Some(parse_limit(limit)?),
                },
                _ => return Err(CommandError::Usage(CREATE_USAGE)),
            },
            "info" => match args {
                [token] => Command::Info(ShortToken::new(*token)?),
                _ => return Err(CommandError::Usage(INFO_USAGE)),
            },
            "update" => match args {
                [token, limit] => Command::Update {
                    token: ShortToken::new(*token)?,
                    limit: parse_limit(limit)?,
                },
                _ => return Err(CommandError::Usage(UPDATE_USAGE)),
            },
            "delete" => match args {
                [token] => Command::Delete(ShortToken::new(*token)?),
                _ => return Err(CommandError::Usage(DELETE_USAGE)),
            },
            "help" if args.is_empty() => Command::Help,
            "exit" if args.is_empty() => Command::Exit,
            _ if args.is_empty() => Command::Visit(ShortToken::new(*head)?),
            _ => return Err(CommandError::UnknownCommand((*head).to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_limit(raw: &str) -> Result<u32, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidLimit(raw.to_string()))
}

/// Accepts absolute `http`/`https` URLs with a host.
fn parse_url(raw: &str) -> Result<String, CommandError> {
    let invalid = || CommandError::InvalidUrl(raw.to_string());
    let url = Url::parse(raw).map_err(|_| invalid())?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }

    Ok(raw.to_string())
}
