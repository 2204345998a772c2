use crate::command::Command;
use portal_core::{Clock, LinkRecord, ShortToken};
use portal_registry::{Generator, LinkRegistry};
use std::io::{self, Write};

/// Whether the console should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub const HELP: &str = "\
COMMANDS:
  create <url> [limit]             create a short link (limit is optional)
  info <short_link>                show link details
  update <short_link> <new_limit>  change the visit limit
  delete <short_link>              delete a link
  <short_link>                     follow a short link
  help                             show this list
  exit                             quit
";

/// One user's console session against a shared registry.
///
/// Every link created here is owned by the session's `owner_id`, and only
/// this owner can update or delete it.
pub struct Session<'a, C: Clock, G: Generator> {
    registry: &'a LinkRegistry<C, G>,
    owner_id: String,
    base_url: Option<String>,
}

impl<'a, C: Clock, G: Generator> Session<'a, C, G> {
    pub fn new(registry: &'a LinkRegistry<C, G>, owner_id: impl Into<String>) -> Self {
        Self {
            registry,
            owner_id: owner_id.into(),
            base_url: None,
        }
    }

    /// Shows created links as full URLs under `base_url` instead of bare tokens.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Parses and runs one line of input, reporting parse errors to `out`.
    pub fn handle_line(&self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command, out),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        match command {
            Command::Create { url, limit } => {
                let link = match limit {
                    Some(limit) => self.registry.create(url, self.owner_id.as_str(), limit),
                    None => self
                        .registry
                        .create_with_default_limit(url, self.owner_id.as_str()),
                };
                writeln!(
                    out,
                    "Created short link {} with a limit of {} visits.",
                    self.display(&link.short_token),
                    link.visit_limit
                )?;
            }
            Command::Info(token) => match self.registry.lookup(&token) {
                Some(link) => self.write_info(&link, out)?,
                None => writeln!(out, "Error: link not found or expired.")?,
            },
            Command::Update { token, limit } => {
                if self.registry.update_limit(&token, &self.owner_id, limit) {
                    writeln!(out, "Visit limit for {token} set to {limit}.")?;
                } else {
                    writeln!(
                        out,
                        "Error: link not found or you are not allowed to change it."
                    )?;
                }
            }
            Command::Delete(token) => {
                if self.registry.delete(&token, &self.owner_id) {
                    writeln!(out, "Link {token} deleted.")?;
                } else {
                    writeln!(
                        out,
                        "Error: link not found or you are not allowed to delete it."
                    )?;
                }
            }
            Command::Visit(token) => match self.registry.resolve_and_visit(&token) {
                Some(url) => writeln!(out, "Redirect to: {url}")?,
                None => writeln!(out, "Error: link not found, expired, or out of visits.")?,
            },
            Command::Help => write!(out, "{HELP}")?,
            Command::Exit => {
                writeln!(out, "Goodbye!")?;
                return Ok(Flow::Exit);
            }
        }

        Ok(Flow::Continue)
    }

    fn display(&self, token: &ShortToken) -> String {
        match &self.base_url {
            Some(base) => token.to_url(base),
            None => token.to_string(),
        }
    }

    fn write_info(&self, link: &LinkRecord, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Link {}:", self.display(&link.short_token))?;
        writeln!(out, "  original:  {}", link.original_url)?;
        writeln!(out, "  created:   {}", link.created_at)?;
        match link.expires_at(self.registry.settings().ttl) {
            Some(expires_at) => writeln!(out, "  expires:   {expires_at}")?,
            None => writeln!(out, "  expires:   never")?,
        }
        writeln!(out, "  limit:     {}", link.visit_limit)?;
        writeln!(out, "  used:      {}", link.visit_count)?;
        writeln!(out, "  remaining: {}", link.remaining_visits())
    }
}
