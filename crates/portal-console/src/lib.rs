//! Interactive console front-end for the Portal link registry.
//!
//! [`Command`] turns a line of user input into a registry request and
//! [`Session`] runs it on behalf of one owner, rendering the outcome to
//! any writer. The `portal` binary wires both to stdin/stdout.

pub mod command;
pub mod session;

pub use command::{Command, CommandError};
pub use session::{Flow, Session};
