//! Command dispatch: bridges CLI args -> session snapshot -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod events;
pub mod util;

use kodakhome_core::SmartHomeSession;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a portal-bound command to the appropriate handler.
///
/// The session is already connected; handlers only read its snapshot.
pub fn dispatch(
    cmd: Command,
    session: &SmartHomeSession,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(session, args, global),
        Command::Events(args) => events::handle(session, &args, global),
        // Config and Completions never reach the portal
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
