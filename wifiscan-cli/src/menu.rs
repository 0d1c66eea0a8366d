//! Interactive single-letter command menu.

use log::debug;

use wifiscan::{AccessPoint, Finder, InputSource, ProbeSender, WirelessAdapter};

use crate::output;

const MENU_PROMPT: &str = "Enter a command (H for help): ";
const SELECT_PROMPT: &str = "Select a network by its index: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    List,
    Connect,
    Disconnect,
    Status,
    ProfileXml,
    RemoveProfile,
    Info,
    FindDevices,
    AutoConnect,
    Help,
    Quit,
}

impl MenuCommand {
    /// Parses a menu answer; the command letter is case-insensitive.
    pub fn parse(answer: &str) -> Option<Self> {
        let mut chars = answer.trim().chars();
        let letter = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let command = match letter.to_ascii_uppercase() {
            'L' => Self::List,
            'C' => Self::Connect,
            'D' => Self::Disconnect,
            'S' => Self::Status,
            'X' => Self::ProfileXml,
            'R' => Self::RemoveProfile,
            'I' => Self::Info,
            'F' => Self::FindDevices,
            'A' => Self::AutoConnect,
            'H' | '?' => Self::Help,
            'Q' => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

pub fn help() -> &'static str {
    "\
L  List visible networks
C  Connect to a network
D  Disconnect
S  Connection status
X  Print the stored profile of a network as XML
R  Remove the stored profile of a network
I  Show network information
F  Find devices on the local network
A  Auto-connect to every known network and scan each
Q  Quit"
}

/// Reads commands until `Q` or end of input.
///
/// A failing command prints its error and returns to the menu.
pub async fn run<A, P>(finder: &Finder<A, P>, input: &mut dyn InputSource) -> anyhow::Result<()>
where
    A: WirelessAdapter,
    P: ProbeSender + 'static,
{
    input.notify(help())?;

    while let Some(answer) = input.prompt(MENU_PROMPT)? {
        if answer.trim().is_empty() {
            continue;
        }
        let Some(command) = MenuCommand::parse(&answer) else {
            input.notify(&format!("Unknown command '{}'.", answer.trim()))?;
            continue;
        };
        if command == MenuCommand::Quit {
            break;
        }

        debug!("Menu command: {command:?}");
        if let Err(e) = execute(finder, command, input).await {
            if e.is_input_error() {
                input.notify(&format!("{e}"))?;
            } else {
                input.notify(&format!("Error: {e}"))?;
            }
        }
    }
    Ok(())
}

async fn execute<A, P>(
    finder: &Finder<A, P>,
    command: MenuCommand,
    input: &mut dyn InputSource,
) -> wifiscan::Result<()>
where
    A: WirelessAdapter,
    P: ProbeSender + 'static,
{
    match command {
        MenuCommand::List => {
            let list = finder.list_access_points().await?;
            input.notify(&output::access_points(&list))?;
        }
        MenuCommand::Connect => {
            let outcome = finder.connect_interactive(input).await?;
            input.notify(&outcome.to_string())?;
        }
        MenuCommand::Disconnect => {
            finder.disconnect().await?;
            input.notify("Disconnected.")?;
        }
        MenuCommand::Status => {
            let status = finder.status().await?;
            input.notify(&status.to_string())?;
        }
        MenuCommand::ProfileXml => {
            let ap = pick(finder, input).await?;
            let xml = finder.profile_xml(&ap).await?;
            input.notify(&xml)?;
        }
        MenuCommand::RemoveProfile => {
            let ap = pick(finder, input).await?;
            finder.delete_profile(&ap).await?;
            input.notify(&format!("Profile for '{}' removed.", ap.name))?;
        }
        MenuCommand::Info => {
            let ap = pick(finder, input).await?;
            input.notify(&ap.to_string())?;
        }
        MenuCommand::FindDevices => {
            let result = finder.discover(input).await?;
            input.notify(&output::scan_result(&result))?;
        }
        MenuCommand::AutoConnect => {
            let report = finder.connect_all().await?;
            input.notify(&output::auto_connect_report(&report))?;
        }
        MenuCommand::Help => input.notify(help())?,
        MenuCommand::Quit => {}
    }
    Ok(())
}

/// Lists access points and lets the operator pick one.
async fn pick<A, P>(finder: &Finder<A, P>, input: &mut dyn InputSource) -> wifiscan::Result<AccessPoint>
where
    A: WirelessAdapter,
    P: ProbeSender + 'static,
{
    let list = finder.list_access_points().await?;
    if !list.is_empty() {
        input.notify(&list.to_string())?;
    }
    Ok(finder.select(&list, input, SELECT_PROMPT)?.clone())
}
