//! Command frames pushed from the server to agents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The set of imperative commands an agent understands.
///
/// Serialized in kebab-case on the wire (`"lock-screen"`, `"run-command"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    /// Power off the machine
    Shutdown,
    /// Restart the machine
    Reboot,
    /// Cover the screen with a blocking overlay
    LockScreen,
    /// Remove the blocking overlay
    UnlockScreen,
    /// Execute an arbitrary shell script
    RunCommand,
}

impl CommandKind {
    /// Wire representation of this command kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Shutdown => "shutdown",
            CommandKind::Reboot => "reboot",
            CommandKind::LockScreen => "lock-screen",
            CommandKind::UnlockScreen => "unlock-screen",
            CommandKind::RunCommand => "run-command",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shutdown" => Ok(CommandKind::Shutdown),
            "reboot" => Ok(CommandKind::Reboot),
            "lock-screen" => Ok(CommandKind::LockScreen),
            "unlock-screen" => Ok(CommandKind::UnlockScreen),
            "run-command" => Ok(CommandKind::RunCommand),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// Error for a command string that names no known kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

/// Payload of an outbound command frame.
///
/// The server treats the payload as opaque: `script` is only meaningful
/// for `run-command` and is never validated here. Execution and result
/// handling are the receiving agent's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    /// Which command to execute
    pub cmd: CommandKind,
    /// Shell script body, for `run-command` only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl CommandFrame {
    /// Create a command frame without a script body
    pub fn new(cmd: CommandKind) -> Self {
        Self { cmd, script: None }
    }

    /// Create a `run-command` frame carrying a script
    pub fn run_command(script: impl Into<String>) -> Self {
        Self {
            cmd: CommandKind::RunCommand,
            script: Some(script.into()),
        }
    }
}
