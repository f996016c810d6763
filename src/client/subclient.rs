//! Sub-client invocation formed from a CONNECT handshake.

use std::process::Command;

/// Flag that hands a session name and connect address to a client process.
pub const ONELAB_FLAG: &str = "-onelab";

/// How to launch a sub-client the host agreed to accept.
///
/// Forming the invocation is all this crate does; spawning it is left to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubClientInvocation {
    /// Command line of the sub-client, as given to `request_sub_client`
    pub command: String,
    /// `["-onelab", name, address]`
    pub args: [String; 3],
}

impl SubClientInvocation {
    pub(crate) fn new(command: &str, name: &str, address: String) -> Self {
        Self {
            command: command.to_owned(),
            args: [ONELAB_FLAG.to_owned(), name.to_owned(), address],
        }
    }

    /// Session name the sub-client must use
    #[must_use]
    pub fn name(&self) -> &str {
        &self.args[1]
    }

    /// Address the host listens on for the sub-client
    #[must_use]
    pub fn address(&self) -> &str {
        &self.args[2]
    }

    /// Full command line, space separated, for shell execution.
    #[must_use]
    pub fn command_line(&self) -> String {
        format!("{} {}", self.command, self.args.join(" "))
    }

    /// Build a [`Command`] without spawning it.
    ///
    /// `command` is split on whitespace into program and leading arguments;
    /// no shell quoting is interpreted.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut words = self.command.split_whitespace();
        let mut cmd = Command::new(words.next().unwrap_or_default());
        cmd.args(words).args(&self.args);
        cmd
    }
}
