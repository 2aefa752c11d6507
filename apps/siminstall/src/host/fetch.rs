//! Download tools.

use super::process::run_inherited;
use siminstall_core::{Fetcher, ToolFailure};
use std::path::Path;
use std::process::Command;

/// A supported command-line download tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTool {
    Wget,
    Curl,
}

impl FetchTool {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wget" => Some(Self::Wget),
            "curl" => Some(Self::Curl),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wget => "wget",
            Self::Curl => "curl",
        }
    }

    /// Full invocation saving `url` to `dest`.
    pub fn command(self, url: &str, dest: &Path) -> Command {
        let mut cmd = Command::new(self.name());
        match self {
            Self::Wget => {
                cmd.arg("-O").arg(dest).arg(url);
            }
            Self::Curl => {
                cmd.args(["-fL", "-o"]).arg(dest).arg(url);
            }
        }
        cmd
    }
}

/// Fetcher running one [`FetchTool`]; progress goes to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct CommandFetcher {
    tool: FetchTool,
}

impl CommandFetcher {
    pub fn new(tool: FetchTool) -> Self {
        Self { tool }
    }
}

impl Fetcher for CommandFetcher {
    fn tool(&self) -> &str {
        self.tool.name()
    }

    fn fetch(&self, url: &str, dest: &Path) -> Result<(), ToolFailure> {
        tracing::info!(tool = self.tool.name(), url, "downloading");
        run_inherited(&mut self.tool.command(url, dest))
    }
}
