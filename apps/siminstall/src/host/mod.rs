//! # Host Collaborators
//!
//! Real implementations of the `siminstall-core` capability traits for a
//! Debian/Ubuntu system.
//!
//! | Capability | Implementation | Backed by |
//! |------------|----------------|-----------|
//! | `PrivilegeCheck` | [`RootCheck`] | `id -u` |
//! | `PackageQuery` | [`DpkgQuery`] | `dpkg-query -W` |
//! | `ToolLocator` | [`PathLocator`] | `PATH` lookup |
//! | `Fetcher` | [`CommandFetcher`] | `wget` / `curl` |
//! | `Extractor` | [`TarExtractor`] | `tar -xf` |
//! | `Builder` | [`CmakeBuilder`] | `cmake` |
//! | `FileSystem` | [`SystemFs`] | `std::fs` |
//! | `RegistryUpdater` | [`CommandRegistry`] | `update-*-database` |
//! | `ScratchDir` | [`TempScratch`] | `tempfile` |

mod build;
mod fetch;
mod fs;
mod process;
mod system;

pub use build::{CmakeBuilder, TarExtractor};
pub use fetch::{CommandFetcher, FetchTool};
pub use fs::{CommandRegistry, EXECUTABLE_MODE, SystemFs, TempScratch};
pub use system::{DpkgQuery, PathLocator, RootCheck};

use crate::config::ConfigError;
use siminstall_core::{Fetcher, Host, InstallPlan};

/// Owns one instance of every collaborator for a plan.
#[derive(Debug)]
pub struct SystemHost {
    privilege: RootCheck,
    packages: DpkgQuery,
    tools: PathLocator,
    fetchers: Vec<CommandFetcher>,
    extractor: TarExtractor,
    builder: CmakeBuilder,
    fs: SystemFs,
    registry: CommandRegistry,
}

impl SystemHost {
    /// Wire collaborators for `plan`, rejecting fetch tools we cannot drive.
    pub fn for_plan(plan: &InstallPlan) -> Result<Self, ConfigError> {
        let fetchers = plan
            .fetchers
            .iter()
            .map(|name| {
                FetchTool::from_name(name)
                    .map(CommandFetcher::new)
                    .ok_or_else(|| ConfigError::UnknownFetcher(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            privilege: RootCheck,
            packages: DpkgQuery,
            tools: PathLocator::from_env(),
            fetchers,
            extractor: TarExtractor,
            builder: CmakeBuilder::new(plan.build.tool.clone()),
            fs: SystemFs,
            registry: CommandRegistry,
        })
    }

    /// Borrow everything as a core [`Host`].
    pub fn host(&self) -> Host<'_> {
        Host {
            privilege: &self.privilege,
            packages: &self.packages,
            tools: &self.tools,
            fetchers: self.fetchers.iter().map(|f| f as &dyn Fetcher).collect(),
            extractor: &self.extractor,
            builder: &self.builder,
            fs: &self.fs,
            registry: &self.registry,
        }
    }
}
