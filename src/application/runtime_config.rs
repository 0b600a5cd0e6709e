use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub script: PathBuf,
    pub node_limit: Option<NonZeroUsize>,
    pub check_each_step: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            script: cli.script,
            node_limit: cli.node_limit,
            check_each_step: cli.check_each_step,
        }
    }
}
