use std::io::Write;

use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{Report, RunError, Runner, RuntimeConfig};
use crate::script::{Script, ScriptError};
use crate::tree::{FileTree, TreeError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        Self::run_with_report(app_config, &mut Report::stdout()).await
    }

    pub async fn run_with_report<W: Write>(
        app_config: impl Into<RuntimeConfig>,
        report: &mut Report<W>,
    ) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let script = Script::read(&app_config.script)
            .await
            .context(ScriptSnafu)?;
        debug!("Loaded script: {} steps", script.len());

        let mut tree = match app_config.node_limit {
            Some(limit) => FileTree::with_node_limit(limit),
            None => FileTree::new(),
        };
        tree.init().context(TreeSetupSnafu)?;

        let summary = Runner::new(&mut tree, app_config.check_each_step)
            .run(&script, report)
            .context(RunSnafu)?;
        info!(
            "Ran {} steps, {} with unmet expectations",
            summary.steps, summary.unmet
        );

        ensure!(
            summary.unmet == 0,
            UnmetExpectationsSnafu {
                count: summary.unmet
            }
        );
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the script"))]
    ScriptError { source: ScriptError },
    #[snafu(display("Failed to set up the tree"))]
    TreeSetupError { source: TreeError },
    #[snafu(display("Critical failure encountered while running the script"))]
    RunError { source: RunError },
    #[snafu(display("{} steps did not end as expected", count))]
    UnmetExpectations { count: usize },
}
