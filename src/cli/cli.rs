use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Runs a YAML script of operations against an in-memory file tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Path to the script to run
    pub script: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Maximum number of live nodes the tree may hold
    #[clap(long, short)]
    pub node_limit: Option<NonZeroUsize>,

    /// Audit the tree's invariants after every step
    #[clap(long, short)]
    pub check_each_step: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RuntimeConfig;
    use rstest::*;

    #[test]
    fn defaults_leave_the_tree_unbounded() {
        let cli = Cli::try_parse_from(["memtree", "script.yaml"]).unwrap();
        let config = RuntimeConfig::from(cli);

        assert_eq!(config.script, PathBuf::from("script.yaml"));
        assert_eq!(config.node_limit, None);
        assert!(!config.check_each_step);
    }

    #[test]
    fn flags_reach_the_runtime_config() {
        let cli = Cli::try_parse_from([
            "memtree",
            "run.yaml",
            "--node-limit",
            "16",
            "--check-each-step",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.to_tracing_level(), Some(tracing::Level::DEBUG));

        let config: RuntimeConfig = cli.into();

        assert_eq!(config.node_limit, NonZeroUsize::new(16));
        assert!(config.check_each_step);
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("many")]
    fn node_limit_must_be_positive(#[case] limit: &str) {
        let result = Cli::try_parse_from(["memtree", "run.yaml", "--node-limit", limit]);
        assert!(result.is_err());
    }
}
