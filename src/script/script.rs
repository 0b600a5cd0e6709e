use std::path::Path;

use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::script::{
    MalformedScriptSnafu, NotUtf8Snafu, OperationsNotListSnafu, ParseSnafu, ReadSnafu,
    ScriptError, Step, TopLevelNotMapSnafu,
};

/// An ordered list of steps to run against a tree.
///
/// File contents named by the steps live here, so a tree driven by a script
/// borrows its contents from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub async fn read(path: &Path) -> Result<Self, ScriptError> {
        debug!("Reading script file: {}", path.display());
        let file_path = path.display().to_string();
        let bytes = compio::fs::read(path)
            .await
            .context(ReadSnafu { file_path: &file_path })?;
        debug!("Read script file: {} bytes", bytes.len());

        let source = String::from_utf8(bytes).context(NotUtf8Snafu { file_path })?;
        source.as_str().try_into()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

impl TryFrom<&str> for Script {
    type Error = ScriptError;

    fn try_from(source: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(source).context(ParseSnafu)?;
        let document = documents.first().context(MalformedScriptSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let steps = match top_level.get(&Yaml::Value(Scalar::String("operations".into()))) {
            None | Some(Yaml::Value(Scalar::Null)) => Vec::new(),
            Some(operations) => operations
                .as_sequence()
                .context(OperationsNotListSnafu)?
                .iter()
                .enumerate()
                .map(|(index, entry)| Step::from_yaml(index, entry))
                .collect::<Result<Vec<_>, _>>()?,
        };

        debug!("Parsed {} script steps", steps.len());
        Ok(Script { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Operation;
    use crate::tree::Status;
    use std::io::Write as _;

    #[compio::test]
    async fn read_fails_on_missing_file() {
        let result = Script::read(Path::new("does-not-exist.yaml")).await;
        assert!(matches!(result, Err(ScriptError::ReadError { .. })));
    }

    #[compio::test]
    async fn read_parses_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "operations:\n  - insert_dir: a/b\n  - serialize").unwrap();

        let script = Script::read(file.path()).await.unwrap();

        assert_eq!(
            script.steps(),
            &[
                Step {
                    operation: Operation::InsertDir { path: "a/b".into() },
                    expect: None,
                },
                Step {
                    operation: Operation::Serialize,
                    expect: None,
                },
            ]
        );
    }

    #[compio::test]
    async fn read_rejects_binary_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();

        let result = Script::read(file.path()).await;

        assert!(matches!(result, Err(ScriptError::NotUtf8 { .. })));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result = Script::try_from("operations: [unclosed");
        assert!(matches!(result, Err(ScriptError::ParseError { .. })));
    }

    #[test]
    fn empty_source_is_malformed() {
        assert!(matches!(
            Script::try_from(""),
            Err(ScriptError::MalformedScript)
        ));
    }

    #[test]
    fn top_level_must_be_a_mapping() {
        assert!(matches!(
            Script::try_from("- init"),
            Err(ScriptError::TopLevelNotMap)
        ));
    }

    #[test]
    fn operations_must_be_a_list() {
        assert!(matches!(
            Script::try_from("operations: { init: ~ }"),
            Err(ScriptError::OperationsNotList)
        ));
    }

    #[test]
    fn missing_or_empty_operations_mean_no_steps() {
        assert!(Script::try_from("name: nothing").unwrap().steps().is_empty());
        assert!(Script::try_from("operations:").unwrap().steps().is_empty());
        assert!(Script::try_from("operations: []").unwrap().steps().is_empty());
    }

    #[test]
    fn bad_step_reports_its_position() {
        let result = Script::try_from("operations:\n  - init\n  - check\n  - explode: a");
        assert!(matches!(
            result,
            Err(ScriptError::UnknownOperation { index: 2, .. })
        ));
    }

    #[test]
    fn full_script_keeps_order_and_expectations() {
        let source = r#"
operations:
  - insert_dir: a/b/c
  - insert_file: { path: a/b/d.txt, contents: "hello" }
  - insert_dir: { path: a/b/c, expect: already_in_tree }
  - contains_dir: a/b
  - get_contents: a/b/d.txt
  - replace_contents: { path: a/b/d.txt, contents: "bye" }
  - stat: a/b/d.txt
  - remove_file: a/b/d.txt
  - remove_dir: a/b
  - serialize
  - check
  - destroy
  - init
"#;
        let script = Script::try_from(source).unwrap();

        assert_eq!(script.len(), 13);
        assert_eq!(script.steps()[2].expect, Some(Status::AlreadyInTree));
        assert_eq!(
            script.steps()[5].operation,
            Operation::ReplaceContents {
                path: "a/b/d.txt".into(),
                contents: "bye".into()
            }
        );
        assert_eq!(script.steps()[12].operation, Operation::Init);
    }
}
