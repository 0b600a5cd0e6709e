use derive_more::Display;
use hashlink::LinkedHashMap;
use saphyr::{Scalar, Yaml};
use snafu::prelude::*;

use crate::tree::Status;

use super::{
    InvalidStepSnafu, MissingContentsSnafu, MissingPathSnafu, ScriptError, UnexpectedArgumentSnafu,
    UnknownOperationSnafu, UnknownStatusSnafu,
};

/// One call against the tree engine.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Operation {
    #[display("init")]
    Init,
    #[display("destroy")]
    Destroy,
    #[display("insert_dir {path}")]
    InsertDir { path: String },
    #[display("insert_file {path}")]
    InsertFile { path: String, contents: String },
    #[display("contains_dir {path}")]
    ContainsDir { path: String },
    #[display("contains_file {path}")]
    ContainsFile { path: String },
    #[display("remove_dir {path}")]
    RemoveDir { path: String },
    #[display("remove_file {path}")]
    RemoveFile { path: String },
    #[display("get_contents {path}")]
    GetContents { path: String },
    #[display("replace_contents {path}")]
    ReplaceContents { path: String, contents: String },
    #[display("stat {path}")]
    Stat { path: String },
    #[display("serialize")]
    Serialize,
    #[display("check")]
    Check,
}

/// An operation together with the status the script expects it to end in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub operation: Operation,
    pub expect: Option<Status>,
}

/// Arguments attached to an operation name, before they are matched
/// against what the operation needs.
#[derive(Debug, Default)]
struct Arguments {
    path: Option<String>,
    contents: Option<String>,
    expect: Option<Status>,
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(name.into()))
}

fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::Value(Scalar::String(text)) => Some(text.to_string()),
        Yaml::Value(Scalar::Integer(number)) => Some(number.to_string()),
        _ => None,
    }
}

impl Arguments {
    fn from_yaml(index: usize, value: &Yaml) -> Result<Self, ScriptError> {
        if let Yaml::Value(Scalar::Null) = value {
            return Ok(Self::default());
        }
        if let Some(path) = scalar_text(value) {
            return Ok(Self {
                path: Some(path),
                ..Self::default()
            });
        }

        let fields = value.as_mapping().context(InvalidStepSnafu { index })?;
        Self::from_mapping(index, fields)
    }

    fn from_mapping(index: usize, fields: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, ScriptError> {
        let text_field = |name: &'static str| -> Result<Option<String>, ScriptError> {
            match fields.get(&key(name)) {
                None => Ok(None),
                Some(value) => scalar_text(value)
                    .map(Some)
                    .context(InvalidStepSnafu { index }),
            }
        };

        let expect = text_field("expect")?
            .map(|name| name.parse::<Status>())
            .transpose()
            .context(UnknownStatusSnafu { index })?;

        Ok(Self {
            path: text_field("path")?,
            contents: text_field("contents")?,
            expect,
        })
    }
}

impl Step {
    /// Parses one entry of the `operations` list.
    ///
    /// An entry is either a bare operation name or a single-key mapping from
    /// the name to a path or to a mapping of arguments.
    pub fn from_yaml(index: usize, entry: &Yaml) -> Result<Self, ScriptError> {
        let (name, arguments) = match entry {
            Yaml::Value(Scalar::String(name)) => (name.to_string(), Arguments::default()),
            Yaml::Mapping(mapping) if mapping.len() == 1 => {
                let Some((name, value)) = mapping.iter().next() else {
                    return InvalidStepSnafu { index }.fail();
                };
                let name = name.as_str().context(InvalidStepSnafu { index })?;
                (name.to_string(), Arguments::from_yaml(index, value)?)
            }
            _ => return InvalidStepSnafu { index }.fail(),
        };

        let Arguments {
            path,
            contents,
            expect,
        } = arguments;

        let require_path = |path: Option<String>| {
            path.context(MissingPathSnafu {
                index,
                operation: name.as_str(),
            })
        };
        let require_contents = |contents: Option<String>| {
            contents.context(MissingContentsSnafu {
                index,
                operation: name.as_str(),
            })
        };

        let operation = match name.as_str() {
            "init" => Operation::Init,
            "destroy" => Operation::Destroy,
            "serialize" => Operation::Serialize,
            "check" => Operation::Check,
            "insert_dir" => Operation::InsertDir {
                path: require_path(path.clone())?,
            },
            "insert_file" => Operation::InsertFile {
                path: require_path(path.clone())?,
                contents: contents.clone().unwrap_or_default(),
            },
            "contains_dir" => Operation::ContainsDir {
                path: require_path(path.clone())?,
            },
            "contains_file" => Operation::ContainsFile {
                path: require_path(path.clone())?,
            },
            "remove_dir" => Operation::RemoveDir {
                path: require_path(path.clone())?,
            },
            "remove_file" => Operation::RemoveFile {
                path: require_path(path.clone())?,
            },
            "get_contents" => Operation::GetContents {
                path: require_path(path.clone())?,
            },
            "replace_contents" => Operation::ReplaceContents {
                path: require_path(path.clone())?,
                contents: require_contents(contents.clone())?,
            },
            "stat" => Operation::Stat {
                path: require_path(path.clone())?,
            },
            _ => {
                return UnknownOperationSnafu {
                    index,
                    name: name.clone(),
                }
                .fail();
            }
        };

        if operation.path().is_none() {
            ensure!(
                path.is_none(),
                UnexpectedArgumentSnafu {
                    index,
                    operation: name.as_str(),
                    argument: "path",
                }
            );
        }
        if !operation.takes_contents() {
            ensure!(
                contents.is_none(),
                UnexpectedArgumentSnafu {
                    index,
                    operation: name.as_str(),
                    argument: "contents",
                }
            );
        }

        Ok(Step { operation, expect })
    }
}

impl Operation {
    /// The path the operation targets, if it takes one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Operation::Init | Operation::Destroy | Operation::Serialize | Operation::Check => None,
            Operation::InsertDir { path }
            | Operation::InsertFile { path, .. }
            | Operation::ContainsDir { path }
            | Operation::ContainsFile { path }
            | Operation::RemoveDir { path }
            | Operation::RemoveFile { path }
            | Operation::GetContents { path }
            | Operation::ReplaceContents { path, .. }
            | Operation::Stat { path } => Some(path),
        }
    }

    fn takes_contents(&self) -> bool {
        matches!(
            self,
            Operation::InsertFile { .. } | Operation::ReplaceContents { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use saphyr::LoadableYamlNode;

    fn parse(source: &str) -> Result<Step, ScriptError> {
        let documents = Yaml::load_from_str(source).unwrap();
        Step::from_yaml(0, &documents[0])
    }

    #[rstest]
    #[case("init", Operation::Init)]
    #[case("destroy", Operation::Destroy)]
    #[case("serialize", Operation::Serialize)]
    #[case("check", Operation::Check)]
    #[case("insert_dir: a/b", Operation::InsertDir { path: "a/b".into() })]
    #[case("stat: a/b", Operation::Stat { path: "a/b".into() })]
    #[case("remove_file: 2024", Operation::RemoveFile { path: "2024".into() })]
    #[case(
        "insert_file: { path: a/x.txt, contents: hello }",
        Operation::InsertFile { path: "a/x.txt".into(), contents: "hello".into() }
    )]
    #[case(
        "insert_file: a/x.txt",
        Operation::InsertFile { path: "a/x.txt".into(), contents: String::new() }
    )]
    #[case(
        "replace_contents: { path: a/x.txt, contents: bye }",
        Operation::ReplaceContents { path: "a/x.txt".into(), contents: "bye".into() }
    )]
    fn parses_operations(#[case] source: &str, #[case] expected: Operation) {
        let step = parse(source).unwrap();
        assert_eq!(step.operation, expected);
        assert_eq!(step.expect, None);
    }

    #[rstest]
    #[case("insert_dir: { path: a, expect: already_in_tree }", Status::AlreadyInTree)]
    #[case("serialize: { expect: not_initialized }", Status::NotInitialized)]
    #[case("contains_dir: { path: a, expect: ok }", Status::Success)]
    fn parses_expectations(#[case] source: &str, #[case] expected: Status) {
        assert_eq!(parse(source).unwrap().expect, Some(expected));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        assert!(matches!(
            parse("rename: a"),
            Err(ScriptError::UnknownOperation { index: 0, name }) if name == "rename"
        ));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(matches!(
            parse("insert_dir: { path: a, expect: exploded }"),
            Err(ScriptError::UnknownStatus { index: 0, .. })
        ));
    }

    #[rstest]
    #[case("insert_dir")]
    #[case("stat: { expect: no_such_path }")]
    fn path_is_required(#[case] source: &str) {
        assert!(matches!(parse(source), Err(ScriptError::MissingPath { .. })));
    }

    #[test]
    fn replacement_needs_contents() {
        assert!(matches!(
            parse("replace_contents: a.txt"),
            Err(ScriptError::MissingContents { .. })
        ));
    }

    #[rstest]
    #[case("check: a/b", "path")]
    #[case("stat: { path: a, contents: x }", "contents")]
    fn stray_arguments_are_rejected(#[case] source: &str, #[case] expected: &str) {
        assert!(matches!(
            parse(source),
            Err(ScriptError::UnexpectedArgument { argument, .. }) if argument == expected
        ));
    }

    #[rstest]
    #[case("- a\n- b")]
    #[case("{ insert_dir: a, stat: a }")]
    #[case("insert_dir: [a, b]")]
    #[case("42")]
    fn malformed_steps_are_rejected(#[case] source: &str) {
        assert!(matches!(
            parse(source),
            Err(ScriptError::InvalidStep { index: 0 })
        ));
    }

    #[test]
    fn operations_display_their_target() {
        let operation = Operation::InsertFile {
            path: "a/b.txt".into(),
            contents: "x".into(),
        };
        assert_eq!(operation.to_string(), "insert_file a/b.txt");
        assert_eq!(operation.path(), Some("a/b.txt"));
        assert_eq!(Operation::Check.path(), None);
    }
}
