use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("More argument required")]
    MissingArgument,

    #[error("Cannot parse `{0}` as {1}")]
    ParseArgument(String, String),

    #[error("Syntax Error: Cannot parse")]
    SyntaxError,

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Unknown directive: `{0}`")]
    UnknownDirective(String),
}
