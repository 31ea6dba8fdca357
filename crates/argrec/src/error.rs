use std::io;

use thiserror::Error;

use crate::TypeTag;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can be wrong with the tokens of one `eval` call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected subcommand")]
    ExpectedSubcommand,
    #[error("invalid subcommand `{0}`")]
    InvalidSubcommand(String),
    #[error("unexpected flag `{0}`")]
    UnexpectedFlag(String),
    #[error("expected a value for flag `{0}`")]
    ExpectedFlagValue(String),
    #[error("unexpected value for flag `{flag}`: `{value}`")]
    UnexpectedFlagValue { flag: String, value: String },
    #[error("error decoding flag `{flag}`: {source}")]
    DecodeFlag {
        flag: String,
        #[source]
        source: DecodeError,
    },
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
    #[error("expected a value for argument `{0}`")]
    ExpectedArgumentValue(String),
    #[error("error decoding argument `{name}`: {source}")]
    DecodeArgument {
        name: String,
        #[source]
        source: DecodeError,
    },
    #[error("can't write output: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    pub fn exit(self) -> ! {
        eprintln!("{self}");
        std::process::exit(1)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("can't decode `{literal}` as {ty}: {cause}")]
pub struct DecodeError {
    pub literal: String,
    pub ty: TypeTag,
    pub cause: DecodeCause,
}

impl DecodeError {
    pub fn new(literal: &str, ty: TypeTag, cause: DecodeCause) -> DecodeError {
        DecodeError { literal: literal.to_string(), ty, cause }
    }

    pub fn invalid(literal: &str, ty: TypeTag, msg: impl ToString) -> DecodeError {
        DecodeError::new(literal, ty, DecodeCause::Invalid(msg.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeCause {
    #[error("{0}")]
    Invalid(String),
    #[error("{value} is less than the minimum {min}")]
    BelowMin { value: String, min: String },
    #[error("{value} is greater than the maximum {max}")]
    AboveMax { value: String, max: String },
    #[error("{value} can't be incremented any further")]
    Overflow { value: String },
    #[error("path doesn't exist: {0}")]
    MissingPath(String),
    #[error("invalid `{tag}` bound `{literal}`")]
    InvalidBound { tag: &'static str, literal: String },
}
