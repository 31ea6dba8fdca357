//! Static checks over a command tree.
//!
//! Nothing here runs at parse time. Call [`assert_valid`] from a test so
//! that schema mistakes show up before any user input does.

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    decode::parse_bool,
    schema::count_tag,
    tags::{self, Tags},
    Command, DecodeError, Shape, TypeTag,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("command `{command}` has neither a handler nor subcommands")]
    MissingHandler { command: String },
    #[error("command `{command}` declares both positional arguments and subcommands")]
    ArgsAndSubcommands { command: String },
    #[error(
        "field `{field}` of command `{command}` has an invalid `{tag}` tag `{literal}`: {reason}"
    )]
    InvalidTag {
        command: String,
        field: String,
        tag: &'static str,
        literal: String,
        reason: String,
    },
    #[error("no value decoder for `{ty}` (field `{field}` of command `{command}`)")]
    MissingValueDecoder { command: String, field: String, ty: TypeTag },
    #[error("no valueless decoder for `{ty}` (field `{field}` of command `{command}`)")]
    MissingValuelessDecoder { command: String, field: String, ty: TypeTag },
    #[error("flag field `{field}` of command `{command}` is a fixed-size array")]
    ArrayFlag { command: String, field: String },
    #[error(
        "`subcommand_args` on field `{field}` of command `{command}` needs a `Vec<String>` positional"
    )]
    SubcommandArgsOnWrongType { command: String, field: String },
    #[error("empty short flag on field `{field}` of command `{command}`")]
    EmptyShortFlag { command: String, field: String },
    #[error("empty long flag on field `{field}` of command `{command}`")]
    EmptyLongFlag { command: String, field: String },
    #[error(
        "short flag `{short}` on field `{field}` of command `{command}` is more than one character"
    )]
    MultiCharShortFlag { command: String, field: String, short: String },
    #[error(
        "fields `{first}` and `{second}` of command `{command}` both use short flag `-{short}`"
    )]
    ConflictingShortFlags { command: String, short: char, first: String, second: String },
    #[error("fields `{first}` and `{second}` of command `{command}` both use long flag `--{long}`")]
    ConflictingLongFlags { command: String, long: String, first: String, second: String },
    #[error("subcommands `{first}` and `{second}` of command `{command}` both answer to `{name}`")]
    ConflictingSubcommands { command: String, name: String, first: String, second: String },
    #[error("default of field `{field}` of command `{command}` doesn't decode: {source}")]
    FailingDefault {
        command: String,
        field: String,
        #[source]
        source: DecodeError,
    },
    #[error(
        "command `{command}` has more than one variable-length argument: {}",
        .fields.join(", ")
    )]
    MultipleVariableArguments { command: String, fields: Vec<String> },
}

type Check = fn(&Command) -> Result<(), ValidationError>;

const COMMAND_CHECKS: &[Check] = &[check_handler, check_args_and_subcommands];

const FIELD_CHECKS: &[Check] = &[
    check_tag_literals,
    check_value_decoders,
    check_valueless_decoders,
    check_array_flags,
    check_subcommand_args,
    check_empty_short,
    check_empty_long,
    check_multi_char_short,
    check_conflicting_short,
    check_conflicting_long,
    check_defaults,
    check_variable_arguments,
];

/// Returns the first problem found in `cmd`, and in its descendants when
/// `recursive` is set.
pub fn validate(cmd: &Command, recursive: bool) -> Result<(), ValidationError> {
    for check in COMMAND_CHECKS.iter().chain(FIELD_CHECKS) {
        check(cmd)?;
    }
    if !cmd.get_subcommands().is_empty() {
        check_conflicting_subcommands(cmd)?;
        if recursive {
            for sub in cmd.get_subcommands() {
                validate(sub, true)?;
            }
        }
    }
    Ok(())
}

/// Panics with the first problem in the whole tree.
#[track_caller]
pub fn assert_valid(cmd: &Command) {
    if let Err(err) = validate(cmd, true) {
        panic!("invalid command tree: {err}")
    }
}

fn name(cmd: &Command) -> String {
    cmd.get_name().to_string()
}

/// Every field of both records, flags first.
fn fields(cmd: &Command) -> impl Iterator<Item = (&'static str, Shape, TypeTag, &Tags)> {
    let schema = cmd.get_schema();
    let flags = schema.flags.iter().map(|it| (it.field, it.shape, it.ty, &it.tags));
    let args = schema.args.iter().map(|it| (it.field, it.shape, it.ty, &it.tags));
    flags.chain(args)
}

fn check_handler(cmd: &Command) -> Result<(), ValidationError> {
    if !cmd.has_handler() && cmd.get_subcommands().is_empty() {
        return Err(ValidationError::MissingHandler { command: name(cmd) });
    }
    Ok(())
}

fn check_args_and_subcommands(cmd: &Command) -> Result<(), ValidationError> {
    if !cmd.get_schema().args.is_empty() && !cmd.get_subcommands().is_empty() {
        return Err(ValidationError::ArgsAndSubcommands { command: name(cmd) });
    }
    Ok(())
}

fn check_tag_literals(cmd: &Command) -> Result<(), ValidationError> {
    let invalid = |field: &str, tag: &'static str, literal: &str, reason: String| {
        ValidationError::InvalidTag {
            command: name(cmd),
            field: field.to_string(),
            tag,
            literal: literal.to_string(),
            reason,
        }
    };
    for flag in &cmd.get_schema().flags {
        if let Some(literal) = flag.tags.get(tags::TAKES_VAL) {
            if parse_bool(literal).is_none() {
                let reason = "expected `true` or `false`".to_string();
                return Err(invalid(flag.field, tags::TAKES_VAL, literal, reason));
            }
        }
    }
    for group in &cmd.get_schema().args {
        for tag in [tags::MIN, tags::MAX] {
            if let Some(literal) = group.tags.get(tag) {
                if count_tag(&group.tags, tag).is_none() {
                    let reason = "expected a non-negative integer".to_string();
                    return Err(invalid(group.field, tag, literal, reason));
                }
            }
        }
        if let (Some(min), Some(max)) =
            (count_tag(&group.tags, tags::MIN), count_tag(&group.tags, tags::MAX))
        {
            if min > max {
                let literal = group.tags.get(tags::MIN).unwrap_or_default();
                let reason = format!("{min} is greater than the maximum {max}");
                return Err(invalid(group.field, tags::MIN, literal, reason));
            }
        }
    }
    for (field, _, ty, field_tags) in fields(cmd) {
        for tag in [tags::MIN_VAL, tags::MAX_VAL] {
            let Some(literal) = field_tags.get(tag) else { continue };
            let Some(decode) = cmd.get_decoders().value_decoder(ty) else { continue };
            if let Err(err) = decode(literal, &Tags::new()) {
                return Err(invalid(field, tag, literal, err.to_string()));
            }
        }
    }
    Ok(())
}

fn check_value_decoders(cmd: &Command) -> Result<(), ValidationError> {
    let schema = cmd.get_schema();
    let flags = schema
        .flags
        .iter()
        .filter(|it| it.takes_value && !matches!(it.shape, Shape::Array(_)))
        .map(|it| (it.field, it.ty));
    let args = schema.args.iter().map(|it| (it.field, it.ty));
    for (field, ty) in flags.chain(args) {
        if cmd.get_decoders().value_decoder(ty).is_none() {
            return Err(ValidationError::MissingValueDecoder {
                command: name(cmd),
                field: field.to_string(),
                ty,
            });
        }
    }
    Ok(())
}

fn check_valueless_decoders(cmd: &Command) -> Result<(), ValidationError> {
    for flag in cmd.get_schema().flags.iter().filter(|it| !it.takes_value) {
        let scalar = flag.shape == Shape::Scalar;
        if !scalar || cmd.get_decoders().valueless_decoder(flag.ty).is_none() {
            return Err(ValidationError::MissingValuelessDecoder {
                command: name(cmd),
                field: flag.field.to_string(),
                ty: flag.ty,
            });
        }
    }
    Ok(())
}

fn check_array_flags(cmd: &Command) -> Result<(), ValidationError> {
    match cmd.get_schema().flags.iter().find(|it| matches!(it.shape, Shape::Array(_))) {
        Some(flag) => {
            Err(ValidationError::ArrayFlag { command: name(cmd), field: flag.field.to_string() })
        }
        None => Ok(()),
    }
}

fn check_subcommand_args(cmd: &Command) -> Result<(), ValidationError> {
    let schema = cmd.get_schema();
    let flags = schema.flags.iter().map(|it| (it.field, false, &it.tags));
    let args = schema.args.iter().map(|it| {
        (it.field, it.shape == Shape::Sequence && it.ty == TypeTag::String, &it.tags)
    });
    for (field, allowed, field_tags) in flags.chain(args) {
        if field_tags.has(tags::SUBCOMMAND_ARGS) && !allowed {
            return Err(ValidationError::SubcommandArgsOnWrongType {
                command: name(cmd),
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn check_empty_short(cmd: &Command) -> Result<(), ValidationError> {
    for flag in &cmd.get_schema().flags {
        if flag.tags.get(tags::SHORT) == Some("") {
            return Err(ValidationError::EmptyShortFlag {
                command: name(cmd),
                field: flag.field.to_string(),
            });
        }
    }
    Ok(())
}

fn check_empty_long(cmd: &Command) -> Result<(), ValidationError> {
    for flag in &cmd.get_schema().flags {
        if flag.long.is_empty() {
            return Err(ValidationError::EmptyLongFlag {
                command: name(cmd),
                field: flag.field.to_string(),
            });
        }
    }
    Ok(())
}

fn check_multi_char_short(cmd: &Command) -> Result<(), ValidationError> {
    for flag in &cmd.get_schema().flags {
        let Some(short) = flag.tags.get(tags::SHORT) else { continue };
        if short.chars().count() > 1 {
            return Err(ValidationError::MultiCharShortFlag {
                command: name(cmd),
                field: flag.field.to_string(),
                short: short.to_string(),
            });
        }
    }
    Ok(())
}

fn check_conflicting_short(cmd: &Command) -> Result<(), ValidationError> {
    let mut seen: HashMap<char, &str> = HashMap::new();
    for flag in &cmd.get_schema().flags {
        let Some(short) = flag.short else { continue };
        if let Some(first) = seen.insert(short, flag.field) {
            return Err(ValidationError::ConflictingShortFlags {
                command: name(cmd),
                short,
                first: first.to_string(),
                second: flag.field.to_string(),
            });
        }
    }
    Ok(())
}

fn check_conflicting_long(cmd: &Command) -> Result<(), ValidationError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for flag in &cmd.get_schema().flags {
        if let Some(first) = seen.insert(&flag.long, flag.field) {
            return Err(ValidationError::ConflictingLongFlags {
                command: name(cmd),
                long: flag.long.clone(),
                first: first.to_string(),
                second: flag.field.to_string(),
            });
        }
    }
    Ok(())
}

fn check_defaults(cmd: &Command) -> Result<(), ValidationError> {
    for flag in &cmd.get_schema().flags {
        let Some(literal) = flag.default else { continue };
        let Some(decode) = cmd.get_decoders().value_decoder(flag.ty) else { continue };
        if let Err(source) = decode(literal, &flag.tags) {
            return Err(ValidationError::FailingDefault {
                command: name(cmd),
                field: flag.field.to_string(),
                source,
            });
        }
    }
    Ok(())
}

fn check_variable_arguments(cmd: &Command) -> Result<(), ValidationError> {
    let fields: Vec<String> = cmd
        .get_schema()
        .args
        .iter()
        .filter(|it| !it.arity.is_fixed())
        .map(|it| it.field.to_string())
        .collect();
    if fields.len() > 1 {
        return Err(ValidationError::MultipleVariableArguments { command: name(cmd), fields });
    }
    Ok(())
}

fn check_conflicting_subcommands(cmd: &Command) -> Result<(), ValidationError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for sub in cmd.get_subcommands() {
        let aliases = sub.get_aliases().iter().map(String::as_str);
        let names = [sub.get_name()].into_iter().chain(aliases);
        for it in names {
            if let Some(first) = seen.insert(it, sub.get_name()) {
                return Err(ValidationError::ConflictingSubcommands {
                    command: name(cmd),
                    name: it.to_string(),
                    first: first.to_string(),
                    second: sub.get_name().to_string(),
                });
            }
        }
    }
    Ok(())
}
