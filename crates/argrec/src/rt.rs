//! The token binder: classifies tokens and binds them into a command's
//! flags and args records.

use tracing::{debug, trace};

use crate::{
    decode::{ValueDecoder, ValuelessDecoder},
    defaults,
    schema::{ArgGroupSpec, FlagSpec},
    Command, Error, Record, Result, TypeTag, Value,
};

/// Reversed token cursor.
pub(crate) struct Parser {
    positional_only: bool,
    rargs: Vec<String>,
}

impl Parser {
    /// `args[0]` is the invoked name and is dropped.
    pub(crate) fn new(mut args: Vec<String>) -> Parser {
        args.reverse();
        let mut res = Parser { positional_only: false, rargs: args };
        let _progn = res.next();
        res
    }

    fn next(&mut self) -> Option<String> {
        self.rargs.pop()
    }

    fn push_back(&mut self, arg: String) {
        self.rargs.push(arg)
    }

    fn next_value(&mut self, flag: &str) -> Result<String> {
        self.next().ok_or_else(|| Error::ExpectedFlagValue(flag.to_string()))
    }

    fn into_rest(self) -> Vec<String> {
        let mut res = self.rargs;
        res.reverse();
        res
    }
}

pub(crate) enum Outcome<F, A> {
    Bound { flags: F, args: A },
    /// A child was selected; `rest` starts with the child's name.
    Subcommand { flags: F, index: usize, rest: Vec<String> },
    Help,
    HelpFor(usize),
    Version,
}

enum Stop {
    Subcommand(usize),
    Help,
    HelpFor(usize),
    Version,
}

pub(crate) struct ParseState<'a, F, A> {
    cmd: &'a Command,
    fallback: Option<&'a F>,
    p: Parser,
    flags: F,
    args: A,
    set: Vec<bool>,
    group: usize,
    counts: Vec<usize>,
}

impl<'a, F: Record, A: Record> ParseState<'a, F, A> {
    pub(crate) fn new(cmd: &'a Command, tokens: Vec<String>, fallback: Option<&'a F>) -> Self {
        let schema = cmd.get_schema();
        ParseState {
            cmd,
            fallback,
            p: Parser::new(tokens),
            flags: F::default(),
            args: A::default(),
            set: vec![false; schema.flags.len()],
            group: 0,
            counts: vec![0; schema.args.len()],
        }
    }

    pub(crate) fn run(mut self) -> Result<Outcome<F, A>> {
        while let Some(arg) = self.p.next() {
            if let Some(stop) = self.step(arg)? {
                return self.stop(stop);
            }
        }
        if !self.cmd.get_subcommands().is_empty() {
            return Err(Error::ExpectedSubcommand);
        }
        for (group, count) in self.cmd.get_schema().args.iter().zip(&self.counts) {
            if *count < group.arity.min() {
                return Err(Error::ExpectedArgumentValue(group.field.to_string()));
            }
        }
        self.resolve_defaults()?;
        Ok(Outcome::Bound { flags: self.flags, args: self.args })
    }

    fn stop(mut self, stop: Stop) -> Result<Outcome<F, A>> {
        let res = match stop {
            Stop::Subcommand(index) => {
                self.resolve_defaults()?;
                Outcome::Subcommand { flags: self.flags, index, rest: self.p.into_rest() }
            }
            Stop::Help => Outcome::Help,
            Stop::HelpFor(index) => Outcome::HelpFor(index),
            Stop::Version => Outcome::Version,
        };
        Ok(res)
    }

    fn resolve_defaults(&mut self) -> Result<()> {
        defaults::resolve(self.cmd, &mut self.flags, &self.set, self.fallback)
    }

    fn step(&mut self, arg: String) -> Result<Option<Stop>> {
        if !self.p.positional_only {
            if arg == "--" {
                trace!("`--`, switching to positional-only mode");
                self.p.positional_only = true;
                return Ok(None);
            }
            if let Some(body) = arg.strip_prefix("--") {
                trace!(flag = body, "long flag");
                return self.long_flag(body);
            }
            if arg.len() > 1 && arg.starts_with('-') {
                trace!(cluster = &arg[1..], "short flags");
                return self.short_cluster(&arg);
            }
        }
        if !self.cmd.get_subcommands().is_empty() {
            return self.subcommand(arg);
        }
        trace!(token = %arg, "positional");
        self.positional(arg)
    }

    fn long_flag(&mut self, body: &str) -> Result<Option<Stop>> {
        let cmd = self.cmd;
        let (name, inline) = split_value(body);
        let Some(flag) = cmd.get_schema().long(name) else {
            return match name {
                "help" => Ok(Some(Stop::Help)),
                "version" if cmd.get_version().is_some() => Ok(Some(Stop::Version)),
                _ => Err(Error::UnexpectedFlag(format!("--{name}"))),
            };
        };
        let display = format!("--{name}");
        if flag.takes_value {
            let literal = match inline {
                Some(it) => it.to_string(),
                None => self.p.next_value(&display)?,
            };
            self.apply_value(flag, &display, &literal)?;
        } else {
            if let Some(value) = inline {
                return Err(Error::UnexpectedFlagValue { flag: display, value: value.to_string() });
            }
            self.apply_valueless(flag, &display)?;
        }
        Ok(None)
    }

    fn short_cluster(&mut self, token: &str) -> Result<Option<Stop>> {
        let cmd = self.cmd;
        let body = &token[1..];
        let (cluster, inline) = split_value(body);
        if cluster.is_empty() {
            return Err(Error::UnexpectedFlag(token.to_string()));
        }
        let mut chars = cluster.char_indices().peekable();
        while let Some((idx, c)) = chars.next() {
            let last = chars.peek().is_none();
            let Some(flag) = cmd.get_schema().short(c) else {
                return match c {
                    'h' => Ok(Some(Stop::Help)),
                    'v' if cmd.get_version().is_some() => Ok(Some(Stop::Version)),
                    _ => Err(Error::UnexpectedFlag(format!("-{c}"))),
                };
            };
            let display = format!("-{c}");
            if flag.takes_value {
                let literal = if !last {
                    cluster[idx + c.len_utf8()..].to_string()
                } else {
                    match inline {
                        Some(it) => it.to_string(),
                        None => self.p.next_value(&display)?,
                    }
                };
                self.apply_value(flag, &display, &literal)?;
                return Ok(None);
            }
            if let (true, Some(value)) = (last, inline) {
                return Err(Error::UnexpectedFlagValue { flag: display, value: value.to_string() });
            }
            self.apply_valueless(flag, &display)?;
        }
        Ok(None)
    }

    fn apply_value(&mut self, flag: &FlagSpec, display: &str, literal: &str) -> Result<()> {
        let decode = value_decoder(self.cmd, flag.ty, flag.field);
        let value = decode(literal, &flag.tags)
            .map_err(|source| Error::DecodeFlag { flag: display.to_string(), source })?;
        store(&mut self.flags, flag.slot, 0, value, flag.field);
        self.set[flag.slot] = true;
        Ok(())
    }

    fn apply_valueless(&mut self, flag: &FlagSpec, display: &str) -> Result<()> {
        let decode = valueless_decoder(self.cmd, flag.ty, flag.field);
        let Some(current) = self.flags.current(flag.slot) else {
            panic!("valueless flag `{display}` is bound to a field without a current value");
        };
        let value = decode(&current, &flag.tags)
            .map_err(|source| Error::DecodeFlag { flag: display.to_string(), source })?;
        store(&mut self.flags, flag.slot, 0, value, flag.field);
        self.set[flag.slot] = true;
        Ok(())
    }

    fn subcommand(&mut self, arg: String) -> Result<Option<Stop>> {
        let cmd = self.cmd;
        if let Some(index) = cmd.find_subcommand(&arg) {
            self.p.push_back(arg);
            return Ok(Some(Stop::Subcommand(index)));
        }
        if arg == "help" {
            let target = self.p.next().and_then(|name| cmd.find_subcommand(&name));
            if let Some(extra) = self.p.next() {
                return Err(Error::UnexpectedArgument(extra));
            }
            return Ok(Some(match target {
                Some(index) => Stop::HelpFor(index),
                None => Stop::Help,
            }));
        }
        Err(Error::InvalidSubcommand(arg))
    }

    fn positional(&mut self, arg: String) -> Result<Option<Stop>> {
        let cmd = self.cmd;
        let groups = &cmd.get_schema().args;
        if groups.is_empty() && arg == "help" {
            return Ok(Some(Stop::Help));
        }
        loop {
            let Some(group) = groups.get(self.group) else {
                return Err(Error::UnexpectedArgument(arg));
            };
            let count = self.counts[self.group];
            if group.arity.max().is_some_and(|max| count >= max) {
                self.group += 1;
                continue;
            }
            match self.decode_arg(group, &arg) {
                Ok(value) => {
                    store(&mut self.args, group.slot, count, value, group.field);
                    self.counts[self.group] += 1;
                    if group.passthrough && !self.p.positional_only {
                        debug!(group = group.field, "passing the remaining tokens through");
                        self.p.positional_only = true;
                    }
                    return Ok(None);
                }
                Err(source) if count < group.arity.min() => {
                    return Err(Error::DecodeArgument { name: group.field.to_string(), source });
                }
                Err(err) => {
                    debug!(
                        group = group.field,
                        token = %arg,
                        %err,
                        "retiring group after a failed decode"
                    );
                    self.group += 1;
                }
            }
        }
    }

    fn decode_arg(&self, group: &ArgGroupSpec, arg: &str) -> Result<Value, crate::DecodeError> {
        value_decoder(self.cmd, group.ty, group.field)(arg, &group.tags)
    }
}

fn split_value(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

pub(crate) fn value_decoder(cmd: &Command, ty: TypeTag, field: &str) -> ValueDecoder {
    match cmd.get_decoders().value_decoder(ty) {
        Some(it) => it,
        None => missing_decoder("value", ty, field),
    }
}

fn valueless_decoder(cmd: &Command, ty: TypeTag, field: &str) -> ValuelessDecoder {
    match cmd.get_decoders().valueless_decoder(ty) {
        Some(it) => it,
        None => missing_decoder("valueless", ty, field),
    }
}

fn missing_decoder(kind: &str, ty: TypeTag, field: &str) -> ! {
    panic!(
        "no {kind} decoder for `{ty}` (field `{field}`); \
         run `argrec::assert_valid` on the command tree in a test"
    )
}

pub(crate) fn store<R: Record>(
    record: &mut R,
    slot: usize,
    index: usize,
    value: Value,
    field: &str,
) {
    if let Err(value) = record.bind(slot, index, value) {
        panic!(
            "decoder produced {value:?} for field `{field}` of another type; \
             run `argrec::assert_valid` on the command tree in a test"
        )
    }
}
