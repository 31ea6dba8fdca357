use std::{
    fmt,
    io::{self, Write},
    marker::PhantomData,
    path::Path,
};

use tracing::debug;

use crate::{
    help,
    rt::{Outcome, ParseState},
    Decoders, Error, Record, Result, Schema,
};

/// A node of the command tree.
///
/// Built once, then shared read-only: every `eval` call keeps its parse
/// state to itself.
///
/// ```
/// use argrec::{Command, Record};
///
/// #[derive(Default, Record)]
/// struct Flags {
///     #[arg(short = "n")]
///     dry_run: bool,
/// }
///
/// #[derive(Default, Record)]
/// struct Args {
///     path: String,
/// }
///
/// let cmd = Command::new("rm").handler(|flags: Flags, args: Args| {
///     assert!(flags.dry_run);
///     assert_eq!(args.path, "a.txt");
/// });
/// argrec::assert_valid(&cmd);
/// cmd.eval(["rm", "-n", "a.txt"], &[]).unwrap();
/// ```
pub struct Command {
    name: String,
    aliases: Vec<String>,
    about: Option<String>,
    author: Option<String>,
    version: Option<String>,
    decoders: Decoders,
    subcommands: Vec<Command>,
    schema: Schema,
    handler: Option<Box<dyn Handler>>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Command {
        Command {
            name: name.into(),
            aliases: Vec::new(),
            about: None,
            author: None,
            version: None,
            decoders: Decoders::new(),
            subcommands: Vec::new(),
            schema: Schema::default(),
            handler: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Command {
        self.aliases.push(alias.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Command {
        self.about = Some(about.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Command {
        self.author = Some(author.into());
        self
    }

    /// Also enables `-v`/`--version`.
    pub fn version(mut self, version: impl Into<String>) -> Command {
        self.version = Some(version.into());
        self
    }

    pub fn decoders(mut self, decoders: Decoders) -> Command {
        self.decoders = decoders;
        self
    }

    pub fn subcommand(mut self, cmd: Command) -> Command {
        self.subcommands.push(cmd);
        self
    }

    /// Sets the handler; its parameter types define the flags and args
    /// schemas. Use `()` for an empty record.
    pub fn handler<F, A, H>(self, handler: H) -> Command
    where
        F: Record + Send + Sync,
        A: Record,
        H: Fn(F, A) + Send + Sync + 'static,
    {
        self.install(Leaf { handler, fallback: None, _records: PhantomData })
    }

    /// Like [`Command::handler`]; flags left unset that have no `default`
    /// literal are copied from `defaults`.
    pub fn handler_with_defaults<F, A, H>(self, defaults: F, handler: H) -> Command
    where
        F: Record + Send + Sync,
        A: Record,
        H: Fn(F, A) + Send + Sync + 'static,
    {
        self.install(Leaf { handler, fallback: Some(defaults), _records: PhantomData })
    }

    fn install<F, A, H>(mut self, leaf: Leaf<F, A, H>) -> Command
    where
        F: Record + Send + Sync,
        A: Record,
        H: Fn(F, A) + Send + Sync + 'static,
    {
        self.schema = Schema::derive::<F, A>();
        self.handler = Some(Box::new(leaf));
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn get_about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn get_author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn get_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn get_subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub fn get_schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get_decoders(&self) -> &Decoders {
        &self.decoders
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Index of the child named or aliased `name`.
    pub fn find_subcommand(&self, name: &str) -> Option<usize> {
        self.subcommands
            .iter()
            .position(|it| it.name == name || it.aliases.iter().any(|alias| alias == name))
    }

    /// Parses `tokens` (`tokens[0]` is the invoked name) and runs the
    /// handlers of the selected chain. `parents` prefixes the usage line.
    pub fn eval<I>(&self, tokens: I, parents: &[&str]) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let stdout = io::stdout();
        self.eval_with(tokens, parents, &mut stdout.lock())
    }

    /// Like [`Command::eval`], writing help and version output to `out`.
    pub fn eval_with<I, W>(&self, tokens: I, parents: &[&str], out: &mut W) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        W: Write + ?Sized,
    {
        let mut tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut chain: Vec<&str> = parents.to_vec();
        let mut cmd = self;
        let mut pending = Vec::new();
        debug!(command = %self.name, tokens = tokens.len().saturating_sub(1), "eval");

        loop {
            match cmd.entry().bind(cmd, tokens)? {
                Binding::Run(run) => {
                    pending.push(run);
                    break;
                }
                Binding::Descend { run, index, rest } => {
                    pending.push(run);
                    chain.push(&cmd.name);
                    cmd = &cmd.subcommands[index];
                    debug!(subcommand = %cmd.name, "descending");
                    tokens = rest;
                }
                Binding::Help => return Ok(help::render(cmd, &chain, out)?),
                Binding::HelpFor(index) => {
                    chain.push(&cmd.name);
                    return Ok(help::render(&cmd.subcommands[index], &chain, out)?);
                }
                Binding::Version => {
                    writeln!(out, "{}", cmd.version.as_deref().unwrap_or_default())?;
                    return Ok(());
                }
            }
        }

        for run in pending {
            run();
        }
        Ok(())
    }

    /// Dispatches to the child named like the basename of `tokens[0]`.
    pub fn eval_multicall<I>(&self, tokens: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let invoked = tokens
            .first()
            .and_then(|it| Path::new(it).file_name())
            .map(|it| it.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.find_subcommand(&invoked) {
            Some(index) => self.subcommands[index].eval(tokens, &[]),
            None => Err(Error::InvalidSubcommand(invoked)),
        }
    }

    /// Evaluates the process arguments, exiting with status 1 on error.
    pub fn run(&self) {
        if let Err(err) = self.eval(std::env::args(), &[]) {
            err.exit()
        }
    }

    fn entry(&self) -> &dyn Handler {
        match &self.handler {
            Some(it) => it.as_ref(),
            None => &NO_HANDLER,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("version", &self.version)
            .field("schema", &self.schema)
            .field("subcommands", &self.subcommands)
            .field("has_handler", &self.has_handler())
            .finish()
    }
}

type Thunk<'a> = Box<dyn FnOnce() + 'a>;

enum Binding<'a> {
    Run(Thunk<'a>),
    Descend { run: Thunk<'a>, index: usize, rest: Vec<String> },
    Help,
    HelpFor(usize),
    Version,
}

trait Handler: Send + Sync {
    fn bind<'a>(&'a self, cmd: &'a Command, tokens: Vec<String>) -> Result<Binding<'a>>;
}

struct Leaf<F, A, H> {
    handler: H,
    fallback: Option<F>,
    _records: PhantomData<fn(F, A)>,
}

impl<F, A, H> Handler for Leaf<F, A, H>
where
    F: Record + Send + Sync,
    A: Record,
    H: Fn(F, A) + Send + Sync,
{
    fn bind<'a>(&'a self, cmd: &'a Command, tokens: Vec<String>) -> Result<Binding<'a>> {
        let state = ParseState::<F, A>::new(cmd, tokens, self.fallback.as_ref());
        let res = match state.run()? {
            Outcome::Bound { flags, args } => {
                Binding::Run(Box::new(move || (self.handler)(flags, args)))
            }
            Outcome::Subcommand { flags, index, rest } => Binding::Descend {
                run: Box::new(move || (self.handler)(flags, A::default())),
                index,
                rest,
            },
            Outcome::Help => Binding::Help,
            Outcome::HelpFor(index) => Binding::HelpFor(index),
            Outcome::Version => Binding::Version,
        };
        Ok(res)
    }
}

fn no_op((): (), (): ()) {}

/// Stands in for branches declared without a handler.
static NO_HANDLER: Leaf<(), (), fn((), ())> =
    Leaf { handler: no_op as fn((), ()), fallback: None, _records: PhantomData };
