mod flags;
mod validate;

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use argrec::{Command, Record};
use expect_test::Expect;

/// Runs a single-command parser over `args` and returns what the handler saw.
fn parse<F, A>(args: &str) -> Result<(F, A), String>
where
    F: Record + Send + Sync,
    A: Record + Send,
{
    parse_cmd(Command::new("prog"), args)
}

fn parse_cmd<F, A>(cmd: Command, args: &str) -> Result<(F, A), String>
where
    F: Record + Send + Sync,
    A: Record + Send,
{
    capture(|handler| cmd.handler::<F, A, _>(handler), args)
}

fn parse_with_defaults<F, A>(cmd: Command, defaults: F, args: &str) -> Result<(F, A), String>
where
    F: Record + Send + Sync,
    A: Record + Send,
{
    capture(|handler| cmd.handler_with_defaults::<F, A, _>(defaults, handler), args)
}

type Sink<F, A> = Box<dyn Fn(F, A) + Send + Sync>;

fn capture<F, A>(install: impl FnOnce(Sink<F, A>) -> Command, args: &str) -> Result<(F, A), String>
where
    F: Record + Send + Sync,
    A: Record + Send,
{
    let seen = Arc::new(Mutex::new(None));
    let cmd = install(Box::new({
        let seen = Arc::clone(&seen);
        move |flags: F, args: A| *seen.lock().unwrap() = Some((flags, args))
    }));
    argrec::assert_valid(&cmd);
    output(&cmd, args).map_err(|err| err.to_string())?;
    let res = seen.lock().unwrap().take();
    Ok(res.expect("handler didn't run"))
}

/// Evaluates `cmd` and returns whatever it printed.
fn output(cmd: &Command, args: &str) -> argrec::Result<String> {
    let mut buf = Vec::new();
    let tokens = std::iter::once(cmd.get_name()).chain(args.split_ascii_whitespace());
    cmd.eval_with(tokens, &[], &mut buf)?;
    Ok(String::from_utf8(buf).unwrap())
}

fn check_flags<F>(args: &str, expect: Expect)
where
    F: Record + Send + Sync + fmt::Debug,
{
    match parse::<F, ()>(args) {
        Ok((flags, ())) => expect.assert_debug_eq(&flags),
        Err(err) => expect.assert_eq(&err),
    }
}

fn check_args<A>(args: &str, expect: Expect)
where
    A: Record + Send + fmt::Debug,
{
    match parse::<(), A>(args) {
        Ok(((), args)) => expect.assert_debug_eq(&args),
        Err(err) => expect.assert_eq(&err),
    }
}

fn check_output(cmd: &Command, args: &str, expect: Expect) {
    match output(cmd, args) {
        Ok(it) => expect.assert_eq(&it),
        Err(err) => expect.assert_eq(&format!("error: {err}")),
    }
}
