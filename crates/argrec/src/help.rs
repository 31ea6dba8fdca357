//! Plain help text for a command.

use std::{fmt::Write as _, io};

use crate::{schema::kebab, Arity, Command};

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

/// Writes the help of `cmd`; `parents` are the names of the commands above it.
pub fn render<W: io::Write + ?Sized>(
    cmd: &Command,
    parents: &[&str],
    out: &mut W,
) -> io::Result<()> {
    out.write_all(text(cmd, parents).as_bytes())
}

pub fn text(cmd: &Command, parents: &[&str]) -> String {
    let mut buf = String::new();
    let path = parents.iter().copied().chain([cmd.get_name()]).collect::<Vec<_>>().join(" ");
    let schema = cmd.get_schema();

    w!(buf, "{path}");
    if let Some(version) = cmd.get_version() {
        w!(buf, " {version}");
    }
    w!(buf, "\n");
    if let Some(author) = cmd.get_author() {
        write_lines_indented(&mut buf, author, 2);
    }
    if let Some(about) = cmd.get_about() {
        write_lines_indented(&mut buf, about, 2);
    }

    blank_line(&mut buf);
    w!(buf, "USAGE:\n    {path}");
    if !schema.flags.is_empty() {
        w!(buf, " [OPTIONS]");
    }
    for group in &schema.args {
        w!(buf, " {}", usage(group.field, group.arity));
    }
    if !cmd.get_subcommands().is_empty() {
        w!(buf, " <SUBCOMMAND>");
    }
    w!(buf, "\n");

    if !schema.args.is_empty() {
        blank_line(&mut buf);
        w!(buf, "ARGS:\n");
        let mut blank = "";
        for group in &schema.args {
            w!(buf, "{blank}");
            blank = "\n";
            w!(buf, "    {}\n", usage(group.field, group.arity));
            if let Some(doc) = group.doc {
                write_lines_indented(&mut buf, doc, 6);
            }
        }
    }

    blank_line(&mut buf);
    w!(buf, "OPTIONS:\n");
    for flag in &schema.flags {
        let short = flag.short.map(|it| format!("-{it}, ")).unwrap_or_default();
        let value =
            if flag.takes_value { format!(" <{}>", kebab(flag.field)) } else { String::new() };
        w!(buf, "    {short}--{}{value}\n", flag.long);
        if let Some(doc) = flag.doc {
            write_lines_indented(&mut buf, doc, 6);
        }
        if let Some(default) = flag.default {
            w!(buf, "      [default: {default}]\n");
        }
        blank_line(&mut buf);
    }
    w!(buf, "    -h, --help\n      Prints help information.\n");
    if cmd.get_version().is_some() {
        w!(buf, "\n    -v, --version\n      Prints version information.\n");
    }

    if !cmd.get_subcommands().is_empty() {
        blank_line(&mut buf);
        w!(buf, "SUBCOMMANDS:\n");
        let mut blank = "";
        for sub in cmd.get_subcommands() {
            w!(buf, "{blank}");
            blank = "\n";
            let names = [sub.get_name()]
                .into_iter()
                .chain(sub.get_aliases().iter().map(String::as_str))
                .collect::<Vec<_>>();
            w!(buf, "    {}\n", names.join(", "));
            if let Some(about) = sub.get_about() {
                write_lines_indented(&mut buf, about, 6);
            }
        }
    }
    buf
}

fn usage(name: &str, arity: Arity) -> String {
    match arity {
        Arity::Fixed(1) => format!("<{name}>"),
        Arity::Bounded { min: 0, max: 1 } => format!("[{name}]"),
        arity if arity.min() == 0 => format!("[{name}]..."),
        _ => format!("<{name}>..."),
    }
}

fn write_lines_indented(buf: &mut String, multiline_str: &str, indent: usize) {
    for line in multiline_str.split('\n').map(str::trim_end) {
        if line.is_empty() {
            w!(buf, "\n")
        } else {
            w!(buf, "{blank:indent$}{line}\n", blank = "");
        }
    }
}

fn blank_line(buf: &mut String) {
    w!(buf, "\n");
}
