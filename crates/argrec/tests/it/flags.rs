use argrec::{Command, Record};
use expect_test::{expect, Expect};

use crate::{check_flags, check_output, parse, parse_cmd};

#[derive(Debug, Default, Record)]
struct Listing {
    #[arg(short = "a")]
    all: bool,
    #[arg(short = "b")]
    brief: bool,
    #[arg(short = "o")]
    output: Option<String>,
}

/// All spellings in `inputs` bind the same flags.
fn check_same(inputs: &[&str], expect: Expect) {
    let render = |args: &str| format!("{:#?}\n", parse::<Listing, ()>(args).unwrap().0);
    let first = render(inputs[0]);
    for &args in &inputs[1..] {
        assert_eq!(render(args), first, "`{args}`");
    }
    expect.assert_eq(&first);
}

#[test]
fn short_clusters() {
    check_same(
        &["-ab", "-a -b", "--all --brief", "-ba"],
        expect![[r#"
            Listing {
                all: true,
                brief: true,
                output: None,
            }
        "#]],
    );
    check_same(
        &["-aofile", "-ao file", "-ao=file", "--all --output=file", "--all --output file"],
        expect![[r#"
            Listing {
                all: true,
                brief: false,
                output: Some(
                    "file",
                ),
            }
        "#]],
    );
}

#[test]
fn inline_value_stops_at_equals() {
    check_flags::<Listing>(
        "-oa=b",
        expect![[r#"
            Listing {
                all: false,
                brief: false,
                output: Some(
                    "a",
                ),
            }
        "#]],
    );
    let (flags, ()) = parse::<Listing, ()>("-bofoo=bar").unwrap();
    assert!(flags.brief);
    assert_eq!(flags.output.as_deref(), Some("foo"));
}

#[test]
fn value_is_taken_verbatim() {
    check_flags::<Listing>(
        "--output -a",
        expect![[r#"
            Listing {
                all: false,
                brief: false,
                output: Some(
                    "-a",
                ),
            }
        "#]],
    );
}

#[test]
fn flag_errors() {
    check_flags::<Listing>("-abo", expect!["expected a value for flag `-o`"]);
    check_flags::<Listing>("--output", expect!["expected a value for flag `--output`"]);
    check_flags::<Listing>("-a=x", expect!["unexpected value for flag `-a`: `x`"]);
    check_flags::<Listing>("--all=true", expect!["unexpected value for flag `--all`: `true`"]);
    check_flags::<Listing>("-x", expect!["unexpected flag `-x`"]);
    check_flags::<Listing>("-ax", expect!["unexpected flag `-x`"]);
    check_flags::<Listing>("--werbose", expect!["unexpected flag `--werbose`"]);
    check_flags::<Listing>("-=x", expect!["unexpected flag `-=x`"]);
    check_flags::<Listing>("--version", expect!["unexpected flag `--version`"]);
    check_flags::<Listing>("stray", expect!["unexpected argument `stray`"]);
}

#[derive(Debug, Default, Record)]
struct Counting {
    #[arg(short = "v", takes_val = "false")]
    verbose: u8,
    #[arg(takes_val = "true")]
    color: bool,
    tag: Vec<String>,
}

#[test]
fn counters_toggles_and_repeats() {
    check_flags::<Counting>(
        "-vvv --verbose --color false --tag a --tag=b",
        expect![[r#"
            Counting {
                verbose: 4,
                color: false,
                tag: [
                    "a",
                    "b",
                ],
            }
        "#]],
    );
    check_flags::<Counting>(
        "--color=yes",
        expect!["error decoding flag `--color`: can't decode `yes` as bool: expected `true` or `false`"],
    );
}

#[derive(Debug, Default, Record)]
struct Bounded {
    #[arg(min_val = "5")]
    level: i32,
}

#[test]
fn bounded_value() {
    check_flags::<Bounded>(
        "--level 3",
        expect!["error decoding flag `--level`: can't decode `3` as i32: 3 is less than the minimum 5"],
    );
    check_flags::<Bounded>(
        "--level 5",
        expect![[r#"
            Bounded {
                level: 5,
            }
        "#]],
    );
}

#[derive(Debug, Clone, Default, Record)]
struct Build {
    #[arg(short = "j", default = "4")]
    jobs: usize,
    #[arg(long = "no-cache", invert)]
    cache: bool,
    target: Option<String>,
}

#[test]
fn default_literals() {
    check_flags::<Build>(
        "",
        expect![[r#"
            Build {
                jobs: 4,
                cache: false,
                target: None,
            }
        "#]],
    );
    check_flags::<Build>(
        "-j8",
        expect![[r#"
            Build {
                jobs: 8,
                cache: false,
                target: None,
            }
        "#]],
    );
}

#[test]
fn default_flags_record() {
    let defaults = Build { jobs: 1, cache: true, target: Some("x86_64".to_string()) };
    let parse = |args: &str| {
        let cmd = Command::new("build");
        let (flags, ()) = crate::parse_with_defaults::<Build, ()>(cmd, defaults.clone(), args)?;
        Ok::<_, String>(flags)
    };

    let flags = parse("").unwrap();
    assert_eq!(flags.jobs, 4, "a `default` literal wins over the record");
    assert!(flags.cache);
    assert_eq!(flags.target.as_deref(), Some("x86_64"));

    let flags = parse("--no-cache --target wasm32").unwrap();
    assert!(!flags.cache);
    assert_eq!(flags.target.as_deref(), Some("wasm32"));
}

#[test]
fn builtin_help_and_version() {
    let cmd =
        Command::new("prog").version("1.2.3").handler(|_: Listing, (): ()| panic!("handler ran"));
    check_output(
        &cmd,
        "-v",
        expect![[r#"
            1.2.3
        "#]],
    );
    check_output(
        &cmd,
        "-a --version --bogus",
        expect![[r#"
            1.2.3
        "#]],
    );
    let help = output_of(&cmd, "-h");
    assert!(help.starts_with("prog 1.2.3\n"), "{help}");
    assert_eq!(output_of(&cmd, "--help -x --bogus"), help);
    assert_eq!(output_of(&cmd, "-ah"), help);
}

#[test]
fn short_v_without_version() {
    check_flags::<Listing>("-v", expect!["unexpected flag `-v`"]);
}

#[test]
fn missing_flag_value() {
    let res = parse_cmd::<Bounded, ()>(Command::new("prog"), "--level");
    assert_eq!(res.unwrap_err(), "expected a value for flag `--level`");
}

fn output_of(cmd: &Command, args: &str) -> String {
    crate::output(cmd, args).unwrap()
}
