use argrec::{Command, Record, ValidationError};
use expect_test::{expect, Expect};

fn check<F: Record + Send + Sync, A: Record>(expect: Expect) {
    let cmd = Command::new("prog").handler(|_: F, _: A| ());
    check_cmd(&cmd, expect);
}

fn check_cmd(cmd: &Command, expect: Expect) {
    let actual = match argrec::validate(cmd, true) {
        Ok(()) => "ok".to_string(),
        Err(err) => err.to_string(),
    };
    expect.assert_eq(&actual);
}

#[test]
fn conflicting_flags() {
    #[derive(Default, Record)]
    struct Shorts {
        #[arg(short = "a")]
        all: bool,
        #[arg(short = "a")]
        almost: bool,
    }

    #[derive(Default, Record)]
    struct Longs {
        dry_run: bool,
        #[arg(long = "dry-run")]
        simulate: bool,
    }

    check::<Shorts, ()>(expect![
        "fields `all` and `almost` of command `prog` both use short flag `-a`"
    ]);
    check::<Longs, ()>(expect![
        "fields `dry_run` and `simulate` of command `prog` both use long flag `--dry-run`"
    ]);
}

#[test]
fn malformed_short_and_long() {
    #[derive(Default, Record)]
    struct Empty {
        #[arg(short = "")]
        all: bool,
    }

    #[derive(Default, Record)]
    struct Marker {
        #[arg(short)]
        all: bool,
    }

    #[derive(Default, Record)]
    struct Wide {
        #[arg(short = "ab")]
        all: bool,
    }

    #[derive(Default, Record)]
    struct NoLong {
        #[arg(long = "")]
        all: bool,
    }

    check::<Empty, ()>(expect!["empty short flag on field `all` of command `prog`"]);
    check::<Marker, ()>(expect!["empty short flag on field `all` of command `prog`"]);
    check::<Wide, ()>(expect![
        "short flag `ab` on field `all` of command `prog` is more than one character"
    ]);
    check::<NoLong, ()>(expect!["empty long flag on field `all` of command `prog`"]);
}

#[test]
fn tag_literals() {
    #[derive(Default, Record)]
    struct TakesVal {
        #[arg(takes_val = "maybe")]
        color: bool,
    }

    #[derive(Default, Record)]
    struct BadMin {
        #[arg(min = "x")]
        rest: Vec<i32>,
    }

    #[derive(Default, Record)]
    struct Inverted {
        #[arg(min = 3, max = 1)]
        rest: Vec<i32>,
    }

    #[derive(Default, Record)]
    struct BadBound {
        #[arg(max_val = "lots")]
        level: u8,
    }

    check::<TakesVal, ()>(expect![
        "field `color` of command `prog` has an invalid `takes_val` tag `maybe`: expected `true` or `false`"
    ]);
    check::<(), BadMin>(expect![
        "field `rest` of command `prog` has an invalid `min` tag `x`: expected a non-negative integer"
    ]);
    check::<(), Inverted>(expect![
        "field `rest` of command `prog` has an invalid `min` tag `3`: 3 is greater than the maximum 1"
    ]);
    check::<BadBound, ()>(expect![
        "field `level` of command `prog` has an invalid `max_val` tag `lots`: can't decode `lots` as u8: invalid digit found in string"
    ]);
}

#[test]
fn decoders_for_flag_kinds() {
    #[derive(Default, Record)]
    struct ValuelessString {
        #[arg(takes_val = "false")]
        name: String,
    }

    #[derive(Default, Record)]
    struct ValuelessVec {
        #[arg(takes_val = "false")]
        levels: Vec<u32>,
    }

    #[derive(Default, Record)]
    struct Pair {
        pair: [String; 2],
    }

    check::<ValuelessString, ()>(expect![
        "no valueless decoder for `string` (field `name` of command `prog`)"
    ]);
    check::<ValuelessVec, ()>(expect![
        "no valueless decoder for `u32` (field `levels` of command `prog`)"
    ]);
    check::<Pair, ()>(expect!["flag field `pair` of command `prog` is a fixed-size array"]);
}

#[test]
fn failing_default() {
    #[derive(Default, Record)]
    struct Jobs {
        #[arg(default = "many")]
        jobs: usize,
    }

    check::<Jobs, ()>(expect![
        "default of field `jobs` of command `prog` doesn't decode: can't decode `many` as usize: invalid digit found in string"
    ]);
}

#[test]
fn positional_layout() {
    #[derive(Default, Record)]
    struct TwoVariable {
        a: Vec<String>,
        b: Option<String>,
    }

    #[derive(Default, Record)]
    struct OneVariable {
        a: Vec<String>,
        #[arg(min = 2, max = 2)]
        b: Vec<String>,
        c: [u8; 2],
    }

    #[derive(Default, Record)]
    struct Numbers {
        #[arg(subcommand_args)]
        rest: Vec<i32>,
    }

    #[derive(Default, Record)]
    struct FlagPassthrough {
        #[arg(subcommand_args)]
        rest: Vec<String>,
    }

    check::<(), TwoVariable>(expect![
        "command `prog` has more than one variable-length argument: a, b"
    ]);
    check::<(), OneVariable>(expect!["ok"]);
    check::<(), Numbers>(expect![
        "`subcommand_args` on field `rest` of command `prog` needs a `Vec<String>` positional"
    ]);
    check::<FlagPassthrough, ()>(expect![
        "`subcommand_args` on field `rest` of command `prog` needs a `Vec<String>` positional"
    ]);
}

#[derive(Default, Record)]
struct Target {
    target: String,
}

#[test]
fn command_shape() {
    let cmd = Command::new("prog");
    check_cmd(&cmd, expect!["command `prog` has neither a handler nor subcommands"]);

    let cmd = Command::new("prog")
        .handler(|(), _: Target| ())
        .subcommand(Command::new("run").handler(|(), ()| ()));
    check_cmd(&cmd, expect!["command `prog` declares both positional arguments and subcommands"]);

    let cmd = Command::new("prog")
        .subcommand(Command::new("a").alias("b").handler(|(), ()| ()))
        .subcommand(Command::new("b").handler(|(), ()| ()));
    check_cmd(&cmd, expect!["subcommands `a` and `b` of command `prog` both answer to `b`"]);
}

#[test]
fn recursion_is_opt_in() {
    let cmd = Command::new("prog").subcommand(Command::new("child"));
    assert_eq!(argrec::validate(&cmd, false), Ok(()));
    assert_eq!(
        argrec::validate(&cmd, true),
        Err(ValidationError::MissingHandler { command: "child".to_string() })
    );
}

#[test]
#[should_panic(expected = "command `child` has neither a handler nor subcommands")]
fn assert_valid_panics() {
    let cmd = Command::new("prog").subcommand(Command::new("child"));
    argrec::assert_valid(&cmd);
}

#[test]
fn valid_trees() {
    #[derive(Default, Record)]
    struct Flags {
        #[arg(short = "v", takes_val = "false")]
        verbose: u8,
        #[arg(short = "j", default = "4", min_val = "1")]
        jobs: usize,
        #[arg(long = "no-cache", invert)]
        cache: bool,
    }

    let cmd = Command::new("prog")
        .handler(|_: Flags, ()| ())
        .subcommand(Command::new("run").alias("r").handler(|(), _: Target| ()))
        .subcommand(Command::new("test").subcommand(Command::new("unit").handler(|(), ()| ())));
    check_cmd(&cmd, expect!["ok"]);
}
