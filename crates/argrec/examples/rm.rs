use std::path::PathBuf;

use argrec::{Command, Record};

#[derive(Default, Record)]
struct Flags {
    /// Remove directories and their contents.
    #[arg(short = "r")]
    recursive: bool,
}

#[derive(Default, Record)]
struct Args {
    #[arg(min = 1)]
    paths: Vec<PathBuf>,
}

fn main() {
    Command::new("rm")
        .version(env!("CARGO_PKG_VERSION"))
        .handler(|flags: Flags, args: Args| {
            for path in &args.paths {
                println!(
                    "removing {}{}",
                    path.display(),
                    if flags.recursive { " recursively" } else { "" },
                )
            }
        })
        .run()
}
