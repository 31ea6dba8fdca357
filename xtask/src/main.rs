
use xshell::{cmd, Shell};

/// Publish order: the runtime pins the exact macros version.
const CRATES: [&str; 2] = ["argrec-macros", "argrec"];

fn main() -> xshell::Result<()> {
    let sh = Shell::new()?;

    cmd!(sh, "cargo test --workspace").run()?;

    {
        let _e = sh.push_env("RUSTDOCFLAGS", "-D warnings");
        cmd!(sh, "cargo doc --no-deps -p argrec").run()?;
    }

    let pkgid = cmd!(sh, "cargo pkgid -p argrec").read()?;
    let version = match pkgid.rsplit_once(['#', '@']) {
        Some((_, version)) => version.to_string(),
        None => panic!("unexpected pkgid: {pkgid}"),
    };
    let tag = format!("v{version}");

    let current_branch = cmd!(sh, "git branch --show-current").read()?;
    let tag_exists =
        cmd!(sh, "git tag --list").read()?.split_ascii_whitespace().any(|it| it == tag);

    if current_branch == "master" && !tag_exists {
        cmd!(sh, "git tag {tag}").run()?;
        // `cargo publish` blocks until the registry serves the new version.
        for krate in CRATES {
            cmd!(sh, "cargo publish -p {krate}").run()?;
        }
        cmd!(sh, "git push --tags").run()?;
    }

    Ok(())
}
