/// Field metadata from `#[arg(...)]`, in declaration order.
///
/// Keys are either literal-valued (`short = "v"`) or presence-only
/// (`invert`). Unknown keys are kept so that custom decoders can read them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(&'static str, Option<&'static str>)>,
}

pub const SHORT: &str = "short";
pub const LONG: &str = "long";
pub const DEFAULT: &str = "default";
pub const TAKES_VAL: &str = "takes_val";
pub const INVERT: &str = "invert";
pub const PATH: &str = "path";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const MIN_VAL: &str = "min_val";
pub const MAX_VAL: &str = "max_val";
pub const SUBCOMMAND_ARGS: &str = "subcommand_args";

impl Tags {
    pub fn new() -> Tags {
        Tags::default()
    }

    pub fn with(mut self, key: &'static str, literal: &'static str) -> Tags {
        self.entries.push((key, Some(literal)));
        self
    }

    pub fn with_marker(mut self, key: &'static str) -> Tags {
        self.entries.push((key, None));
        self
    }

    /// The literal of `key`. A presence-only key reads as `Some("")`, which
    /// is what lets the validator catch `short` written without a value.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.lookup(key).map(|it| it.unwrap_or(""))
    }

    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&'static str>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<Option<&'static str>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

#[test]
fn lookup() {
    let tags = Tags::new().with(SHORT, "v").with_marker(INVERT);
    assert_eq!(tags.get(SHORT), Some("v"));
    assert_eq!(tags.get(INVERT), Some(""));
    assert!(tags.has(INVERT));
    assert!(!tags.has(PATH));
    assert_eq!(tags.get(LONG), None);
}
