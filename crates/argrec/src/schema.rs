//! Flag and positional schemas derived from record declarations.
//!
//! A [`Schema`] is computed once per command and then only read.

use heck::ToKebabCase;

use crate::{
    decode::parse_bool,
    tags::{self, Tags},
    FieldDecl, Record, Shape, TypeTag,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    pub field: &'static str,
    pub slot: usize,
    pub long: String,
    pub short: Option<char>,
    pub takes_value: bool,
    pub default: Option<&'static str>,
    pub invert: bool,
    pub shape: Shape,
    pub ty: TypeTag,
    pub tags: Tags,
    pub doc: Option<&'static str>,
}

/// Number of positional tokens a group binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Bounded { min: usize, max: usize },
    Unbounded { min: usize },
}

impl Arity {
    pub fn min(self) -> usize {
        match self {
            Arity::Fixed(n) => n,
            Arity::Bounded { min, .. } | Arity::Unbounded { min } => min,
        }
    }

    pub fn max(self) -> Option<usize> {
        match self {
            Arity::Fixed(n) => Some(n),
            Arity::Bounded { max, .. } => Some(max),
            Arity::Unbounded { .. } => None,
        }
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, Arity::Fixed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgGroupSpec {
    pub field: &'static str,
    pub slot: usize,
    pub arity: Arity,
    pub shape: Shape,
    pub ty: TypeTag,
    pub tags: Tags,
    /// Binding into this group switches the parser to positional-only mode.
    pub passthrough: bool,
    pub doc: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub flags: Vec<FlagSpec>,
    pub args: Vec<ArgGroupSpec>,
}

impl Schema {
    pub fn derive<F: Record, A: Record>() -> Schema {
        let flags = F::fields().into_iter().enumerate().map(|(slot, f)| flag(slot, f)).collect();
        let args = A::fields().into_iter().enumerate().map(|(slot, f)| arg(slot, f)).collect();
        Schema { flags, args }
    }

    pub fn long(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|it| it.long == name)
    }

    pub fn short(&self, name: char) -> Option<&FlagSpec> {
        self.flags.iter().find(|it| it.short == Some(name))
    }
}

/// Malformed tag literals fall back to the defaults here; the validator is
/// the one reporting them.
pub fn flag(slot: usize, decl: FieldDecl) -> FlagSpec {
    let FieldDecl { name, shape, ty, tags, doc } = decl;
    let long = match tags.get(tags::LONG) {
        Some(long) => long.to_string(),
        None => kebab(name),
    };
    let short = tags.get(tags::SHORT).and_then(|it| it.chars().next());
    let toggle = shape == Shape::Scalar && ty == TypeTag::Bool;
    let takes_value = tags.get(tags::TAKES_VAL).and_then(parse_bool).unwrap_or(!toggle);
    FlagSpec {
        field: name,
        slot,
        long,
        short,
        takes_value,
        default: tags.get(tags::DEFAULT),
        invert: tags.has(tags::INVERT),
        shape,
        ty,
        tags,
        doc,
    }
}

pub fn arg(slot: usize, decl: FieldDecl) -> ArgGroupSpec {
    let FieldDecl { name, shape, ty, tags, doc } = decl;
    let arity = match shape {
        Shape::Scalar => Arity::Fixed(1),
        Shape::Array(n) => Arity::Fixed(n),
        Shape::Optional => Arity::Bounded { min: 0, max: 1 },
        Shape::Sequence => {
            let min = count_tag(&tags, tags::MIN).unwrap_or(0);
            match count_tag(&tags, tags::MAX) {
                Some(max) if max == min => Arity::Fixed(min),
                Some(max) => Arity::Bounded { min, max },
                None => Arity::Unbounded { min },
            }
        }
    };
    ArgGroupSpec {
        field: name,
        slot,
        arity,
        shape,
        ty,
        passthrough: tags.has(tags::SUBCOMMAND_ARGS),
        tags,
        doc,
    }
}

pub(crate) fn count_tag(tags: &Tags, key: &str) -> Option<usize> {
    tags.get(key).and_then(|it| it.parse().ok())
}

pub fn kebab(field: &str) -> String {
    field.to_kebab_case()
}
