//! The decoder registry.
//!
//! Two decoder families exist per type: a value decoder turns a literal into
//! a [`Value`], a valueless decoder computes a flag's next value from its
//! current one (`-vvv`). Per-command [`Decoders`] are consulted before the
//! built-ins.

use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr};

use crate::{
    tags::{self, Tags},
    DecodeCause, DecodeError, IpNet, TypeTag, Value,
};

pub type ValueDecoder = fn(&str, &Tags) -> Result<Value, DecodeError>;
pub type ValuelessDecoder = fn(&Value, &Tags) -> Result<Value, DecodeError>;

/// Per-command decoder overrides.
#[derive(Debug, Clone, Default)]
pub struct Decoders {
    value: HashMap<TypeTag, ValueDecoder>,
    valueless: HashMap<TypeTag, ValuelessDecoder>,
}

impl Decoders {
    pub fn new() -> Decoders {
        Decoders::default()
    }

    pub fn value(mut self, ty: TypeTag, decoder: ValueDecoder) -> Decoders {
        self.value.insert(ty, decoder);
        self
    }

    pub fn valueless(mut self, ty: TypeTag, decoder: ValuelessDecoder) -> Decoders {
        self.valueless.insert(ty, decoder);
        self
    }

    pub fn value_decoder(&self, ty: TypeTag) -> Option<ValueDecoder> {
        self.value.get(&ty).copied().or_else(|| builtin_value(ty))
    }

    pub fn valueless_decoder(&self, ty: TypeTag) -> Option<ValuelessDecoder> {
        self.valueless.get(&ty).copied().or_else(|| builtin_valueless(ty))
    }
}

pub fn builtin_value(ty: TypeTag) -> Option<ValueDecoder> {
    let res: ValueDecoder = match ty {
        TypeTag::Bool => decode_bool,
        TypeTag::I8 => decode_i8,
        TypeTag::I16 => decode_i16,
        TypeTag::I32 => decode_i32,
        TypeTag::I64 => decode_i64,
        TypeTag::Isize => decode_isize,
        TypeTag::U8 => decode_u8,
        TypeTag::U16 => decode_u16,
        TypeTag::U32 => decode_u32,
        TypeTag::U64 => decode_u64,
        TypeTag::Usize => decode_usize,
        TypeTag::F32 => decode_f32,
        TypeTag::F64 => decode_f64,
        TypeTag::String => decode_string,
        TypeTag::Path => decode_path,
        TypeTag::Bytes => decode_bytes,
        TypeTag::Duration => decode_duration,
        TypeTag::IpAddr => decode_ip_addr,
        TypeTag::IpNet => decode_ip_net,
        TypeTag::Custom(_) => return None,
    };
    Some(res)
}

pub fn builtin_valueless(ty: TypeTag) -> Option<ValuelessDecoder> {
    let res: ValuelessDecoder = match ty {
        TypeTag::Bool => toggle,
        ty if ty.is_integer() => increment,
        _ => return None,
    };
    Some(res)
}

macro_rules! number_decoders {
    ($($name:ident => $variant:ident,)*) => {$(
        fn $name(s: &str, t: &Tags) -> Result<Value, DecodeError> {
            decode_number(s, t, TypeTag::$variant, Value::$variant)
        }
    )*};
}

number_decoders! {
    decode_i8 => I8,
    decode_i16 => I16,
    decode_i32 => I32,
    decode_i64 => I64,
    decode_isize => Isize,
    decode_u8 => U8,
    decode_u16 => U16,
    decode_u32 => U32,
    decode_u64 => U64,
    decode_usize => Usize,
    decode_f32 => F32,
    decode_f64 => F64,
}

fn decode_string(s: &str, t: &Tags) -> Result<Value, DecodeError> {
    check_path(s, t, TypeTag::String)?;
    Ok(Value::String(s.to_string()))
}

fn decode_path(s: &str, t: &Tags) -> Result<Value, DecodeError> {
    check_path(s, t, TypeTag::Path)?;
    Ok(Value::Path(PathBuf::from(s)))
}

fn decode_bytes(s: &str, _: &Tags) -> Result<Value, DecodeError> {
    hex::decode(s).map(Value::Bytes).map_err(|err| DecodeError::invalid(s, TypeTag::Bytes, err))
}

fn decode_duration(s: &str, _: &Tags) -> Result<Value, DecodeError> {
    humantime::parse_duration(s)
        .map(Value::Duration)
        .map_err(|err| DecodeError::invalid(s, TypeTag::Duration, err))
}

fn decode_ip_addr(s: &str, _: &Tags) -> Result<Value, DecodeError> {
    s.parse()
        .map(Value::IpAddr)
        .map_err(|_| DecodeError::invalid(s, TypeTag::IpAddr, "not a valid IP address"))
}

fn decode_ip_net(s: &str, _: &Tags) -> Result<Value, DecodeError> {
    s.parse::<IpNet>().map(Value::IpNet).map_err(|err| DecodeError::invalid(s, TypeTag::IpNet, err))
}

/// Accepts `1 t T true TRUE True` and `0 f F false FALSE False`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn decode_bool(s: &str, t: &Tags) -> Result<Value, DecodeError> {
    match parse_bool(s) {
        Some(b) => Ok(Value::Bool(b != t.has(tags::INVERT))),
        None => Err(DecodeError::invalid(s, TypeTag::Bool, "expected `true` or `false`")),
    }
}

fn decode_number<T>(
    s: &str,
    t: &Tags,
    ty: TypeTag,
    wrap: fn(T) -> Value,
) -> Result<Value, DecodeError>
where
    T: FromStr + PartialOrd + fmt::Display,
    T::Err: fmt::Display,
{
    let value = s.parse::<T>().map_err(|err| DecodeError::invalid(s, ty, err))?;
    if let Some(min) = bound::<T>(s, t, ty, tags::MIN_VAL)? {
        if value < min {
            let cause = DecodeCause::BelowMin { value: value.to_string(), min: min.to_string() };
            return Err(DecodeError::new(s, ty, cause));
        }
    }
    if let Some(max) = bound::<T>(s, t, ty, tags::MAX_VAL)? {
        if value > max {
            let cause = DecodeCause::AboveMax { value: value.to_string(), max: max.to_string() };
            return Err(DecodeError::new(s, ty, cause));
        }
    }
    Ok(wrap(value))
}

fn bound<T: FromStr>(
    s: &str,
    t: &Tags,
    ty: TypeTag,
    tag: &'static str,
) -> Result<Option<T>, DecodeError> {
    let Some(literal) = t.get(tag) else { return Ok(None) };
    match literal.parse::<T>() {
        Ok(it) => Ok(Some(it)),
        Err(_) => {
            let cause = DecodeCause::InvalidBound { tag, literal: literal.to_string() };
            Err(DecodeError::new(s, ty, cause))
        }
    }
}

fn check_path(s: &str, t: &Tags, ty: TypeTag) -> Result<(), DecodeError> {
    if !t.has(tags::PATH) {
        return Ok(());
    }
    match std::fs::metadata(s) {
        Ok(_) => Ok(()),
        Err(err) => Err(DecodeError::new(s, ty, DecodeCause::MissingPath(err.to_string()))),
    }
}

fn toggle(_: &Value, t: &Tags) -> Result<Value, DecodeError> {
    Ok(Value::Bool(!t.has(tags::INVERT)))
}

fn increment(current: &Value, _: &Tags) -> Result<Value, DecodeError> {
    macro_rules! inc {
        ($($variant:ident),*) => {
            match current {
                $(Value::$variant(n) => {
                    n.checked_add(1).map(Value::$variant).ok_or_else(|| n.to_string())
                })*
                other => panic!("counter flag bound to a non-integer value: {other:?}"),
            }
        };
    }
    inc!(I8, I16, I32, I64, Isize, U8, U16, U32, U64, Usize).map_err(|value| {
        let cause = DecodeCause::Overflow { value: value.clone() };
        DecodeError::new(&value, TypeTag::of_value(current), cause)
    })
}
