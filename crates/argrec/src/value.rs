//! Decoded values and the types they can be bound into.
//!
//! Decoders never see the user's structs. They produce a [`Value`], and the
//! code generated by `#[derive(Record)]` moves it into the right field through
//! [`Bind`]. The set of built-in types is closed ([`TypeTag`]); anything else
//! goes through [`TypeTag::Custom`] and a per-command decoder.

use std::{
    any::Any,
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    path::PathBuf,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

/// Identifies the decoder family for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    Path,
    Bytes,
    Duration,
    IpAddr,
    IpNet,
    /// A user type declared with [`custom_type!`](crate::custom_type), keyed by its name.
    Custom(&'static str),
}

impl TypeTag {
    pub fn of<T: Bind>() -> TypeTag {
        T::TYPE
    }

    pub fn of_value(value: &Value) -> TypeTag {
        match value {
            Value::Bool(_) => TypeTag::Bool,
            Value::I8(_) => TypeTag::I8,
            Value::I16(_) => TypeTag::I16,
            Value::I32(_) => TypeTag::I32,
            Value::I64(_) => TypeTag::I64,
            Value::Isize(_) => TypeTag::Isize,
            Value::U8(_) => TypeTag::U8,
            Value::U16(_) => TypeTag::U16,
            Value::U32(_) => TypeTag::U32,
            Value::U64(_) => TypeTag::U64,
            Value::Usize(_) => TypeTag::Usize,
            Value::F32(_) => TypeTag::F32,
            Value::F64(_) => TypeTag::F64,
            Value::String(_) => TypeTag::String,
            Value::Path(_) => TypeTag::Path,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::Duration(_) => TypeTag::Duration,
            Value::IpAddr(_) => TypeTag::IpAddr,
            Value::IpNet(_) => TypeTag::IpNet,
            Value::Custom(it) => TypeTag::Custom(it.type_name()),
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeTag::I8
                | TypeTag::I16
                | TypeTag::I32
                | TypeTag::I64
                | TypeTag::Isize
                | TypeTag::U8
                | TypeTag::U16
                | TypeTag::U32
                | TypeTag::U64
                | TypeTag::Usize
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Bool => "bool",
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::Isize => "isize",
            TypeTag::U8 => "u8",
            TypeTag::U16 => "u16",
            TypeTag::U32 => "u32",
            TypeTag::U64 => "u64",
            TypeTag::Usize => "usize",
            TypeTag::F32 => "f32",
            TypeTag::F64 => "f64",
            TypeTag::String => "string",
            TypeTag::Path => "path",
            TypeTag::Bytes => "bytes",
            TypeTag::Duration => "duration",
            TypeTag::IpAddr => "ip address",
            TypeTag::IpNet => "ip network",
            TypeTag::Custom(name) => name,
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    String(String),
    Path(PathBuf),
    Bytes(Vec<u8>),
    Duration(Duration),
    IpAddr(IpAddr),
    IpNet(IpNet),
    Custom(Custom),
}

/// A value of a user type, shared so that bound records stay cheap to copy
/// into decoders.
#[derive(Clone)]
pub struct Custom {
    ty: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Custom {
    pub fn new<T: Any + Send + Sync>(ty: &'static str, value: T) -> Custom {
        Custom { ty, inner: Arc::new(value) }
    }

    pub fn type_name(&self) -> &'static str {
        self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Custom({})", self.ty)
    }
}

impl PartialEq for Custom {
    fn eq(&self, other: &Custom) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Conversion between a field type and [`Value`].
///
/// `from_value` hands the value back when the variant doesn't match, so the
/// caller can report which decoder misbehaved.
pub trait Bind: Clone + Send + Sync + 'static {
    const TYPE: TypeTag;

    fn from_value(value: Value) -> Result<Self, Value>;

    fn to_value(&self) -> Value;
}

macro_rules! impl_bind {
    ($($ty:ty => $variant:ident,)*) => {$(
        impl Bind for $ty {
            const TYPE: TypeTag = TypeTag::$variant;

            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(it) => Ok(it),
                    other => Err(other),
                }
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }
    )*};
}

impl_bind! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    PathBuf => Path,
    Vec<u8> => Bytes,
    Duration => Duration,
    IpAddr => IpAddr,
    IpNet => IpNet,
}

/// Declares a user type bindable through a per-command decoder.
///
/// ```
/// #[derive(Debug, Clone, PartialEq)]
/// enum Color { Red, Green }
///
/// argrec::custom_type!(Color);
///
/// assert_eq!(argrec::TypeTag::of::<Color>(), argrec::TypeTag::Custom("Color"));
/// ```
#[macro_export]
macro_rules! custom_type {
    ($ty:ty) => {
        impl $crate::Bind for $ty {
            const TYPE: $crate::TypeTag = $crate::TypeTag::Custom(stringify!($ty));

            fn from_value(value: $crate::Value) -> ::std::result::Result<Self, $crate::Value> {
                match value {
                    $crate::Value::Custom(custom) => {
                        let it = custom.downcast_ref::<$ty>().cloned();
                        it.ok_or($crate::Value::Custom(custom))
                    }
                    other => Err(other),
                }
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Custom($crate::Custom::new(stringify!($ty), self.clone()))
            }
        }
    };
}

/// An IP network in CIDR notation. Host bits are cleared on parse, so
/// `10.1.2.3/8` and `10.0.0.0/8` are the same network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNet {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpNet {
    pub fn new(addr: IpAddr, prefix_len: u8) -> Option<IpNet> {
        let addr = match addr {
            IpAddr::V4(v4) => {
                if prefix_len > 32 {
                    return None;
                }
                let mask = u32::MAX.checked_shl(32 - u32::from(prefix_len)).unwrap_or(0);
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
            }
            IpAddr::V6(v6) => {
                if prefix_len > 128 {
                    return None;
                }
                let mask = u128::MAX.checked_shl(128 - u32::from(prefix_len)).unwrap_or(0);
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
            }
        };
        Some(IpNet { addr, prefix_len })
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match IpNet::new(ip, self.prefix_len) {
            Some(net) => net.addr == self.addr,
            None => false,
        }
    }
}

impl Default for IpNet {
    fn default() -> IpNet {
        IpNet { addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), prefix_len: 0 }
    }
}

impl fmt::Display for IpNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl FromStr for IpNet {
    type Err = String;

    fn from_str(s: &str) -> Result<IpNet, String> {
        let (addr, len) =
            s.split_once('/').ok_or_else(|| format!("missing prefix length in `{s}`"))?;
        let addr = addr.parse::<IpAddr>().map_err(|err| err.to_string())?;
        let len = len.parse::<u8>().map_err(|_| format!("invalid prefix length `{len}`"))?;
        IpNet::new(addr, len).ok_or_else(|| format!("prefix length {len} is too long for {addr}"))
    }
}
