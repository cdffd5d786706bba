//! Leaf fields: coercion from raw environment text into typed values, and
//! the read-only [`Value`] view that conformance and validation rules see.
//!
//! Supported out of the box: `String`, `bool`, `char`, integers up to 64
//! bits, `f32`/`f64`, [`Duration`], [`PathBuf`], IP and socket addresses,
//! plus `Option<T>` and `Vec<T>` of any of those. Add your own type by
//! implementing [`FromEnv`] and invoking [`leaf!`](crate::leaf!).

use std::borrow::Cow;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::duration::parse_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Text,
    Integer,
    Float,
    Boolean,
    Duration,
    Path,
    List,
    /// Anything else, with a short human-readable name.
    Other(&'static str),
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafKind::Text => f.write_str("text"),
            LeafKind::Integer => f.write_str("integer"),
            LeafKind::Float => f.write_str("float"),
            LeafKind::Boolean => f.write_str("boolean"),
            LeafKind::Duration => f.write_str("duration"),
            LeafKind::Path => f.write_str("path"),
            LeafKind::List => f.write_str("list"),
            LeafKind::Other(name) => f.write_str(name),
        }
    }
}

/// A raw value could not be converted into the field's type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}: {reason}")]
pub struct CoerceError {
    pub expected: LeafKind,
    pub reason: String,
}

impl CoerceError {
    pub fn new(expected: LeafKind, reason: impl Into<String>) -> Self {
        Self {
            expected,
            reason: reason.into(),
        }
    }
}

/// Read-only view of a leaf's current value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Text(Cow<'a, str>),
    Int(i128),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    /// A flat collection, by element count.
    List(usize),
    /// An `Option` holding `None`.
    Absent,
}

impl Value<'_> {
    /// Whether the value equals its type's zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Bool(b) => !*b,
            Value::Duration(d) => d.is_zero(),
            Value::List(len) => *len == 0,
            Value::Absent => true,
        }
    }
}

/// Sized conversion used to build [`Leaf`] implementations.
pub trait FromEnv: Sized {
    const KIND: LeafKind;

    fn from_env(raw: &str) -> Result<Self, CoerceError>;

    fn view(&self) -> Value<'_>;

    /// Mutable text, for types that are plain strings.
    fn text_mut(&mut self) -> Option<&mut String> {
        None
    }
}

/// A field the binder can write into. Object safe.
pub trait Leaf {
    fn kind(&self) -> LeafKind;

    /// Replace the current value with one parsed from `raw`.
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError>;

    fn value(&self) -> Value<'_>;

    fn text_mut(&mut self) -> Option<&mut String>;
}

/// Implement [`Leaf`] for types that implement [`FromEnv`].
///
/// ```ignore
/// impl envfig::FromEnv for LogLevel { /* ... */ }
/// envfig::leaf!(LogLevel);
/// ```
#[macro_export]
macro_rules! leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Leaf for $ty {
                fn kind(&self) -> $crate::LeafKind {
                    <$ty as $crate::FromEnv>::KIND
                }

                fn assign(&mut self, raw: &str) -> ::core::result::Result<(), $crate::CoerceError> {
                    *self = <$ty as $crate::FromEnv>::from_env(raw)?;
                    Ok(())
                }

                fn value(&self) -> $crate::Value<'_> {
                    $crate::FromEnv::view(self)
                }

                fn text_mut(&mut self) -> ::core::option::Option<&mut String> {
                    $crate::FromEnv::text_mut(self)
                }
            }
        )*
    };
}

impl FromEnv for String {
    const KIND: LeafKind = LeafKind::Text;

    fn from_env(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_string())
    }

    fn view(&self) -> Value<'_> {
        Value::Text(Cow::Borrowed(self))
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        Some(self)
    }
}

impl FromEnv for bool {
    const KIND: LeafKind = LeafKind::Boolean;

    fn from_env(raw: &str) -> Result<Self, CoerceError> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            other => Err(CoerceError::new(
                LeafKind::Boolean,
                format!("'{other}' is not a boolean"),
            )),
        }
    }

    fn view(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

macro_rules! integer_leaf {
    ($($ty:ty),*) => {
        $(
            impl FromEnv for $ty {
                const KIND: LeafKind = LeafKind::Integer;

                fn from_env(raw: &str) -> Result<Self, CoerceError> {
                    raw.parse::<$ty>().map_err(|e| {
                        CoerceError::new(LeafKind::Integer, format!("'{raw}': {e}"))
                    })
                }

                fn view(&self) -> Value<'_> {
                    Value::Int(*self as i128)
                }
            }
        )*
    };
}

integer_leaf!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_leaf {
    ($($ty:ty),*) => {
        $(
            impl FromEnv for $ty {
                const KIND: LeafKind = LeafKind::Float;

                fn from_env(raw: &str) -> Result<Self, CoerceError> {
                    raw.parse::<$ty>().map_err(|e| {
                        CoerceError::new(LeafKind::Float, format!("'{raw}': {e}"))
                    })
                }

                fn view(&self) -> Value<'_> {
                    Value::Float(*self as f64)
                }
            }
        )*
    };
}

float_leaf!(f32, f64);

impl FromEnv for Duration {
    const KIND: LeafKind = LeafKind::Duration;

    fn from_env(raw: &str) -> Result<Self, CoerceError> {
        parse_duration(raw).map_err(|reason| CoerceError::new(LeafKind::Duration, reason))
    }

    fn view(&self) -> Value<'_> {
        Value::Duration(*self)
    }
}

impl FromEnv for PathBuf {
    const KIND: LeafKind = LeafKind::Path;

    fn from_env(raw: &str) -> Result<Self, CoerceError> {
        Ok(PathBuf::from(raw))
    }

    fn view(&self) -> Value<'_> {
        Value::Text(self.to_string_lossy())
    }
}

impl FromEnv for char {
    const KIND: LeafKind = LeafKind::Other("character");

    fn from_env(raw: &str) -> Result<Self, CoerceError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CoerceError::new(
                Self::KIND,
                format!("'{raw}' is not a single character"),
            )),
        }
    }

    fn view(&self) -> Value<'_> {
        Value::Text(Cow::Owned(self.to_string()))
    }
}

macro_rules! address_leaf {
    ($($ty:ty => $name:literal),*) => {
        $(
            impl FromEnv for $ty {
                const KIND: LeafKind = LeafKind::Other($name);

                fn from_env(raw: &str) -> Result<Self, CoerceError> {
                    raw.parse::<$ty>()
                        .map_err(|e| CoerceError::new(Self::KIND, format!("'{raw}': {e}")))
                }

                fn view(&self) -> Value<'_> {
                    Value::Text(Cow::Owned(self.to_string()))
                }
            }
        )*
    };
}

address_leaf!(
    IpAddr => "ip address",
    Ipv4Addr => "ipv4 address",
    Ipv6Addr => "ipv6 address",
    SocketAddr => "socket address"
);

crate::leaf!(
    String, bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, Duration,
    PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl<T: FromEnv> Leaf for Option<T> {
    fn kind(&self) -> LeafKind {
        T::KIND
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = Some(T::from_env(raw)?);
        Ok(())
    }

    fn value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.view(),
            None => Value::Absent,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        self.as_mut().and_then(|inner| FromEnv::text_mut(inner))
    }
}

/// Comma-separated; items are trimmed and an empty input is an empty list.
impl<T: FromEnv> Leaf for Vec<T> {
    fn kind(&self) -> LeafKind {
        LeafKind::List
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        if raw.trim().is_empty() {
            self.clear();
            return Ok(());
        }
        let items = raw
            .split(',')
            .map(|item| T::from_env(item.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoerceError::new(LeafKind::List, format!("list item: {e}")))?;
        *self = items;
        Ok(())
    }

    fn value(&self) -> Value<'_> {
        Value::List(self.len())
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        None
    }
}
