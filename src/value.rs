//! Generic PV data, as stored by the [local provider](crate::providers::local).
//!
//! All numeric kinds can hold arrays; a scalar is a one-element array. Strings are
//! also arrays, although in practice they are almost always single-element.

use num::NumCast;
use std::{fmt, str::FromStr};

/// The basic kinds of data a [`PvValue`] can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PvKind {
    Int,
    Long,
    Double,
    String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PvValue {
    Int(Vec<i16>),
    Long(Vec<i32>),
    Double(Vec<f64>),
    String(Vec<String>),
}

/// A value could not be represented as the requested kind without loss
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("value {0} is out of range for {1:?}")]
    OutOfRange(String, PvKind),
    #[error("could not parse '{0}' as {1:?}")]
    CannotParse(String, PvKind),
    #[error("expected a single value, got {0}")]
    NotScalar(usize),
}

impl PvValue {
    pub fn kind(&self) -> PvKind {
        match self {
            PvValue::Int(_) => PvKind::Int,
            PvValue::Long(_) => PvKind::Long,
            PvValue::Double(_) => PvKind::Double,
            PvValue::String(_) => PvKind::String,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            PvValue::Int(v) => v.len(),
            PvValue::Long(v) => v.len(),
            PvValue::Double(v) => v.len(),
            PvValue::String(v) => v.len(),
        }
    }

    /// Convert to another kind.
    ///
    /// Numeric conversions must be exact (no truncation or overflow). Strings are
    /// parsed element-by-element when converting to a numeric kind, and any kind can
    /// be converted to a string.
    pub fn convert_to(&self, kind: PvKind) -> Result<PvValue, ConversionError> {
        fn _cast_vec<T, U>(from: &[T], kind: PvKind) -> Result<Vec<U>, ConversionError>
        where
            T: Copy + NumCast + fmt::Display + Into<f64>,
            U: Copy + NumCast + Into<f64>,
        {
            from.iter()
                .map(|n| {
                    // NumCast truncates floats, so check that the round trip is exact
                    NumCast::from(*n)
                        .filter(|u: &U| Into::<f64>::into(*u) == Into::<f64>::into(*n))
                        .ok_or_else(|| ConversionError::OutOfRange(n.to_string(), kind))
                })
                .collect()
        }
        fn _parse_vec<U: FromStr>(
            from: &[String],
            kind: PvKind,
        ) -> Result<Vec<U>, ConversionError> {
            from.iter()
                .map(|s| {
                    s.trim()
                        .parse()
                        .map_err(|_| ConversionError::CannotParse(s.clone(), kind))
                })
                .collect()
        }
        fn _format_vec<T: fmt::Display>(from: &[T]) -> Vec<String> {
            from.iter().map(|v| v.to_string()).collect()
        }

        if self.kind() == kind {
            return Ok(self.clone());
        }
        Ok(match kind {
            PvKind::Int => PvValue::Int(match self {
                PvValue::Long(v) => _cast_vec(v, kind)?,
                PvValue::Double(v) => _cast_vec(v, kind)?,
                PvValue::String(v) => _parse_vec(v, kind)?,
                PvValue::Int(_) => unreachable!(),
            }),
            PvKind::Long => PvValue::Long(match self {
                PvValue::Int(v) => _cast_vec(v, kind)?,
                PvValue::Double(v) => _cast_vec(v, kind)?,
                PvValue::String(v) => _parse_vec(v, kind)?,
                PvValue::Long(_) => unreachable!(),
            }),
            PvKind::Double => PvValue::Double(match self {
                PvValue::Int(v) => _cast_vec(v, kind)?,
                PvValue::Long(v) => _cast_vec(v, kind)?,
                PvValue::String(v) => _parse_vec(v, kind)?,
                PvValue::Double(_) => unreachable!(),
            }),
            PvKind::String => PvValue::String(match self {
                PvValue::Int(v) => _format_vec(v),
                PvValue::Long(v) => _format_vec(v),
                PvValue::Double(v) => _format_vec(v),
                PvValue::String(_) => unreachable!(),
            }),
        })
    }
}

impl fmt::Display for PvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn _join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match self {
            PvValue::Int(v) => _join(f, v),
            PvValue::Long(v) => _join(f, v),
            PvValue::Double(v) => _join(f, v),
            PvValue::String(v) => _join(f, v),
        }
    }
}

/// Implement conversions between a PvValue variant and its element type
macro_rules! impl_pvvalue_conversions_between {
    ($variant:ident, $typ:ty) => {
        impl From<$typ> for PvValue {
            fn from(value: $typ) -> Self {
                PvValue::$variant(vec![value])
            }
        }
        impl From<Vec<$typ>> for PvValue {
            fn from(value: Vec<$typ>) -> Self {
                PvValue::$variant(value)
            }
        }
        impl TryFrom<PvValue> for $typ {
            type Error = ConversionError;
            fn try_from(value: PvValue) -> Result<Self, Self::Error> {
                match value.convert_to(PvKind::$variant)? {
                    PvValue::$variant(mut v) if v.len() == 1 => Ok(v.remove(0)),
                    other => Err(ConversionError::NotScalar(other.count())),
                }
            }
        }
        impl TryFrom<PvValue> for Vec<$typ> {
            type Error = ConversionError;
            fn try_from(value: PvValue) -> Result<Self, Self::Error> {
                match value.convert_to(PvKind::$variant)? {
                    PvValue::$variant(v) => Ok(v),
                    _ => unreachable!(),
                }
            }
        }
    };
}
impl_pvvalue_conversions_between!(Int, i16);
impl_pvvalue_conversions_between!(Long, i32);
impl_pvvalue_conversions_between!(Double, f64);
impl_pvvalue_conversions_between!(String, String);

impl From<&str> for PvValue {
    fn from(value: &str) -> Self {
        PvValue::String(vec![value.to_owned()])
    }
}
