//! The seeded builtin library.
//!
//! Every function is total: a wrong argument type yields a neutral result
//! (`Null`, `0` or `-1`) instead of failing. Arity is checked by the
//! registry before dispatch, so missing trailing arguments here are only
//! the optional ones.

use std::cmp::Ordering;

use kry_ir::BuiltinFn;
use rand::Rng;

use crate::value::IrValue;

/// Upper bound of `math_random`, inclusive.
pub const RANDOM_MAX: i64 = 2_147_483_647;

/// Longest array `__range__` will materialize.
pub const MAX_RANGE_LEN: i64 = 1 << 16;

pub fn call(builtin: BuiltinFn, args: &[IrValue]) -> IrValue {
    let arg = |i: usize| args.get(i).unwrap_or(&IrValue::Null);
    match builtin {
        BuiltinFn::StringToUpper => map_str(arg(0), str::to_uppercase),
        BuiltinFn::StringToLower => map_str(arg(0), str::to_lowercase),
        BuiltinFn::StringTrim => map_str(arg(0), |s| s.trim().to_owned()),
        BuiltinFn::StringSubstring => substring(arg(0), arg(1), args.get(2)),
        BuiltinFn::StringSplit => split(arg(0), arg(1)),
        BuiltinFn::StringLength => match arg(0) {
            IrValue::String(s) => IrValue::Int(len_i64(s.chars().count())),
            _ => IrValue::Int(0),
        },
        BuiltinFn::ArrayLength => match arg(0) {
            IrValue::Array(items) => IrValue::Int(len_i64(items.len())),
            _ => IrValue::Int(0),
        },
        BuiltinFn::ArrayPush => match arg(0) {
            IrValue::Array(items) => {
                let mut items = items.clone();
                items.push(arg(1).clone());
                IrValue::Array(items)
            }
            _ => IrValue::Null,
        },
        BuiltinFn::ArrayPop => match arg(0) {
            IrValue::Array(items) => items.last().cloned().unwrap_or_default(),
            _ => IrValue::Null,
        },
        BuiltinFn::ArrayIndexOf => match arg(0) {
            IrValue::Array(items) => {
                let needle = arg(1);
                items
                    .iter()
                    .position(|item| item.strict_eq(needle))
                    .map_or(IrValue::Int(-1), |i| IrValue::Int(len_i64(i)))
            }
            _ => IrValue::Int(-1),
        },
        BuiltinFn::ArrayJoin => join(arg(0), args.get(1)),
        BuiltinFn::ArraySlice => slice(arg(0), arg(1), args.get(2)),
        BuiltinFn::ArrayReverse => match arg(0) {
            IrValue::Array(items) => IrValue::Array(items.iter().rev().cloned().collect()),
            _ => IrValue::Null,
        },
        BuiltinFn::MathAbs => match *arg(0) {
            IrValue::Int(v) => v.checked_abs().map_or(IrValue::Null, IrValue::Int),
            IrValue::Float(v) => IrValue::Float(v.abs()),
            _ => IrValue::Null,
        },
        BuiltinFn::MathMin => extremum(args, Ordering::Less),
        BuiltinFn::MathMax => extremum(args, Ordering::Greater),
        BuiltinFn::MathClamp => clamp(arg(0), arg(1), arg(2)),
        BuiltinFn::MathRandom => IrValue::Int(rand::thread_rng().gen_range(0..=RANDOM_MAX)),
        BuiltinFn::TypeToInt => to_int(arg(0)),
        BuiltinFn::TypeToString => IrValue::String(arg(0).to_string()),
        BuiltinFn::TypeOf => IrValue::String(arg(0).type_name().to_owned()),
    }
}

/// `__range__(start, end)`: the integers from `start` up to, but excluding,
/// `end`. A descending range is empty.
pub fn range(args: &[IrValue]) -> IrValue {
    let [IrValue::Int(start), IrValue::Int(end)] = args else {
        tracing::warn!(args = args.len(), "range bounds must be two integers");
        return IrValue::Null;
    };
    if end.saturating_sub(*start) > MAX_RANGE_LEN {
        tracing::warn!(start, end, "range exceeds {MAX_RANGE_LEN} elements");
        return IrValue::Null;
    }
    IrValue::Array((*start..*end).map(IrValue::Int).collect())
}

fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn map_str(value: &IrValue, f: impl FnOnce(&str) -> String) -> IrValue {
    match value {
        IrValue::String(s) => IrValue::String(f(s)),
        _ => IrValue::Null,
    }
}

/// Clamp a possibly negative index into `0..=len`.
fn clamp_index(index: i64, len: usize) -> usize {
    usize::try_from(index.max(0)).map_or(len, |i| i.min(len))
}

/// Resolve a slice bound where negative values count back from the end.
fn relative_index(index: i64, len: usize) -> usize {
    if index < 0 {
        let back = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(back)
    } else {
        clamp_index(index, len)
    }
}

/// Character-indexed substring; bounds are clamped to the string.
fn substring(value: &IrValue, start: &IrValue, end: Option<&IrValue>) -> IrValue {
    let (IrValue::String(s), IrValue::Int(start)) = (value, start) else {
        return IrValue::Null;
    };
    let len = s.chars().count();
    let start = clamp_index(*start, len);
    let end = match end {
        Some(IrValue::Int(end)) => clamp_index(*end, len),
        Some(IrValue::Null) | None => len,
        Some(_) => return IrValue::Null,
    };
    if end <= start {
        return IrValue::String(String::new());
    }
    IrValue::String(s.chars().skip(start).take(end - start).collect())
}

/// An empty delimiter splits into characters; otherwise empty pieces are
/// dropped, so `"a,,b"` splits into two.
fn split(value: &IrValue, delimiter: &IrValue) -> IrValue {
    let (IrValue::String(s), IrValue::String(delimiter)) = (value, delimiter) else {
        return IrValue::Null;
    };
    let pieces: Vec<IrValue> = if delimiter.is_empty() {
        s.chars().map(|c| IrValue::String(c.to_string())).collect()
    } else {
        s.split(delimiter.as_str())
            .filter(|piece| !piece.is_empty())
            .map(IrValue::from)
            .collect()
    };
    IrValue::Array(pieces)
}

fn join(value: &IrValue, separator: Option<&IrValue>) -> IrValue {
    let IrValue::Array(items) = value else {
        return IrValue::Null;
    };
    let separator = match separator {
        Some(IrValue::String(s)) => s.as_str(),
        _ => ",",
    };
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    IrValue::String(parts.join(separator))
}

fn slice(value: &IrValue, start: &IrValue, end: Option<&IrValue>) -> IrValue {
    let (IrValue::Array(items), IrValue::Int(start)) = (value, start) else {
        return IrValue::Null;
    };
    let len = items.len();
    let start = relative_index(*start, len);
    let end = match end {
        Some(IrValue::Int(end)) => relative_index(*end, len),
        Some(IrValue::Null) | None => len,
        Some(_) => return IrValue::Null,
    };
    match items.get(start..end) {
        Some(window) => IrValue::Array(window.to_vec()),
        None => IrValue::Array(Vec::new()),
    }
}

/// `math_min`/`math_max`: an int result when every argument is an int,
/// otherwise a float. Any non-numeric argument gives `Null`. Ties keep the
/// earlier argument.
fn extremum(args: &[IrValue], prefer: Ordering) -> IrValue {
    let mut ints = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            IrValue::Int(v) => ints.push(*v),
            _ => break,
        }
    }
    if ints.len() == args.len() {
        return ints
            .into_iter()
            .reduce(|best, v| if v.cmp(&best) == prefer { v } else { best })
            .map_or(IrValue::Null, IrValue::Int);
    }
    let mut best: Option<f64> = None;
    for arg in args {
        let Some(v) = arg.as_f64() else {
            return IrValue::Null;
        };
        best = Some(match best {
            Some(current) if v.partial_cmp(&current) != Some(prefer) => current,
            _ => v,
        });
    }
    best.map_or(IrValue::Null, IrValue::Float)
}

fn clamp(value: &IrValue, low: &IrValue, high: &IrValue) -> IrValue {
    match (value, low, high) {
        (IrValue::Int(v), IrValue::Int(lo), IrValue::Int(hi)) => {
            if lo > hi {
                IrValue::Null
            } else {
                IrValue::Int((*v).clamp(*lo, *hi))
            }
        }
        _ => match (value.as_f64(), low.as_f64(), high.as_f64()) {
            (Some(v), Some(lo), Some(hi)) if lo <= hi => IrValue::Float(v.clamp(lo, hi)),
            _ => IrValue::Null,
        },
    }
}

/// Integer conversion: floats truncate toward zero, strings read a leading
/// signed integer, booleans are `1`/`0`, everything else is `0`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "truncation toward zero is the conversion; out-of-range floats saturate"
)]
fn to_int(value: &IrValue) -> IrValue {
    IrValue::Int(match value {
        IrValue::Int(v) => *v,
        IrValue::Float(v) => *v as i64,
        IrValue::String(s) => leading_int(s),
        IrValue::Bool(b) => i64::from(*b),
        _ => 0,
    })
}

fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    };
    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }
    if negative {
        -value
    } else {
        value
    }
}
