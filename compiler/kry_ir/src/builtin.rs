//! Names of the builtin function library.
//!
//! The IR converter resolves call names against this closed set once, so the
//! evaluator dispatches on an enum instead of comparing strings. Names outside
//! the set become [`Callee::Named`](crate::Callee::Named) calls that are looked
//! up in the runtime registry.

use std::fmt;

/// Arity and purity of a builtin.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BuiltinSig {
    pub min_args: u8,
    /// Zero means unbounded.
    pub max_args: u8,
    pub pure: bool,
}

impl BuiltinSig {
    pub const fn new(min_args: u8, max_args: u8, pure: bool) -> Self {
        BuiltinSig {
            min_args,
            max_args,
            pure,
        }
    }

    /// `true` when `count` arguments satisfy this signature.
    pub fn accepts(self, count: usize) -> bool {
        count >= usize::from(self.min_args)
            && (self.max_args == 0 || count <= usize::from(self.max_args))
    }
}

macro_rules! builtins {
    ($($variant:ident => $name:literal, $min:literal, $max:literal, $pure:literal;)*) => {
        /// The seeded builtin library.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum BuiltinFn {
            $($variant,)*
        }

        impl BuiltinFn {
            pub const ALL: &'static [BuiltinFn] = &[$(BuiltinFn::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(BuiltinFn::$variant => $name,)*
                }
            }

            pub fn sig(self) -> BuiltinSig {
                match self {
                    $(BuiltinFn::$variant => BuiltinSig::new($min, $max, $pure),)*
                }
            }

            pub fn from_name(name: &str) -> Option<BuiltinFn> {
                match name {
                    $($name => Some(BuiltinFn::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

builtins! {
    StringToUpper => "string_toUpper", 1, 1, true;
    StringToLower => "string_toLower", 1, 1, true;
    StringTrim => "string_trim", 1, 1, true;
    StringSubstring => "string_substring", 2, 3, true;
    StringSplit => "string_split", 2, 2, true;
    StringLength => "string_length", 1, 1, true;
    ArrayLength => "array_length", 1, 1, true;
    ArrayPush => "array_push", 2, 2, false;
    ArrayPop => "array_pop", 1, 1, false;
    ArrayIndexOf => "array_indexOf", 2, 2, true;
    ArrayJoin => "array_join", 1, 2, true;
    ArraySlice => "array_slice", 2, 3, true;
    ArrayReverse => "array_reverse", 1, 1, false;
    MathAbs => "math_abs", 1, 1, true;
    MathMin => "math_min", 1, 0, true;
    MathMax => "math_max", 1, 0, true;
    MathClamp => "math_clamp", 3, 3, true;
    MathRandom => "math_random", 0, 0, false;
    TypeToInt => "type_toInt", 1, 1, true;
    TypeToString => "type_toString", 1, 1, true;
    TypeOf => "type_typeof", 1, 1, true;
}

impl BuiltinFn {
    /// Builtin behind a method call on a string receiver (`s.trim()`).
    pub fn string_method(method: &str) -> Option<BuiltinFn> {
        match method {
            "length" => Some(BuiltinFn::StringLength),
            "toUpper" | "toUpperCase" => Some(BuiltinFn::StringToUpper),
            "toLower" | "toLowerCase" => Some(BuiltinFn::StringToLower),
            "trim" => Some(BuiltinFn::StringTrim),
            "substring" => Some(BuiltinFn::StringSubstring),
            "split" => Some(BuiltinFn::StringSplit),
            _ => None,
        }
    }

    /// Builtin behind a method call on an array receiver (`xs.push(1)`).
    pub fn array_method(method: &str) -> Option<BuiltinFn> {
        match method {
            "length" => Some(BuiltinFn::ArrayLength),
            "push" => Some(BuiltinFn::ArrayPush),
            "pop" => Some(BuiltinFn::ArrayPop),
            "indexOf" => Some(BuiltinFn::ArrayIndexOf),
            "join" => Some(BuiltinFn::ArrayJoin),
            "slice" => Some(BuiltinFn::ArraySlice),
            "reverse" => Some(BuiltinFn::ArrayReverse),
            _ => None,
        }
    }
}

impl fmt::Display for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reserved two-argument constructor that range literals desugar into.
pub const RANGE_CONSTRUCTOR: &str = "__range__";
