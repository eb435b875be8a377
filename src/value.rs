use std::fmt;
use std::rc::Rc;

use crate::evaluator::StoryboardDef;

/// A runtime value. Numbers are always 64-bit floats; the language has no
/// separate integer representation.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Char(char),
    Storyboard(Rc<StoryboardDef>),
}

impl Value {
    /// `nil` is false, a boolean is itself, everything else (zero included)
    /// is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Char(_) => "char",
            Value::Storyboard(_) => "storyboard",
        }
    }
}

/// Structural equality: `nil` equals only `nil`, cross-type comparisons are
/// false, storyboards compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Char(l), Value::Char(r)) => l == r,
            (Value::Storyboard(l), Value::Storyboard(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // Whole numbers print in integer form, without a trailing .0.
                // Past the i64 range the cast would saturate, so magnitudes
                // of 2^63 and beyond keep the float rendering.
                if n.fract() == 0.0 && n.abs() < 9.223_372_036_854_776e18 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Char(c) => write!(f, "{}", c),
            Value::Storyboard(sb) => write!(f, "<storyboard {}>", sb.name),
        }
    }
}
