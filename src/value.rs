//! Runtime value domain.
//!
//! `Value` is a closed, dynamically tagged union.  Arrays and callables are
//! handles: cloning a `Value::Array` clones the `Rc`, never the elements, so
//! every binding that received the same array observes writes made through
//! any other.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::Environment;

/// Host operation behind a [`NativeFunction`].  A returned `Err` becomes a
/// runtime error attributed to the call site.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

/// Shared, mutable array storage.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Identity of an array's storage, for cycle checks.
type ArrayPtr = *const RefCell<Vec<Value>>;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Callable(Callable),
}

/// Anything that can appear on the left of a call's parentheses.
#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    User(Rc<UserFunction>),
}

/// A host‑provided function with a fixed arity and no AST.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

/// A function declared in source, paired with the environment that was
/// active where the declaration executed.
pub struct UserFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::User(function) => function.declaration.params.len(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Native(native) => &native.name,
            Callable::User(function) => &function.declaration.name.lexeme,
        }
    }

    /// Identity comparison: two callables are equal only if they are the
    /// same function object.
    fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::User(a), Callable::User(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// The closure environment usually contains this very function, so a derived
// `Debug` would recurse forever.
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}/{}>", native.name, native.arity),
            Callable::User(function) => write!(
                f,
                "<fn {}/{}>",
                function.declaration.name.lexeme,
                function.declaration.params.len()
            ),
        }
    }
}

impl Value {
    /// `nil` and `false` are falsy; everything else, including `0` and `""`,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Callable(_) => "function",
        }
    }

    /// Wrap freshly evaluated elements in new, unshared storage.
    pub fn new_array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }
}

/// Equality is total over the value domain and never fails.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, &mut Vec::new())
    }
}

impl Value {
    /// `comparing` holds the array pairs already being compared further up;
    /// meeting one again is treated as equal so cyclic arrays terminate.
    fn equals(&self, other: &Value, comparing: &mut Vec<(ArrayPtr, ArrayPtr)>) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,

            (Value::Array(a), Value::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }

                let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
                if comparing.contains(&pair) {
                    return true;
                }

                let (left, right) = (a.borrow(), b.borrow());
                if left.len() != right.len() {
                    return false;
                }

                comparing.push(pair);
                let same = left
                    .iter()
                    .zip(right.iter())
                    .all(|(x, y)| x.equals(y, comparing));
                comparing.pop();

                same
            }

            (Value::Callable(a), Value::Callable(b)) => a.same_as(b),
            _ => false,
        }
    }

    /// Writes the canonical text.  `open` lists arrays currently being
    /// written; an array that contains itself prints as `[...]` inside.
    fn render(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<ArrayPtr>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write_number(f, *n),

            Value::String(s) => write!(f, "{}", s),

            Value::Array(items) => {
                let ptr = Rc::as_ptr(items);
                if open.contains(&ptr) {
                    return write!(f, "[...]");
                }

                open.push(ptr);
                write!(f, "[")?;

                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }

                    item.render(f, open)?;
                }

                open.pop();
                write!(f, "]")
            }

            Value::Callable(Callable::Native(_)) => write!(f, "<native fn>"),

            Value::Callable(Callable::User(function)) => {
                write!(f, "<fn {}>", function.declaration.name.lexeme)
            }
        }
    }
}

/// Integral values drop the fraction; infinities and NaN use the
/// `Infinity`/`-Infinity`/`NaN` spellings.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 {
        write!(f, "{:.0}", n)
    } else {
        write!(f, "{}", n)
    }
}

/// Canonical text form, used both by `print` and by string concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new())
    }
}
