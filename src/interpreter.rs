use std::cell::RefCell;
use std::io::{self, Stdout, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::{PulseError, Result};
use crate::token::{Token, TokenType};
use crate::value::{ArrayRef, Callable, NativeFn, NativeFunction, UserFunction, Value};

/// How a statement finished.
///
/// `return` is not an error: it travels up through enclosing blocks, `if`s
/// and loops as an ordinary value until the call that invoked the function
/// turns it into the call's result.  Errors travel separately in `Err`.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree‑walking evaluator.  `W` receives one line per executed `print`.
pub struct Interpreter<W: Write = Stdout> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    out: W,
}

impl Interpreter<Stdout> {
    /// Creates an interpreter printing to stdout, with native functions such
    /// as `clock` already defined.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Creates an interpreter writing `print` output to `out`.
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        let mut interpreter = Self {
            environment: globals.clone(),
            globals,
            out,
        };

        debug!("Defining native function 'clock'");

        interpreter.define_native("clock", 0, |_args: &[Value]| {
            let now = Utc::now();
            let seconds: f64 =
                now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0;

            Ok(Value::Number(seconds))
        });

        interpreter
    }

    /// Registers a host function in the global scope.
    pub fn define_native(&mut self, name: &str, arity: usize, func: NativeFn) {
        let native = NativeFunction {
            name: name.to_string(),
            arity,
            func,
        };

        self.globals
            .borrow_mut()
            .define(name, Value::Callable(Callable::Native(Rc::new(native))));
    }

    /// The global scope; bindings persist across `interpret` calls.
    pub fn globals(&self) -> Rc<RefCell<Environment>> {
        self.globals.clone()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error aborts the remaining statements and is returned to the caller.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                // A top-level `return` ends the unit.
                Ok(Flow::Return(value)) => {
                    debug!("Top-level return with {}", value);
                    break;
                }

                Err(e) => {
                    debug!("Runtime error aborts interpretation: {}", e);

                    return Err(e);
                }
            }
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.out, "{}", value)?;

                debug!("Printed value: {}", value);

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                // The initializer runs before the name exists in this scope.
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, Rc::new(RefCell::new(scope)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");

                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function = UserFunction {
                    declaration: declaration.clone(),
                    closure: self.environment.clone(),
                };

                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::User(Rc::new(function))),
                );

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                Ok(Flow::Return(value))
            }
        }
    }

    /// Runs `statements` with `scope` as the active environment, restoring
    /// the previous environment on every exit path.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        scope: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, scope);

        let result = self.execute_sequence(statements);

        self.environment = previous;

        result
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Variable(name) => self.environment.borrow().get(name),

            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;

                self.environment.borrow_mut().assign(name, value.clone())?;

                debug!("Assigned {} to '{}'", value, name.lexeme);

                Ok(value)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call(&callee, paren, args)
            }

            Expr::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }

                Ok(Value::new_array(values))
            }

            Expr::Subscript {
                object,
                bracket,
                index,
            } => {
                let (array, index) = self.subscript_target(object, bracket, index)?;
                let items = array.borrow();

                let slot = checked_index(index, items.len(), bracket)?;
                let value = items[slot].clone();

                Ok(value)
            }

            Expr::Set {
                object,
                bracket,
                index,
                value,
            } => {
                let (array, index) = self.subscript_target(object, bracket, index)?;
                let value = self.evaluate(value)?;

                let mut items = array.borrow_mut();
                let slot = checked_index(index, items.len(), bracket)?;

                items[slot] = value.clone();

                debug!("Stored {} at index {}", value, slot);

                Ok(value)
            }
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => {
                    debug!("Unary '-' applied to {}", other.type_name());

                    Err(PulseError::runtime(
                        operator,
                        format!("Operand of '{}' must be a number.", operator.lexeme),
                    ))
                }
            },

            _ => Err(PulseError::runtime(
                operator,
                format!("Invalid unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        );

        match operator.token_type {
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                (Value::String(a), Value::Number(b)) => {
                    Ok(Value::String(format!("{}{}", a, Value::Number(b))))
                }

                (Value::Number(a), Value::String(b)) => {
                    Ok(Value::String(format!("{}{}", Value::Number(a), b)))
                }

                _ => Err(PulseError::runtime(
                    operator,
                    "Operands of '+' must be numbers or strings.",
                )),
            },

            TokenType::SLASH => {
                // Zero divisor is reported ahead of any operand type mismatch.
                if matches!(right, Value::Number(b) if b == 0.0) {
                    return Err(PulseError::runtime(operator, "Division by zero."));
                }

                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Number(a / b))
            }

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Number(a * b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;

                Ok(Value::Bool(a <= b))
            }

            _ => Err(PulseError::runtime(
                operator,
                format!("Invalid binary operator '{}'.", operator.lexeme),
            )),
        }
    }

    /// Evaluates the array and index operands of `object[index]`.
    fn subscript_target(
        &mut self,
        object: &Expr,
        bracket: &Token,
        index: &Expr,
    ) -> Result<(ArrayRef, f64)> {
        let array = match self.evaluate(object)? {
            Value::Array(array) => array,
            other => {
                debug!("Subscript on {}", other.type_name());

                return Err(PulseError::runtime(
                    bracket,
                    "Only arrays can be subscripted.",
                ));
            }
        };

        match self.evaluate(index)? {
            Value::Number(n) => Ok((array, n)),
            _ => Err(PulseError::runtime(
                bracket,
                "Only numbers can be used to index an array.",
            )),
        }
    }

    /// Invokes a callable (native or user-defined function).
    fn call(&mut self, callee: &Value, paren: &Token, args: Vec<Value>) -> Result<Value> {
        let Value::Callable(callable) = callee else {
            return Err(PulseError::runtime(paren, "Can only call functions."));
        };

        if args.len() != callable.arity() {
            return Err(PulseError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    args.len()
                ),
            ));
        }

        debug!("Calling '{}' with {} argument(s)", callable.name(), args.len());

        match callable {
            Callable::Native(native) => {
                (native.func)(&args).map_err(|message| PulseError::runtime(paren, message))
            }

            Callable::User(function) => {
                self.call_function(&function.declaration, &function.closure, args)
            }
        }
    }

    fn call_function(
        &mut self,
        declaration: &FunctionDecl,
        closure: &Rc<RefCell<Environment>>,
        args: Vec<Value>,
    ) -> Result<Value> {
        // Parameters live in a fresh child of the *defining* scope.
        let mut scope = Environment::with_enclosing(closure.clone());

        for (param, arg) in declaration.params.iter().zip(args) {
            scope.define(&param.lexeme, arg);
        }

        match self.execute_block(&declaration.body, Rc::new(RefCell::new(scope)))? {
            Flow::Return(value) => {
                debug!("Function '{}' returned {}", declaration.name.lexeme, value);

                Ok(value)
            }

            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(PulseError::runtime(
            operator,
            format!("Operands of '{}' must be numbers.", operator.lexeme),
        )),
    }
}

/// Truncates `index` toward zero and checks it against `len`.  Negative and
/// non‑finite indices are out of range.
fn checked_index(index: f64, len: usize, bracket: &Token) -> Result<usize> {
    let index = index.trunc();

    if index.is_finite() && index >= 0.0 && index < len as f64 {
        Ok(index as usize)
    } else {
        Err(PulseError::runtime(bracket, "Array index out of range."))
    }
}
