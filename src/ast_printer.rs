use crate::ast::{Expr, LiteralValue, Stmt};

/// Converts syntax trees to a parenthesised prefix form, e.g.
/// `(+ 1.0 (group 2.0))`.  Used by the `parse` command.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            // ── unary operator ──────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            // ── binary / logical operators ──────────────────────────────
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            // ── variables ───────────────────────────────────────────────
            Expr::Variable(name) => name.lexeme.clone(),

            Expr::Assign { name, value } => format!("(= {} {})", name.lexeme, Self::print(value)),

            // ── calls and arrays ────────────────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => Self::list(&format!("call {}", Self::print(callee)), arguments),

            Expr::Array { elements, .. } => Self::list("array", elements),

            Expr::Subscript { object, index, .. } => {
                format!("(index {} {})", Self::print(object), Self::print(index))
            }

            Expr::Set {
                object,
                index,
                value,
                ..
            } => format!(
                "(set {} {} {})",
                Self::print(object),
                Self::print(index),
                Self::print(value)
            ),
        }
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => Self::block("block", statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print(condition),
                Self::print_stmt(body)
            ),

            Stmt::Function(decl) => {
                let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();

                Self::block(
                    &format!("fun {}({})", decl.name.lexeme, params.join(" ")),
                    &decl.body,
                )
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print(value)),
                None => "(return)".into(),
            },
        }
    }

    fn list(head: &str, items: &[Expr]) -> String {
        let mut s = format!("({}", head);
        for item in items {
            s.push(' ');
            s.push_str(&Self::print(item));
        }
        s.push(')');
        s
    }

    fn block(head: &str, statements: &[Stmt]) -> String {
        let mut s = format!("({}", head);
        for stmt in statements {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }
}
