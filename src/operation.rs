use std::{collections::HashMap, fmt::Display};

/// Where a unary operation's label goes when it wraps a description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// `label(operand)`, e.g. `√(9)`
    Prefix(&'static str),
    /// `(operand)label`, e.g. `(5)²`
    Postfix(&'static str),
}

impl Position {
    pub fn wrap(&self, operand: &str) -> String {
        match self {
            Position::Prefix(label) => format!("{label}({operand})"),
            Position::Postfix(label) => format!("({operand}){label}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Constant(f64),
    Unary(fn(f64) -> f64, Position),
    Binary(fn(f64, f64) -> f64),
    Clear,
    Equals,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Constant(value) => write!(f, "constant {value}"),
            Operation::Unary(_, Position::Prefix(label)) => write!(f, "unary {label}(x)"),
            Operation::Unary(_, Position::Postfix(label)) => write!(f, "unary (x){label}"),
            Operation::Binary(_) => write!(f, "binary"),
            Operation::Clear => write!(f, "clear"),
            Operation::Equals => write!(f, "equals"),
        }
    }
}

/// Symbol to operation lookup used by [`crate::CalculatorBrain`].
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    operations: HashMap<String, Operation>,
}

impl OperationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The keypad of the calculator, plus ASCII spellings for typing.
    pub fn standard() -> Self {
        let mut table = Self::empty();

        table.insert("π", Operation::Constant(std::f64::consts::PI));
        table.insert("pi", Operation::Constant(std::f64::consts::PI));
        table.insert("e", Operation::Constant(std::f64::consts::E));

        table.insert("√", Operation::Unary(f64::sqrt, Position::Prefix("√")));
        table.insert("sqrt", Operation::Unary(f64::sqrt, Position::Prefix("√")));
        table.insert("cos", Operation::Unary(f64::cos, Position::Prefix("cos")));
        table.insert("sin", Operation::Unary(f64::sin, Position::Prefix("sin")));
        table.insert("tan", Operation::Unary(f64::tan, Position::Prefix("tan")));
        table.insert("ln", Operation::Unary(f64::ln, Position::Prefix("ln")));
        table.insert("±", Operation::Unary(|x| -x, Position::Prefix("-")));
        table.insert("x²", Operation::Unary(|x| x * x, Position::Postfix("²")));
        table.insert("x⁻¹", Operation::Unary(f64::recip, Position::Postfix("⁻¹")));

        table.insert("×", Operation::Binary(|lhs, rhs| lhs * rhs));
        table.insert("*", Operation::Binary(|lhs, rhs| lhs * rhs));
        table.insert("÷", Operation::Binary(|lhs, rhs| lhs / rhs));
        table.insert("/", Operation::Binary(|lhs, rhs| lhs / rhs));
        table.insert("+", Operation::Binary(|lhs, rhs| lhs + rhs));
        table.insert("−", Operation::Binary(|lhs, rhs| lhs - rhs));
        table.insert("-", Operation::Binary(|lhs, rhs| lhs - rhs));

        table.insert("=", Operation::Equals);
        table.insert("C", Operation::Clear);
        table.insert("c", Operation::Clear);

        table
    }

    /// Registers `symbol`, returning the operation it replaced if any.
    pub fn insert(&mut self, symbol: impl Into<String>, operation: Operation) -> Option<Operation> {
        self.operations.insert(symbol.into(), operation)
    }

    pub fn get(&self, symbol: &str) -> Option<Operation> {
        self.operations.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.operations.contains_key(symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}
