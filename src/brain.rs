use log::debug;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    format::format_number,
    operation::{Operation, OperationTable},
};

/// Why an input left the brain untouched.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum Ignored {
    #[error("unknown symbol `{0}`")]
    #[diagnostic(help("run `calc symbols` to list the keypad"))]
    UnknownSymbol(String),

    #[error("`{0}` needs an operand first")]
    MissingOperand(String),

    #[error("`{0}` has no pending operation to finish")]
    NothingPending(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Ignored(Ignored),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// A value together with the text that produced it.
#[derive(Debug, Clone, PartialEq)]
struct Operand {
    value: f64,
    description: String,
}

#[derive(Debug, Clone)]
struct PendingBinaryOperation {
    function: fn(f64, f64) -> f64,
    symbol: String,
    first: Operand,
}

impl PendingBinaryOperation {
    fn perform(self, second: Operand) -> Operand {
        Operand {
            value: (self.function)(self.first.value, second.value),
            description: self.describe(&second.description),
        }
    }

    fn describe(&self, second: &str) -> String {
        if second.is_empty() {
            format!("{} {}", self.first.description, self.symbol)
        } else {
            format!("{} {} {second}", self.first.description, self.symbol)
        }
    }
}

/// Keypad evaluator: one accumulator, at most one pending binary operation,
/// no precedence.
#[derive(Debug, Clone)]
pub struct CalculatorBrain {
    operations: OperationTable,
    accumulator: Option<Operand>,
    pending: Option<PendingBinaryOperation>,
}

impl Default for CalculatorBrain {
    fn default() -> Self {
        Self::with_operations(OperationTable::standard())
    }
}

impl CalculatorBrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operations(operations: OperationTable) -> Self {
        CalculatorBrain {
            operations,
            accumulator: None,
            pending: None,
        }
    }

    pub fn operations(&self) -> &OperationTable {
        &self.operations
    }

    pub fn set_operand(&mut self, value: f64) {
        debug!("operand {value}");
        self.accumulator = Some(Operand {
            value,
            description: format_number(value),
        });
    }

    pub fn perform_operation(&mut self, symbol: &str) -> Outcome {
        let Some(operation) = self.operations.get(symbol) else {
            return ignore(Ignored::UnknownSymbol(symbol.to_string()));
        };
        debug!("{symbol}: {operation}");

        match operation {
            Operation::Constant(value) => {
                self.accumulator = Some(Operand {
                    value,
                    description: symbol.to_string(),
                });
            }
            Operation::Unary(function, position) => {
                let Some(operand) = self.accumulator.as_mut() else {
                    return ignore(Ignored::MissingOperand(symbol.to_string()));
                };
                operand.value = function(operand.value);
                operand.description = position.wrap(&operand.description);
            }
            Operation::Binary(function) => {
                let Some(operand) = self.accumulator.take() else {
                    return ignore(Ignored::MissingOperand(symbol.to_string()));
                };
                let first = match self.pending.take() {
                    Some(pending) => pending.perform(operand),
                    None => operand,
                };
                self.pending = Some(PendingBinaryOperation {
                    function,
                    symbol: symbol.to_string(),
                    first,
                });
            }
            Operation::Clear => {
                self.accumulator = None;
                self.pending = None;
            }
            Operation::Equals => {
                let Some(pending) = self.pending.take() else {
                    return ignore(Ignored::NothingPending(symbol.to_string()));
                };
                let Some(operand) = self.accumulator.take() else {
                    self.pending = Some(pending);
                    return ignore(Ignored::MissingOperand(symbol.to_string()));
                };
                self.accumulator = Some(pending.perform(operand));
            }
        }
        Outcome::Applied
    }

    pub fn accumulator(&self) -> Option<f64> {
        self.accumulator.as_ref().map(|operand| operand.value)
    }

    /// The accumulator (or `0.0` when absent) and the description.
    pub fn result(&self) -> (f64, String) {
        (self.accumulator().unwrap_or_default(), self.description())
    }

    pub fn result_is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn description(&self) -> String {
        let accumulator = self
            .accumulator
            .as_ref()
            .map(|operand| operand.description.as_str())
            .unwrap_or_default();
        match &self.pending {
            Some(pending) => pending.describe(accumulator),
            None => accumulator.to_string(),
        }
    }

    /// The description as shown under the display: ` ...` while a binary
    /// operation is pending, ` =` once it is resolved.
    pub fn display_description(&self) -> String {
        let description = self.description();
        if description.is_empty() {
            " ".to_string()
        } else if self.result_is_pending() {
            format!("{description} ...")
        } else {
            format!("{description} =")
        }
    }
}

fn ignore(reason: Ignored) -> Outcome {
    debug!("ignored: {reason}");
    Outcome::Ignored(reason)
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::operation::Position;

    fn run(brain: &mut CalculatorBrain, keys: &[&str]) {
        for key in keys {
            match key.parse::<f64>() {
                Ok(value) => brain.set_operand(value),
                Err(_) => {
                    brain.perform_operation(key);
                }
            }
        }
    }

    #[test]
    fn adds_two_operands() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["5", "+", "3", "="]);
        assert_eq!(brain.result(), (8.0, "5 + 3".to_string()));
        assert!(!brain.result_is_pending());
    }

    #[test]
    fn constant_pi() {
        let mut brain = CalculatorBrain::new();
        assert!(brain.perform_operation("π").is_applied());
        let (value, description) = brain.result();
        assert_float_eq!(value, 3.14159, abs <= 1e-5);
        assert_eq!(description, "π");
    }

    #[test]
    fn square_root() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["4", "√"]);
        assert_eq!(brain.result(), (2.0, "√(4)".to_string()));
    }

    #[test]
    fn clear_resets_everything() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["7", "+", "2"]);
        assert!(brain.perform_operation("C").is_applied());
        assert_eq!(brain.result(), (0.0, String::new()));
        assert!(!brain.result_is_pending());
        assert_eq!(brain.accumulator(), None);
    }

    #[test]
    fn chained_binaries_fold_left_to_right() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["2", "+", "3", "×", "4", "="]);
        assert_eq!(brain.result(), (20.0, "2 + 3 × 4".to_string()));

        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["2", "+", "3", "+", "4", "="]);
        assert_eq!(brain.result().0, 9.0);
    }

    #[test]
    fn pending_operation_hides_accumulator() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["5", "+"]);
        assert!(brain.result_is_pending());
        assert_eq!(brain.accumulator(), None);
        assert_eq!(brain.result(), (0.0, "5 +".to_string()));
        assert_eq!(brain.display_description(), "5 + ...");
    }

    #[test]
    fn unary_on_second_operand() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["7", "+", "9", "√"]);
        assert_eq!(brain.description(), "7 + √(9)");
        assert_eq!(brain.display_description(), "7 + √(9) ...");
        run(&mut brain, &["="]);
        assert_eq!(brain.result(), (10.0, "7 + √(9)".to_string()));
        assert_eq!(brain.display_description(), "7 + √(9) =");
    }

    #[test]
    fn unary_wraps_resolved_expression() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["7", "+", "9", "=", "√"]);
        assert_eq!(brain.result(), (4.0, "√(7 + 9)".to_string()));
    }

    #[test]
    fn postfix_unary() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["5", "x²"]);
        assert_eq!(brain.result(), (25.0, "(5)²".to_string()));
    }

    #[test]
    fn constant_replaces_operand_inside_pending() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["2", "×", "π", "="]);
        let (value, description) = brain.result();
        assert_float_eq!(value, std::f64::consts::TAU, ulps <= 1);
        assert_eq!(description, "2 × π");
    }

    #[test]
    fn new_operand_after_equals_starts_over() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, &["5", "+", "3", "=", "6"]);
        assert_eq!(brain.result(), (6.0, "6".to_string()));
        assert_eq!(brain.display_description(), "6 =");
    }

    #[test]
    fn unknown_symbol_is_ignored() {
        let mut brain = CalculatorBrain::new();
        brain.set_operand(3.0);
        assert_eq!(
            brain.perform_operation("%"),
            Outcome::Ignored(Ignored::UnknownSymbol("%".to_string()))
        );
        assert_eq!(brain.result(), (3.0, "3".to_string()));
    }

    #[test]
    fn operations_without_operand_are_ignored() {
        let mut brain = CalculatorBrain::new();
        assert_eq!(
            brain.perform_operation("√"),
            Outcome::Ignored(Ignored::MissingOperand("√".to_string()))
        );
        assert_eq!(
            brain.perform_operation("+"),
            Outcome::Ignored(Ignored::MissingOperand("+".to_string()))
        );

        run(&mut brain, &["5", "+"]);
        assert_eq!(
            brain.perform_operation("√"),
            Outcome::Ignored(Ignored::MissingOperand("√".to_string()))
        );
        assert!(brain.result_is_pending());
        assert_eq!(
            brain.perform_operation("×"),
            Outcome::Ignored(Ignored::MissingOperand("×".to_string()))
        );
        assert_eq!(
            brain.perform_operation("="),
            Outcome::Ignored(Ignored::MissingOperand("=".to_string()))
        );
        assert_eq!(brain.description(), "5 +");
    }

    #[test]
    fn equals_without_pending_is_ignored() {
        let mut brain = CalculatorBrain::new();
        brain.set_operand(4.0);
        assert_eq!(
            brain.perform_operation("="),
            Outcome::Ignored(Ignored::NothingPending("=".to_string()))
        );
        assert_eq!(brain.result(), (4.0, "4".to_string()));
    }

    #[test]
    fn empty_brain_display() {
        let brain = CalculatorBrain::new();
        assert_eq!(brain.result(), (0.0, String::new()));
        assert_eq!(brain.display_description(), " ");
    }

    #[test]
    fn custom_operations() {
        let mut table = OperationTable::empty();
        table.insert("^", Operation::Binary(f64::powf));
        table.insert(
            "!",
            Operation::Unary(
                |x| (1..=x as u64).product::<u64>() as f64,
                Position::Postfix("!"),
            ),
        );
        table.insert("=", Operation::Equals);

        let mut brain = CalculatorBrain::with_operations(table);
        run(&mut brain, &["2", "^", "3", "=", "!"]);
        assert_eq!(brain.result(), (40320.0, "(2 ^ 3)!".to_string()));
        assert!(!brain.perform_operation("+").is_applied());
    }
}
