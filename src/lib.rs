pub mod brain;
pub mod format;
pub mod keys;
pub mod operation;

pub use brain::{CalculatorBrain, Ignored, Outcome};
pub use keys::Keys;
pub use operation::{Operation, OperationTable, Position};

use keys::{KeyKind, UnknownSymbolError};

/// Feeds one line of keypad input into `brain`.
///
/// Unknown symbols are skipped like any other ignored key unless `strict`
/// is set, in which case the line stops at the first one with an
/// [`UnknownSymbolError`]. Keys before it have already been applied.
pub fn evaluate_line(
    brain: &mut CalculatorBrain,
    filename: Option<&str>,
    line: &str,
    strict: bool,
) -> Result<(), miette::Error> {
    let mut keys = Keys::new(filename, line);
    while let Some(key) = keys.next() {
        let key = key?;
        log::trace!("{key}");
        match key.kind {
            KeyKind::Operand(value) => brain.set_operand(value),
            KeyKind::Symbol => {
                if strict && !brain.operations().contains(key.literal) {
                    return Err(UnknownSymbolError::build(&keys, &key).into());
                }
                if let Outcome::Ignored(reason) = brain.perform_operation(key.literal) {
                    log::info!("skipped `{}` at byte {}: {reason}", key.literal, key.offset);
                }
            }
        }
    }
    Ok(())
}

/// The result line followed by the display description, as the `calc`
/// binary prints them.
pub fn render(brain: &CalculatorBrain) -> String {
    let (result, _) = brain.result();
    format!("{result}\n{}", brain.display_description())
}
