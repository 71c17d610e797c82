//! The immediate-execution calculator engine.
//!
//! The engine owns every piece of numeric state. Callers send commands and
//! read back two display lines afterwards: the history line (the operation in
//! progress or just completed) and the current line (the number being typed,
//! a result, or an error message).

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use super::buffer::InputBuffer;
use super::command::{Command, parse_keys};
use super::decimal;
use super::error::{ArithmeticError, CalcError};
use super::operation::{BinaryOperator, Digit, UnaryOperation};
use crate::display::DisplaySnapshot;

/// Why a command on the editing session did not complete.
enum Fault {
    /// The caller broke the contract; state is untouched.
    Misuse(CalcError),
    /// A math error; the engine switches to error mode.
    Arithmetic(ArithmeticError),
}

impl From<CalcError> for Fault {
    fn from(err: CalcError) -> Self {
        Self::Misuse(err)
    }
}

impl From<ArithmeticError> for Fault {
    fn from(err: ArithmeticError) -> Self {
        Self::Arithmetic(err)
    }
}

/// State of a calculation that has not hit an arithmetic error.
#[derive(Clone, Debug)]
struct Session {
    buffer: InputBuffer,
    accumulator: BigDecimal,
    pending: Option<BinaryOperator>,
    /// Next digit or decimal point starts a new number instead of appending.
    reset_on_next_digit: bool,
    history: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            buffer: InputBuffer::default(),
            accumulator: BigDecimal::zero(),
            pending: None,
            reset_on_next_digit: true,
            history: String::new(),
        }
    }
}

impl Session {
    fn start_fresh_if_needed(&mut self) {
        if self.reset_on_next_digit {
            self.buffer.clear();
            self.reset_on_next_digit = false;
        }
    }

    fn input_digit(&mut self, digit: Digit) {
        self.start_fresh_if_needed();
        self.buffer.push_digit(digit);
    }

    fn input_decimal_point(&mut self) {
        self.start_fresh_if_needed();
        self.buffer.push_decimal_point();
    }

    fn apply_binary_operator(&mut self, op: BinaryOperator) -> Result<(), Fault> {
        // Operator pressed twice in a row: swap it, nothing to compute.
        if self.pending.is_some() && self.reset_on_next_digit {
            self.pending = Some(op);
            self.history = format!("{} {}", decimal::format(&self.accumulator), op);
            return Ok(());
        }

        let input = self.buffer.value()?;
        self.accumulator = match self.pending {
            None => input,
            Some(pending) => pending.apply(&self.accumulator, &input)?,
        };
        self.pending = Some(op);
        self.history = format!("{} {}", decimal::format(&self.accumulator), op);
        self.reset_on_next_digit = true;
        Ok(())
    }

    fn evaluate(&mut self) -> Result<(), Fault> {
        let Some(op) = self.pending else {
            self.history.clear();
            return Ok(());
        };

        let right = self.buffer.value()?;
        let result = op.apply(&self.accumulator, &right)?;

        self.history = format!(
            "{} {} {} =",
            decimal::format(&self.accumulator),
            op,
            decimal::format(&right)
        );
        self.show_result(&result);
        self.accumulator = result;
        self.pending = None;
        Ok(())
    }

    fn apply_unary_operation(&mut self, op: UnaryOperation) -> Result<(), Fault> {
        let value = self.buffer.value()?;

        match op {
            UnaryOperation::SquareRoot => {
                let root = decimal::sqrt(&value)?;
                self.history = format!("\u{221a}({})", decimal::format(&value));
                self.show_result(&root);
            }
            UnaryOperation::Reciprocal => {
                let reciprocal = decimal::div(&BigDecimal::one(), &value)?;
                self.history = format!("1/({})", decimal::format(&value));
                self.show_result(&reciprocal);
            }
            UnaryOperation::Percent => {
                let hundred = BigDecimal::from(100);
                let percent = match self.pending {
                    None => decimal::div(&value, &hundred)?,
                    Some(pending) => {
                        let percent =
                            decimal::div(&decimal::mul(&self.accumulator, &value), &hundred)?;
                        self.history = format!(
                            "{} {} {}",
                            decimal::format(&self.accumulator),
                            pending,
                            decimal::format(&percent)
                        );
                        percent
                    }
                };
                self.show_result(&percent);
            }
            UnaryOperation::Negate => {
                // Keep "0" from turning into "-0".
                if value.is_zero() && !self.buffer.has_decimal_point() {
                    return Ok(());
                }
                self.buffer.overwrite(decimal::format(&decimal::round(&-value)));
                self.reset_on_next_digit = false;
            }
        }
        Ok(())
    }

    fn clear_entry(&mut self) {
        self.buffer.clear();
        self.reset_on_next_digit = false;
    }

    fn backspace(&mut self) {
        if self.reset_on_next_digit {
            self.clear_entry();
        } else {
            self.buffer.truncate_last();
        }
    }

    fn show_result(&mut self, value: &BigDecimal) {
        self.buffer.overwrite(decimal::format(value));
        self.reset_on_next_digit = true;
    }
}

#[derive(Clone, Debug)]
enum Mode {
    Editing(Session),
    /// Latched until `clear_entry` or `clear_all`.
    Error(ArithmeticError),
}

/// Calculator state machine.
///
/// Not meant for concurrent use: callers issue one command at a time and
/// re-read [`Engine::current_display`] and [`Engine::history_display`] after
/// each.
#[derive(Clone, Debug)]
pub struct Engine {
    mode: Mode,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            mode: Mode::Editing(Session::default()),
        }
    }

    /// Type a digit. Digits outside 0-9 are rejected even in error mode.
    pub fn input_digit(&mut self, digit: u8) -> Result<(), CalcError> {
        let digit = Digit::try_from(digit)?;
        self.edit(|session| {
            session.input_digit(digit);
            Ok(())
        })
    }

    pub fn input_decimal_point(&mut self) {
        self.edit_infallible(Session::input_decimal_point);
    }

    /// Press `+`, `-`, `×` or `÷`, computing any pending operation first.
    pub fn apply_binary_operator(&mut self, op: BinaryOperator) -> Result<(), CalcError> {
        self.edit(|session| session.apply_binary_operator(op))
    }

    /// Press `=`.
    pub fn evaluate(&mut self) -> Result<(), CalcError> {
        self.edit(Session::evaluate)
    }

    pub fn apply_unary_operation(&mut self, op: UnaryOperation) -> Result<(), CalcError> {
        self.edit(|session| session.apply_unary_operation(op))
    }

    /// `CE`: discard the number being typed. Acts as `C` in error mode.
    pub fn clear_entry(&mut self) {
        if self.is_error_state() {
            self.clear_all();
        } else {
            self.edit_infallible(Session::clear_entry);
        }
    }

    /// `C`: back to power-on state.
    pub fn clear_all(&mut self) {
        tracing::trace!("clearing all state");
        self.mode = Mode::Editing(Session::default());
    }

    pub fn backspace(&mut self) {
        self.edit_infallible(Session::backspace);
    }

    pub fn execute(&mut self, command: Command) -> Result<(), CalcError> {
        tracing::trace!(?command, "executing command");
        match command {
            Command::Digit(digit) => self.input_digit(digit.value()),
            Command::DecimalPoint => {
                self.input_decimal_point();
                Ok(())
            }
            Command::Binary(op) => self.apply_binary_operator(op),
            Command::Evaluate => self.evaluate(),
            Command::Unary(op) => self.apply_unary_operation(op),
            Command::ClearEntry => {
                self.clear_entry();
                Ok(())
            }
            Command::ClearAll => {
                self.clear_all();
                Ok(())
            }
            Command::Backspace => {
                self.backspace();
                Ok(())
            }
        }
    }

    /// Press a single key by its label, e.g. `"7"`, `"\u{d7}"` or `"CE"`.
    pub fn press(&mut self, key: &str) -> Result<(), CalcError> {
        self.execute(Command::from_key(key)?)
    }

    /// Press every key in a typed line such as `"12 + 3 ="`.
    ///
    /// The whole line is resolved before any key is pressed, so an unknown
    /// key leaves the engine untouched.
    pub fn press_line(&mut self, line: &str) -> Result<(), CalcError> {
        for command in parse_keys(line)? {
            self.execute(command)?;
        }
        Ok(())
    }

    /// The number being typed, the last result, or the error message.
    pub fn current_display(&self) -> String {
        match &self.mode {
            Mode::Editing(session) => session.buffer.as_str().to_string(),
            Mode::Error(err) => err.to_string(),
        }
    }

    /// The history line; blank in error mode.
    pub fn history_display(&self) -> &str {
        match &self.mode {
            Mode::Editing(session) => &session.history,
            Mode::Error(_) => "",
        }
    }

    pub fn is_error_state(&self) -> bool {
        matches!(self.mode, Mode::Error(_))
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            history: self.history_display().to_string(),
            current: self.current_display(),
            is_error: self.is_error_state(),
        }
    }

    fn edit<F>(&mut self, command: F) -> Result<(), CalcError>
    where
        F: FnOnce(&mut Session) -> Result<(), Fault>,
    {
        let Mode::Editing(session) = &mut self.mode else {
            tracing::trace!("ignoring command while in error mode");
            return Ok(());
        };

        match command(session) {
            Ok(()) => Ok(()),
            Err(Fault::Misuse(err)) => Err(err),
            Err(Fault::Arithmetic(err)) => {
                tracing::debug!(error = %err, "entering error mode");
                self.mode = Mode::Error(err);
                Ok(())
            }
        }
    }

    fn edit_infallible(&mut self, command: fn(&mut Session)) {
        if let Mode::Editing(session) = &mut self.mode {
            command(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_after(line: &str) -> Engine {
        let mut engine = Engine::new();
        engine.press_line(line).unwrap();
        engine
    }

    #[test]
    fn test_power_on_state() {
        let engine = Engine::new();
        assert_eq!(engine.current_display(), "0");
        assert_eq!(engine.history_display(), "");
        assert!(!engine.is_error_state());
    }

    #[test]
    fn test_digits_without_leading_zeros() {
        assert_eq!(engine_after("0 0 1 2 0").current_display(), "120");
        assert_eq!(engine_after("0 0 0").current_display(), "0");
        assert_eq!(engine_after("0 . 0 5").current_display(), "0.05");
    }

    #[test]
    fn test_decimal_point_once() {
        assert_eq!(engine_after(". . 5 . 2").current_display(), "0.52");
    }

    #[test]
    fn test_comma_types_decimal_point() {
        assert_eq!(engine_after("1,5 + 1 =").current_display(), "2.5");
    }

    #[test]
    fn test_invalid_digit_is_rejected_without_state_change() {
        let mut engine = engine_after("4");
        assert_eq!(engine.input_digit(12), Err(CalcError::InvalidDigit(12)));
        assert_eq!(engine.current_display(), "4");
        assert!(!engine.is_error_state());
    }

    #[test]
    fn test_simple_addition() {
        let engine = engine_after("3 + 4 =");
        assert_eq!(engine.current_display(), "7");
        assert_eq!(engine.history_display(), "3 + 4 =");
    }

    #[test]
    fn test_immediate_execution_chain() {
        let mut engine = engine_after("3 + 4 +");
        assert_eq!(engine.current_display(), "7");
        assert_eq!(engine.history_display(), "7 +");

        engine.press_line("5 =").unwrap();
        assert_eq!(engine.current_display(), "12");
        assert_eq!(engine.history_display(), "7 + 5 =");
    }

    #[test]
    fn test_evaluate_without_pending_operator() {
        let mut engine = engine_after("3 + 4 + 5 =");
        assert_eq!(engine.current_display(), "12");

        engine.evaluate().unwrap();
        assert_eq!(engine.current_display(), "12");
        assert_eq!(engine.history_display(), "");

        engine.evaluate().unwrap();
        assert_eq!(engine.current_display(), "12");
        assert_eq!(engine.history_display(), "");
    }

    #[test]
    fn test_operator_substitution() {
        let mut engine = engine_after("8 + - *");
        assert_eq!(engine.history_display(), "8 \u{d7}");
        engine.press_line("3 =").unwrap();
        assert_eq!(engine.current_display(), "24");
        assert_eq!(engine.history_display(), "8 \u{d7} 3 =");
    }

    #[test]
    fn test_result_is_replaced_by_next_digit() {
        let engine = engine_after("2 * 3 = 9");
        assert_eq!(engine.current_display(), "9");
    }

    #[test]
    fn test_result_feeds_next_chain() {
        let engine = engine_after("2 * 3 = + 1 =");
        assert_eq!(engine.current_display(), "7");
        assert_eq!(engine.history_display(), "6 + 1 =");
    }

    #[test]
    fn test_division_precision() {
        let engine = engine_after("1 / 3 =");
        assert_eq!(engine.current_display(), "0.3333333333333333");
        let engine = engine_after("1 / 3 = * 3 =");
        assert_eq!(engine.current_display(), "0.9999999999999999");
    }

    #[test]
    fn test_divide_by_zero_latches() {
        let mut engine = engine_after("5 / 0 =");
        assert!(engine.is_error_state());
        assert_eq!(engine.current_display(), "Cannot divide by zero");
        assert_eq!(engine.history_display(), "");

        engine.press_line("7 + 2 = . \u{2190} +/-").unwrap();
        assert!(engine.is_error_state());
        assert_eq!(engine.current_display(), "Cannot divide by zero");

        engine.clear_all();
        assert!(!engine.is_error_state());
        assert_eq!(engine.current_display(), "0");
        assert_eq!(engine.history_display(), "");
    }

    #[test]
    fn test_divide_by_zero_during_chain() {
        let engine = engine_after("6 / 0 +");
        assert!(engine.is_error_state());
    }

    #[test]
    fn test_clear_entry_leaves_error_mode() {
        let mut engine = engine_after("1 / 0 =");
        engine.clear_entry();
        assert!(!engine.is_error_state());
        assert_eq!(engine.current_display(), "0");
        engine.press_line("2 + 2 =").unwrap();
        assert_eq!(engine.current_display(), "4");
    }

    #[test]
    fn test_clear_entry_keeps_pending_chain() {
        let mut engine = engine_after("9 + 5");
        engine.clear_entry();
        assert_eq!(engine.current_display(), "0");
        assert_eq!(engine.history_display(), "9 +");
        engine.press_line("1 =").unwrap();
        assert_eq!(engine.current_display(), "10");
    }

    #[test]
    fn test_square_root() {
        let engine = engine_after("4 sqrt");
        assert_eq!(engine.current_display(), "2");
        assert_eq!(engine.history_display(), "\u{221a}(4)");

        let engine = engine_after("2 \u{221a}");
        assert_eq!(engine.current_display(), "1.414213562373095");
    }

    #[test]
    fn test_square_root_of_negative() {
        let engine = engine_after("9 +/- \u{221a}");
        assert!(engine.is_error_state());
        assert_eq!(engine.current_display(), "Invalid input");
    }

    #[test]
    fn test_failed_unary_leaves_chain_untouched() {
        let mut session = Session {
            accumulator: BigDecimal::from(200),
            pending: Some(BinaryOperator::Add),
            reset_on_next_digit: false,
            ..Session::default()
        };
        session.buffer.overwrite("-4");

        let result = session.apply_unary_operation(UnaryOperation::SquareRoot);
        assert!(matches!(
            result,
            Err(Fault::Arithmetic(ArithmeticError::InvalidInput))
        ));
        assert_eq!(session.accumulator, BigDecimal::from(200));
        assert_eq!(session.pending, Some(BinaryOperator::Add));
        assert_eq!(session.buffer.as_str(), "-4");
    }

    #[test]
    fn test_reciprocal() {
        let engine = engine_after("4 1/x");
        assert_eq!(engine.current_display(), "0.25");
        assert_eq!(engine.history_display(), "1/(4)");

        let engine = engine_after("0 1/x");
        assert!(engine.is_error_state());
        assert_eq!(engine.current_display(), "Cannot divide by zero");
    }

    #[test]
    fn test_percent_without_chain() {
        let engine = engine_after("5 0 %");
        assert_eq!(engine.current_display(), "0.5");
        assert_eq!(engine.history_display(), "");
    }

    #[test]
    fn test_percent_of_accumulator() {
        let mut engine = engine_after("2 0 0 + 1 0 %");
        assert_eq!(engine.current_display(), "20");
        assert_eq!(engine.history_display(), "200 + 20");

        engine.evaluate().unwrap();
        assert_eq!(engine.current_display(), "220");
    }

    #[test]
    fn test_negate() {
        let mut engine = engine_after("0 +/-");
        assert_eq!(engine.current_display(), "0");

        engine.press_line("5 +/-").unwrap();
        assert_eq!(engine.current_display(), "-5");

        // Negation keeps editing the same number.
        engine.press("3").unwrap();
        assert_eq!(engine.current_display(), "-53");
    }

    #[test]
    fn test_negate_result_then_type() {
        let engine = engine_after("2 + 3 = +/- 1");
        assert_eq!(engine.current_display(), "-51");
    }

    #[test]
    fn test_backspace() {
        let mut engine = engine_after("1 2 . 5");
        engine.backspace();
        assert_eq!(engine.current_display(), "12.");
        engine.backspace();
        engine.backspace();
        assert_eq!(engine.current_display(), "1");
        engine.backspace();
        assert_eq!(engine.current_display(), "0");

        engine.press_line("7 +/-").unwrap();
        engine.backspace();
        assert_eq!(engine.current_display(), "0");
    }

    #[test]
    fn test_backspace_after_result_starts_fresh() {
        let mut engine = engine_after("9 * 9 =");
        engine.backspace();
        assert_eq!(engine.current_display(), "0");
        engine.press("4").unwrap();
        assert_eq!(engine.current_display(), "4");
        assert_eq!(engine.history_display(), "9 \u{d7} 9 =");
    }

    #[test]
    fn test_trailing_decimal_point_operand() {
        let engine = engine_after("5 . + 1 =");
        assert_eq!(engine.current_display(), "6");
        assert_eq!(engine.history_display(), "5 + 1 =");
    }

    #[test]
    fn test_unknown_key_leaves_state_untouched() {
        let mut engine = engine_after("4 +");
        assert_eq!(
            engine.press_line("2 ^ 2"),
            Err(CalcError::UnknownKey("^".to_string()))
        );
        assert_eq!(engine.current_display(), "4");
        assert_eq!(engine.history_display(), "4 +");
    }

    #[test]
    fn test_displayed_result_reparses_to_same_value() {
        for line in ["1 / 3 =", "2 sqrt", "1 / 7 =", "0 . 1 + 0 . 2 ="] {
            let engine = engine_after(line);
            let shown = engine.current_display();
            let mut buffer = InputBuffer::default();
            buffer.overwrite(shown.clone());
            assert_eq!(decimal::format(&buffer.value().unwrap()), shown);
        }
    }

    #[test]
    fn test_snapshot() {
        let snapshot = engine_after("1 2 +").snapshot();
        assert_eq!(snapshot.history, "12 +");
        assert_eq!(snapshot.current, "12");
        assert!(!snapshot.is_error);
    }
}
