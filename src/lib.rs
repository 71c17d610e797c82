//! Immediate-execution calculator engine.
//!
//! Callers send discrete commands (digits, operators, `=`, unary operations,
//! clears, backspace) to an [`Engine`] and read back the history and current
//! display lines after each one.
//!
//! ```
//! use zcalc::Engine;
//!
//! let mut engine = Engine::new();
//! engine.press_line("3 + 4 + 5 =").unwrap();
//! assert_eq!(engine.current_display(), "12");
//! assert_eq!(engine.history_display(), "7 + 5 =");
//! ```

pub mod calculator;
pub mod config;
pub mod display;

pub use calculator::{
    ArithmeticError, BinaryOperator, CalcError, Command, Engine, UnaryOperation,
};
pub use display::DisplaySnapshot;
