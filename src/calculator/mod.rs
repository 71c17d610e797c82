//! Calculator engine.
//!
//! This module provides:
//! - The immediate-execution [`Engine`] and its command surface
//! - Fixed-precision decimal arithmetic and formatting
//! - Mapping of button labels and keyboard keys to commands
//! - Copying results to the clipboard

mod buffer;
mod clipboard;
mod command;
pub mod decimal;
mod engine;
mod error;
mod operation;

pub use buffer::InputBuffer;
pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use command::{Command, parse_keys, tokenize};
pub use engine::Engine;
pub use error::{ArithmeticError, CalcError};
pub use operation::{BinaryOperator, Digit, UnaryOperation};
