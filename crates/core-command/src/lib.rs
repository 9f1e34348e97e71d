//! Structural-regex command language.
//!
//! A script is an optional address followed by a list of commands:
//!
//! ```text
//! 0 $ . #N N /re/        addresses
//! a/t/ i/t/ c/t/ d       edits
//! x/re/ g/re/ v/re/      loops and guards, taking the next command as body
//! ```
//!
//! [`parse`] turns source into a [`Script`] and compiles every regex, and
//! [`execute`] runs it against a [`core_state::Session`] as one undo step.

pub mod error;
pub mod exec;
pub mod parser;
pub mod scanner;

pub use error::CommandError;
pub use exec::{execute, resolve, run};
pub use parser::{Address, AddressKind, Command, Pattern, Script, parse};
