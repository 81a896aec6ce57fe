//! Line-oriented user interface.
//!
//! - `input`: parses shell lines into `Command`s and prompts for secrets
//! - `render`: turns `Outcome`s and errors into plain-text output

pub mod input;
pub mod render;
