pub mod utf16;
pub mod automaton;
pub mod scan;
pub mod anchor;

pub use automaton::*;
pub use scan::*;
pub use anchor::*;
