//! Graph input formats.
//!
//! - [`EdgeList`] - whitespace separated `source target` lines
//! - [`Csv`] - headerless `source,target` records

mod csv;
mod edgelist;

pub use self::csv::Csv;
pub use self::edgelist::EdgeList;
