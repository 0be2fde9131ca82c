#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parsing, validation and compilation of the compact operand syntax used to address semaphores
//! in a System V semaphore set from the command line.
//!
//! Example operands: `0:3=-1u 4=1n`
//!
//! # Format
//!
//! Operands take one of two mutually exclusive forms:
//!
//! * a single whole-set value `VALUE[FLAGS]` (e.g. `-1u`), applied to every semaphore in the set;
//! * one or more ranged assignments `LOWER[:UPPER]=VALUE[FLAGS]` (e.g. `0:3=-1u`), where the
//!   interval may also be written as `LOWER,UPPER`.
//!
//! `VALUE` is a signed 16-bit integer with an optional `+` or `-` sign. `FLAGS` are any of:
//!
//! * `n` - fail instead of blocking if the operation cannot proceed immediately;
//! * `u` - have the kernel undo the operation when the process exits.
//!
//! Semaphore numbers are unsigned 16-bit integers. Whitespace is not allowed anywhere in an
//! operand.
//!
//! # Example
//!
//! ```
//! use semspec::{OperationPlan, emit};
//!
//! let plan = OperationPlan::parse(&["0,1=3u", "2=-1"]).unwrap();
//!
//! // Ranged operands never need to know the size of the set.
//! let operations = plan.compile(|| Ok::<_, semspec::Error>(3)).unwrap();
//! assert_eq!(operations.len(), 3);
//!
//! println!("As operands: {}", emit(&operations));
//! ```
//!
//! Bulk initialization requires that the intervals address every semaphore exactly once:
//!
//! ```
//! let values = semspec::plan_set_all(&["0:1=5", "2:3=7"], 4).unwrap();
//! assert_eq!(values, vec![5, 5, 7, 7]);
//!
//! assert!(semspec::plan_set_all(&["0:1=5", "1:3=7"], 4).is_err());
//! ```

mod addressing;
mod bounds;
mod compile;
mod coverage;
mod emit;
mod error;
mod interval;
mod operation;
mod payload;
mod set_all;

pub use addressing::*;
pub use compile::*;
pub use coverage::*;
pub use emit::*;
pub use error::*;
pub use interval::*;
pub use operation::*;
pub use payload::*;
pub use set_all::*;
