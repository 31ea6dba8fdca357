//! Declarative command line arguments, bound straight into plain structs.
//!
//! A command's flags and its positional arguments are two ordinary structs
//! deriving [`Record`]. The handler receives both, fully populated:
//!
//! ```
//! use argrec::{Command, Record};
//!
//! #[derive(Default, Record)]
//! struct Flags {
//!     /// Print more.
//!     #[arg(short = "v", takes_val = "false")]
//!     verbose: u8,
//!     #[arg(default = "8")]
//!     jobs: usize,
//! }
//!
//! #[derive(Default, Record)]
//! struct Args {
//!     input: String,
//!     #[arg(min = 1)]
//!     rest: Vec<i32>,
//! }
//!
//! let cmd = Command::new("demo").handler(|flags: Flags, args: Args| {
//!     assert_eq!(flags.verbose, 3);
//!     assert_eq!(flags.jobs, 8);
//!     assert_eq!(args.input, "in.txt");
//!     assert_eq!(args.rest, [1, -2]);
//! });
//! argrec::assert_valid(&cmd);
//! cmd.eval(["demo", "-vvv", "in.txt", "1", "--", "-2"], &[]).unwrap();
//! ```
//!
//! Decoding of field types goes through [`Decoders`]; user types are
//! declared with [`custom_type!`] and decoded by per-command overrides.

extern crate self as argrec;

mod command;
pub mod decode;
mod defaults;
mod error;
pub mod help;
mod record;
mod rt;
pub mod schema;
pub mod tags;
mod validate;
mod value;

pub use argrec_macros::Record;

pub use crate::{
    command::Command,
    decode::{Decoders, ValueDecoder, ValuelessDecoder},
    error::{DecodeCause, DecodeError, Error, Result},
    record::{FieldDecl, Record, Shape},
    schema::{ArgGroupSpec, Arity, FlagSpec, Schema},
    tags::Tags,
    validate::{assert_valid, validate, ValidationError},
    value::{Bind, Custom, IpNet, TypeTag, Value},
};
