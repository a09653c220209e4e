//! Argument parsing for the `wsh` binary (`spec.md` §6 "CLI surface"),
//! hand-rolled rather than built on an argument-parsing crate — the CLI and
//! the argument-parsing library are both named out of scope in `spec.md`
//! §1, so this stays a thin, single-purpose parser mirroring the shape of
//! the teacher's own `yash/src/startup/args.rs` rather than its full
//! breadth of long options.

pub mod args;
