//! One module per subcommand. Each exposes a function over a [`Repository`]
//! that returns what the command produced; printing is left to the binary.
//!
//! [`Repository`]: dplace_ingest::Repository

pub mod check;
pub mod cldf;
pub mod extract;
pub mod glottolog;
pub mod index;
pub mod ls;
pub mod tdwg;
