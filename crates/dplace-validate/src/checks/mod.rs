//! Individual consistency passes, run in order by [`crate::check`].

pub(crate) mod data;
pub(crate) mod phylogenies;
pub(crate) mod societies;
pub(crate) mod variables;
