//! Generic structures with no particular tie to planning.

pub mod pcg;
