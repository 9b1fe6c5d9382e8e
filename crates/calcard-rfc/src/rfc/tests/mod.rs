//! Whole-document tests over RFC example data.

mod fixtures;
