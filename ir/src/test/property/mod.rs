//! Property-based tests for the folding core.

mod fold_props;
