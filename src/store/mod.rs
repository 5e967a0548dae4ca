//! Queries over the relational store. Every multi-statement replace runs in
//! one transaction so a failure leaves the previous state untouched.

pub mod assignments;
pub mod mappings;
pub mod outcomes;
pub mod rubrics;
