//! Explicit query functions over the relational store.
//!
//! Each submodule owns one entity family and returns concrete row structs;
//! there is no lazy relationship navigation anywhere in the crate.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod orders;
