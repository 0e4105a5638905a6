//! Outer adapters: scripted session input and summary output.

pub mod csv;
