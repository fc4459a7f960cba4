//! CLI module for sweepr - command-line interface and flags.

pub mod commands;

pub use commands::Cli;
