//! Grammar-driven command-line argument parsing.
//!
//! Given an argument vector and a declarative grammar, this crate builds a
//! typed parse tree, reduces it to an AST, and serializes trees back into
//! argument vectors:
//!
//! - [`ParserConfig`] / [`CommandConfig`] / [`FlagConfig`]: the grammar of
//!   commands, sub-commands, flags and how many values each consumes
//!   ([`NValue`]), plus the lexical dialect ([`ScannerConfig`]).
//! - [`parse_args`]: scans and parses, returning a [`ParseTree`] and the
//!   recoverable errors found on the way ([`ParserErrorList`]).
//! - [`to_ast`]: drops parse-only artifacts from a tree.
//! - [`unparse`]: reconstructs argument strings from a tree.
//!
//! With the `clap` feature, [`adapter::command_config_from_clap`] builds a
//! grammar from a clap command declaration.
//!
//! Library code only emits [`tracing`] events; installing a subscriber is
//! left to the application.
//!
//! # Example
//!
//! ```
//! use argtree_core::*;
//!
//! let config = ParserConfig::new().with_prog(
//!     CommandConfig::new()
//!         .with_flag("e", FlagConfig::new(NValue::ZERO))
//!         .with_flag("a", FlagConfig::new(NValue::ZERO))
//!         .with_flag("t", FlagConfig::new(NValue::ZERO))
//!         .with_command(
//!             "hello",
//!             CommandConfig::new()
//!                 .with_nvalue(NValue::from(1))
//!                 .with_value_names(["name"]),
//!         ),
//! );
//!
//! let args = ["pies", "-eat", "hello", "mario"];
//! let (tree, errors) = parse_args(&args, Some(&config)).unwrap();
//! assert!(errors.is_empty());
//!
//! let ast = tree.ast();
//! let Node::Command(pies) = &ast[0] else { panic!("expected the program") };
//! assert_eq!(pies.nodes.len(), 4);
//! let Node::Command(hello) = &pies.nodes[3] else { panic!("expected hello") };
//! assert_eq!(hello.value("name"), Some("mario"));
//!
//! assert_eq!(unparse(&tree.nodes, &config.scanner_config).unwrap(), args);
//! ```

#[cfg(feature = "clap")]
pub mod adapter;
mod ast;
mod config;
mod error;
mod node;
mod nvalue;
mod parser;
mod position;
mod scanner;
mod token;
mod unparse;

pub use ast::to_ast;
pub use config::{
    CallbackError, CommandCallback, CommandConfig, FlagCallback, FlagConfig, FlagScope, Flags,
    ParserConfig, value_name,
};
pub use error::{Error, ParserError, ParserErrorList, Result};
pub use node::{Command, Flag, KeyValue, Node, ParseTree, first_value};
pub use nvalue::{NValue, ParseNValueError};
pub use parser::{Parser, parse_args};
pub use position::Position;
pub use scanner::{ARG_DELIMITER, Lexeme, Scanner, ScannerConfig, join_args};
pub use token::Token;
pub use unparse::unparse;
