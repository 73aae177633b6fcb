//! Grammar configuration: what commands, sub-commands and flags a parse
//! accepts, and how many values each of them consumes.
//!
//! Configuration is built by the caller before parsing, either with the
//! builder methods or by deserializing a document, and is only read while a
//! parse runs. A single [`ParserConfig`] may be shared by concurrent parses.
//!
//! # Example
//!
//! ```
//! use argtree_core::{CommandConfig, FlagConfig, NValue, ParserConfig};
//!
//! let config = ParserConfig::new().with_prog(
//!     CommandConfig::new()
//!         .with_flag("verbose", FlagConfig::new(NValue::ZERO).persistent())
//!         .with_command(
//!             "run",
//!             CommandConfig::new()
//!                 .with_nvalue(NValue::ONE_OR_MORE)
//!                 .with_value_names(["script"]),
//!         ),
//! );
//!
//! assert!(config.prog.command_config("run").is_some());
//! assert!(config.prog.flag_config("verbose").is_some_and(|f| f.persist));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Command, Flag, NValue, ScannerConfig};

/// Error type completion callbacks may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Invoked with each finished [`Command`] node.
pub type CommandCallback = Arc<dyn Fn(&Command) -> Result<(), CallbackError> + Send + Sync>;

/// Invoked with each finished [`Flag`] node.
pub type FlagCallback = Arc<dyn Fn(&Flag) -> Result<(), CallbackError> + Send + Sync>;

/// Declaration synthesized for names accepted by an automatic scope.
static AUTOMATIC_FLAG: FlagConfig = FlagConfig {
    nvalue: NValue::ZERO,
    persist: false,
    value_names: Vec::new(),
    on: None,
};

/// Top-level parser configuration: the root command and the lexical dialect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Declaration for the program itself (`argv[0]`).
    pub prog: CommandConfig,
    pub scanner_config: ScannerConfig,
}

impl ParserConfig {
    /// POSIX-like dialect with an empty, non-automatic root command.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prog(mut self, prog: CommandConfig) -> Self {
        self.prog = prog;
        self
    }

    pub fn with_scanner_config(mut self, scanner_config: ScannerConfig) -> Self {
        self.scanner_config = scanner_config;
        self
    }
}

/// Declaration of a command or sub-command.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Positional value arity.
    pub nvalue: NValue,
    /// Names given to positional values, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_names: Vec<String>,
    pub flags: Flags,
    /// Nested sub-command declarations keyed by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, CommandConfig>,
    #[serde(skip)]
    pub on: Option<CommandCallback>,
}

impl CommandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nvalue(mut self, nvalue: NValue) -> Self {
        self.nvalue = nvalue;
        self
    }

    pub fn with_value_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a flag declaration to this command's own scope.
    pub fn with_flag(mut self, name: impl Into<String>, flag: FlagConfig) -> Self {
        self.set_flag_config(name, flag);
        self
    }

    /// Replaces this command's flag scope.
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds a nested sub-command declaration.
    pub fn with_command(mut self, name: impl Into<String>, command: CommandConfig) -> Self {
        self.set_command_config(name, command);
        self
    }

    /// Sets the completion callback run when this command's node is finished.
    pub fn on<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Command) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.on = Some(Arc::new(callback));
        self
    }

    pub fn set_flag_config(&mut self, name: impl Into<String>, flag: FlagConfig) {
        self.flags.map.insert(name.into(), flag);
    }

    pub fn set_command_config(&mut self, name: impl Into<String>, command: CommandConfig) {
        self.commands.insert(name.into(), command);
    }

    /// Looks up a flag in this command's own scope (no inheritance).
    pub fn flag_config(&self, name: &str) -> Option<&FlagConfig> {
        self.flags.get(name)
    }

    pub fn command_config(&self, name: &str) -> Option<&CommandConfig> {
        self.commands.get(name)
    }
}

impl fmt::Debug for CommandConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandConfig")
            .field("nvalue", &self.nvalue)
            .field("value_names", &self.value_names)
            .field("flags", &self.flags)
            .field("commands", &self.commands)
            .field("on", &self.on.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// Declaration of a flag.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    /// Value arity.
    pub nvalue: NValue,
    /// Whether the flag stays visible inside descendant commands.
    pub persist: bool,
    /// Names given to values, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_names: Vec<String>,
    #[serde(skip)]
    pub on: Option<FlagCallback>,
}

impl FlagConfig {
    pub fn new(nvalue: NValue) -> Self {
        Self {
            nvalue,
            ..Default::default()
        }
    }

    /// Marks the flag as visible to descendant commands.
    pub fn persistent(mut self) -> Self {
        self.persist = true;
        self
    }

    pub fn with_value_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the completion callback run when this flag's node is finished.
    pub fn on<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Flag) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.on = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for FlagConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagConfig")
            .field("nvalue", &self.nvalue)
            .field("persist", &self.persist)
            .field("value_names", &self.value_names)
            .field("on", &self.on.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// A command's own flag declarations.
///
/// When `automatic` is set, any name missing from `map` resolves to a
/// zero-arity, non-persistent declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub map: BTreeMap<String, FlagConfig>,
    pub automatic: bool,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that accepts every flag name.
    pub fn automatic() -> Self {
        Self {
            map: BTreeMap::new(),
            automatic: true,
        }
    }

    pub fn with_flag(mut self, name: impl Into<String>, flag: FlagConfig) -> Self {
        self.map.insert(name.into(), flag);
        self
    }

    /// Resolves a name against the own mapping, then the automatic switch.
    pub fn get(&self, name: &str) -> Option<&FlagConfig> {
        match self.map.get(name) {
            Some(flag) => Some(flag),
            None if self.automatic => Some(&AUTOMATIC_FLAG),
            None => None,
        }
    }
}

/// Flag lookup chain for one command during a parse.
///
/// Each nested command's scope borrows the enclosing command's scope as its
/// parent. Declarations found through a parent only resolve when they are
/// marked [`persist`](FlagConfig::persist).
///
/// # Examples
///
/// ```
/// use argtree_core::{FlagConfig, FlagScope, Flags, NValue};
///
/// let parent = Flags::new()
///     .with_flag("a", FlagConfig::new(NValue::ZERO))
///     .with_flag("b", FlagConfig::new(NValue::ZERO).persistent());
/// let child = Flags::new();
///
/// let root = FlagScope::root(&parent);
/// let nested = root.child(&child);
///
/// assert!(nested.get("b").is_some());
/// assert!(nested.get("a").is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FlagScope<'a> {
    flags: &'a Flags,
    parent: Option<&'a FlagScope<'a>>,
}

impl<'a> FlagScope<'a> {
    pub fn root(flags: &'a Flags) -> Self {
        Self {
            flags,
            parent: None,
        }
    }

    /// Opens the scope of a nested command under this one.
    pub fn child<'s>(&'s self, flags: &'s Flags) -> FlagScope<'s> {
        FlagScope {
            flags,
            parent: Some(self),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a FlagConfig> {
        if let Some(flag) = self.flags.get(name) {
            return Some(flag);
        }

        self.parent?.get(name).filter(|flag| flag.persist)
    }
}

/// Name for the `index`-th value of a command or flag.
///
/// Uses the declared name at that index if there is one; a single declared
/// name under an unbounded arity repeats as `name.1`, `name.2`, ...;
/// everything else is named by its decimal index.
pub fn value_name(names: &[String], nvalue: NValue, index: usize) -> String {
    if let Some(name) = names.get(index) {
        return name.clone();
    }

    match names {
        [name] if nvalue.is_unbounded() => format!("{name}.{index}"),
        _ => index.to_string(),
    }
}
