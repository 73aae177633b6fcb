//! Parse tree and AST node types.
//!
//! One [`Node`] type serves both trees. A parse tree carries every parse
//! artifact ([`Node::ArgDelimiter`], [`Node::StopFlag`], grouped
//! [`Node::CompoundShortFlag`]s); the AST produced by [`to_ast`] does not.
//!
//! Nodes serialize adjacently tagged, `{"type": "Flag", "node": {...}}`, so a
//! dumped tree can be read back and handed to [`unparse`](crate::unparse).

use serde::{Deserialize, Serialize};

use crate::to_ast;

/// One node of a parse tree or AST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "node")]
pub enum Node {
    /// Boundary between two original arguments.
    ArgDelimiter,
    /// An explicit assignment operator.
    Assign,
    /// The bare flag prefix (`-`).
    StdinFlag,
    /// The bare doubled flag prefix (`--`).
    StopFlag,
    Ident(String),
    /// Values joined by the multi-value delimiter within one argument.
    MultiIdent(Vec<Node>),
    /// Arguments following the point where grammar interpretation stopped.
    PassthroughArgs(Vec<Node>),
    /// Flags expanded from one compound token (`-abc`).
    CompoundShortFlag(Vec<Node>),
    Command(Command),
    Flag(Flag),
}

impl Node {
    pub fn ident(literal: impl Into<String>) -> Self {
        Node::Ident(literal.into())
    }

    /// The variant name, as used in the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::ArgDelimiter => "ArgDelimiter",
            Node::Assign => "Assign",
            Node::StdinFlag => "StdinFlag",
            Node::StopFlag => "StopFlag",
            Node::Ident(_) => "Ident",
            Node::MultiIdent(_) => "MultiIdent",
            Node::PassthroughArgs(_) => "PassthroughArgs",
            Node::CompoundShortFlag(_) => "CompoundShortFlag",
            Node::Command(_) => "Command",
            Node::Flag(_) => "Flag",
        }
    }

    /// Returns `true` for nodes that carry a value: identifiers, stdin flags
    /// and multi-value groups.
    pub fn is_value(&self) -> bool {
        matches!(self, Node::Ident(_) | Node::StdinFlag | Node::MultiIdent(_))
    }
}

impl From<Command> for Node {
    fn from(command: Command) -> Self {
        Node::Command(command)
    }
}

impl From<Flag> for Node {
    fn from(flag: Flag) -> Self {
        Node::Flag(flag)
    }
}

/// A named value recorded on a command or flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Returns the first value stored under `key`.
///
/// Keys may repeat; later entries are only reachable by iterating.
pub fn first_value<'a>(values: &'a [KeyValue], key: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|kv| kv.key == key)
        .map(|kv| kv.value.as_str())
}

fn collect_values<I, K, V>(values: I) -> Vec<KeyValue>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    values
        .into_iter()
        .map(|(k, v)| KeyValue::new(k, v))
        .collect()
}

/// A command or sub-command node.
///
/// `values` indexes the positional values found among `nodes`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values = collect_values(values);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        first_value(&self.values, key)
    }
}

/// A flag node.
///
/// `values` indexes the values found among `nodes`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

impl Flag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values = collect_values(values);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        first_value(&self.values, key)
    }
}

/// Result of a parse: the program command, optionally followed by
/// [`Node::PassthroughArgs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTree {
    pub nodes: Vec<Node>,
}

impl ParseTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// The root command, if the tree has one.
    pub fn program(&self) -> Option<&Command> {
        match self.nodes.first() {
            Some(Node::Command(command)) => Some(command),
            _ => None,
        }
    }

    /// The tree reduced to an AST.
    pub fn ast(&self) -> Vec<Node> {
        to_ast(&self.nodes)
    }
}
