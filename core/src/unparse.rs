//! Serializer: turns a parse tree back into an argument vector.
//!
//! Values introduced by an assignment operator are glued to whatever the
//! operator follows, so `--with=a,b` and `key=value` come back as single
//! arguments. Argument delimiters produce nothing of their own; they only
//! stop that gluing.

use tracing::trace;

use crate::{Error, Flag, Node, Result, ScannerConfig};

/// Serializes `nodes` to argument strings using the dialect in `cfg`.
///
/// # Examples
///
/// ```
/// use argtree_core::{Command, Flag, Node, ScannerConfig, unparse};
///
/// let tree = vec![Node::from(Command::new("fjords").with_nodes(vec![
///     Node::ArgDelimiter,
///     Flag::new("with")
///         .with_values([("0", "whales"), ("1", "waters")])
///         .with_nodes(vec![
///             Node::Assign,
///             Node::MultiIdent(vec![Node::ident("whales"), Node::ident("waters")]),
///         ])
///         .into(),
/// ]))];
///
/// let args = unparse(&tree, &ScannerConfig::default()).unwrap();
/// assert_eq!(args, vec!["fjords", "--with=whales,waters"]);
/// ```
pub fn unparse(nodes: &[Node], cfg: &ScannerConfig) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut glue_next = false;
    let mut after_value = false;

    for node in nodes {
        trace!(kind = node.kind(), "unparsing");

        match node {
            Node::ArgDelimiter => {
                glue_next = false;
                after_value = false;
            }
            Node::Assign => {
                let op = cfg.assignment_operator;
                match out.last_mut() {
                    Some(last) if after_value => last.push(op),
                    _ => out.push(op.to_string()),
                }
                glue_next = true;
                after_value = false;
            }
            value if value.is_value() => {
                let text = unparse_value(value, cfg)?;
                match out.last_mut() {
                    Some(last) if glue_next => last.push_str(&text),
                    _ => out.push(text),
                }
                glue_next = false;
                after_value = true;
            }
            other => {
                out.extend(unparse_node(other, cfg)?);
                glue_next = false;
                after_value = false;
            }
        }
    }

    Ok(out)
}

fn unparse_node(node: &Node, cfg: &ScannerConfig) -> Result<Vec<String>> {
    match node {
        Node::StopFlag => Ok(vec![cfg.stop_flag()]),
        Node::PassthroughArgs(args) => unparse(args, cfg),
        Node::Command(command) => {
            let mut out = vec![command.name.clone()];
            out.extend(unparse(&command.nodes, cfg)?);
            Ok(out)
        }
        Node::Flag(flag) => unparse_flag(flag, cfg),
        Node::CompoundShortFlag(flags) => unparse_compound(flags, cfg),
        Node::ArgDelimiter | Node::Assign => Ok(Vec::new()),
        value => Ok(vec![unparse_value(value, cfg)?]),
    }
}

fn unparse_value(node: &Node, cfg: &ScannerConfig) -> Result<String> {
    match node {
        Node::Ident(literal) => Ok(literal.clone()),
        Node::StdinFlag => Ok(cfg.flag_prefix.to_string()),
        Node::MultiIdent(members) => {
            let mut joined = String::new();
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    joined.push(cfg.multi_value_delim);
                }
                match member {
                    Node::Ident(_) | Node::StdinFlag => {
                        joined.push_str(&unparse_value(member, cfg)?);
                    }
                    other => {
                        return Err(Error::UnexpectedNode {
                            kind: other.kind(),
                            context: "MultiIdent",
                        });
                    }
                }
            }
            Ok(joined)
        }
        other => Err(Error::UnexpectedNode {
            kind: other.kind(),
            context: "value position",
        }),
    }
}

fn unparse_flag(flag: &Flag, cfg: &ScannerConfig) -> Result<Vec<String>> {
    let short = flag.name.chars().count() == 1;

    let mut token = String::new();
    token.push(cfg.flag_prefix);
    if !short {
        token.push(cfg.flag_prefix);
    }
    token.push_str(&flag.name);

    let mut rest = unparse(&flag.nodes, cfg)?;

    let glue = match flag.nodes.first() {
        Some(Node::Assign) => true,
        Some(first) => short && first.is_value(),
        None => false,
    };

    if glue && !rest.is_empty() {
        token.push_str(&rest.remove(0));
    }

    let mut out = Vec::with_capacity(rest.len() + 1);
    out.push(token);
    out.extend(rest);
    Ok(out)
}

fn unparse_compound(flags: &[Node], cfg: &ScannerConfig) -> Result<Vec<String>> {
    let mut group = String::new();
    group.push(cfg.flag_prefix);
    let mut tail = Vec::new();

    for member in flags {
        let Node::Flag(flag) = member else {
            return Err(Error::UnexpectedNode {
                kind: member.kind(),
                context: "CompoundShortFlag",
            });
        };

        if flag.name.chars().count() != 1 {
            return Err(Error::InvalidCompoundMember(flag.name.clone()));
        }

        let mut strings = unparse_flag(flag, cfg)?.into_iter();
        if let Some(first) = strings.next() {
            group.push_str(first.strip_prefix(cfg.flag_prefix).unwrap_or(&first));
        }
        tail.extend(strings);
    }

    let mut out = Vec::with_capacity(tail.len() + 1);
    out.push(group);
    out.extend(tail);
    Ok(out)
}
