use tracing::trace;

use crate::{Command, Flag, Node};

/// Reduces a parse tree to an AST.
///
/// Drops [`Node::ArgDelimiter`] and [`Node::StopFlag`], splices the flags of
/// each [`Node::CompoundShortFlag`] into the surrounding sequence, and
/// recurses into commands and flags. Values are left untouched. Reducing an
/// AST again returns it unchanged.
pub fn to_ast(nodes: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());

    for node in nodes {
        trace!(kind = node.kind(), "reducing");

        match node {
            Node::ArgDelimiter | Node::StopFlag => {}
            Node::CompoundShortFlag(flags) => out.extend(to_ast(flags)),
            Node::Command(command) => out.push(Node::Command(Command {
                name: command.name.clone(),
                values: command.values.clone(),
                nodes: to_ast(&command.nodes),
            })),
            Node::Flag(flag) => out.push(Node::Flag(Flag {
                name: flag.name.clone(),
                values: flag.values.clone(),
                nodes: to_ast(&flag.nodes),
            })),
            other => out.push(other.clone()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<Node> {
        vec![
            Command::new("pies")
                .with_nodes(vec![
                    Node::ArgDelimiter,
                    Node::CompoundShortFlag(vec![
                        Flag::new("e").into(),
                        Flag::new("a").into(),
                        Flag::new("t").into(),
                    ]),
                    Node::ArgDelimiter,
                    Flag::new("wat").into(),
                    Node::ArgDelimiter,
                    Command::new("hello")
                        .with_values([("name", "mario")])
                        .with_nodes(vec![Node::ArgDelimiter, Node::ident("mario")])
                        .into(),
                ])
                .into(),
        ]
    }

    #[test]
    fn test_reduces_artifacts() {
        let ast = to_ast(&sample_tree());

        assert_eq!(
            ast,
            vec![
                Command::new("pies")
                    .with_nodes(vec![
                        Flag::new("e").into(),
                        Flag::new("a").into(),
                        Flag::new("t").into(),
                        Flag::new("wat").into(),
                        Command::new("hello")
                            .with_values([("name", "mario")])
                            .with_nodes(vec![Node::ident("mario")])
                            .into(),
                    ])
                    .into()
            ]
        );
    }

    #[test]
    fn test_reduction_is_idempotent() {
        let once = to_ast(&sample_tree());
        assert_eq!(to_ast(&once), once);
    }

    #[test]
    fn test_only_artifacts_leave_no_children() {
        let tree = vec![Flag::new("box")
            .with_nodes(vec![Node::ArgDelimiter, Node::StopFlag])
            .into()];
        assert_eq!(to_ast(&tree), vec![Node::Flag(Flag::new("box"))]);
    }

    #[test]
    fn test_passthrough_and_multi_ident_pass_through() {
        let tree = vec![
            Node::MultiIdent(vec![Node::ident("a"), Node::ident("b")]),
            Node::StopFlag,
            Node::PassthroughArgs(vec![Node::ident("--x")]),
        ];
        assert_eq!(
            to_ast(&tree),
            vec![
                Node::MultiIdent(vec![Node::ident("a"), Node::ident("b")]),
                Node::PassthroughArgs(vec![Node::ident("--x")]),
            ]
        );
    }
}
