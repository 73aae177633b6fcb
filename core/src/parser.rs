//! Grammar-driven recursive-descent parser.
//!
//! The argument vector is flattened with [`join_args`] and scanned token by
//! token. The first token names the program, which is parsed as a command
//! against [`ParserConfig::prog`]. Whatever the command grammar leaves
//! unconsumed becomes [`Node::PassthroughArgs`].
//!
//! Recoverable problems (unknown flags, bare assignments, value-taking flags
//! in the middle of a compound group, failing callbacks) go into the
//! returned [`ParserErrorList`]; the tree is still built. An illegal
//! character aborts the parse with [`Error::Illegal`].

use tracing::{debug, trace};

use crate::config::value_name;
use crate::{
    Command, CommandConfig, Error, Flag, FlagConfig, FlagScope, KeyValue, Lexeme, NValue, Node,
    ParseTree, ParserConfig, ParserErrorList, Position, Result, Scanner, Token, join_args,
};

/// Parses an argument vector whose first element is the program name.
///
/// Returns [`Error::MissingConfig`] without scanning when `config` is
/// `None`. An empty vector parses to an empty tree.
///
/// # Examples
///
/// ```
/// use argtree_core::{CommandConfig, FlagConfig, NValue, Node, ParserConfig, parse_args};
///
/// let config = ParserConfig::new().with_prog(
///     CommandConfig::new().with_flag("fresh", FlagConfig::new(NValue::from(1))),
/// );
///
/// let (tree, errors) = parse_args(&["pizzas", "--fresh", "soon"], Some(&config)).unwrap();
/// assert!(errors.is_empty());
///
/// let prog = tree.program().unwrap();
/// let Node::Flag(fresh) = &prog.nodes[1] else { panic!("expected a flag") };
/// assert_eq!(fresh.value("0"), Some("soon"));
/// ```
pub fn parse_args<S: AsRef<str>>(
    args: &[S],
    config: Option<&ParserConfig>,
) -> Result<(ParseTree, ParserErrorList)> {
    let config = config.ok_or(Error::MissingConfig)?;
    let input = join_args(args);

    Parser::new(&input, config).parse()
}

/// Single-use parser over one flattened argument stream.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    config: &'a ParserConfig,
    buffered: Option<Lexeme>,
    illegal: Option<Lexeme>,
    errors: ParserErrorList,
}

impl<'a> Parser<'a> {
    /// `input` is a stream produced by [`join_args`].
    pub fn new(input: &'a str, config: &'a ParserConfig) -> Self {
        Self {
            scanner: Scanner::new(input, &config.scanner_config),
            config,
            buffered: None,
            illegal: None,
            errors: ParserErrorList::new(),
        }
    }

    pub fn parse(mut self) -> Result<(ParseTree, ParserErrorList)> {
        let config = self.config;
        let mut nodes = Vec::new();

        let mut first = self.scan();
        if first.token == Token::ArgDelimiter {
            // empty program name
            let name = Lexeme::new(Token::Ident, "", first.pos);
            self.unscan(first);
            first = name;
        }

        if first.token != Token::Eol {
            let scope = FlagScope::root(&config.prog.flags);
            nodes.push(self.parse_command(first, &config.prog, scope));

            if let Some(passthrough) = self.parse_passthrough(false) {
                nodes.push(passthrough);
            }
        }

        if let Some(lexeme) = self.illegal.take() {
            return Err(Error::Illegal {
                pos: lexeme.pos,
                literal: lexeme.literal,
            });
        }

        self.errors.sort();

        debug!(nodes = nodes.len(), errors = self.errors.len(), "parsed arguments");

        Ok((ParseTree::new(nodes), self.errors))
    }

    fn scan(&mut self) -> Lexeme {
        if let Some(lexeme) = self.buffered.take() {
            trace!(token = %lexeme.token, literal = ?lexeme.literal, "rescanning buffered token");
            return lexeme;
        }

        if let Some(illegal) = &self.illegal {
            return Lexeme::new(Token::Eol, "", illegal.pos);
        }

        let lexeme = self.scanner.next_lexeme();
        if lexeme.token == Token::Illegal {
            debug!(literal = ?lexeme.literal, pos = %lexeme.pos, "illegal character; stopping");
            let pos = lexeme.pos;
            self.illegal = Some(lexeme);
            return Lexeme::new(Token::Eol, "", pos);
        }

        lexeme
    }

    fn unscan(&mut self, lexeme: Lexeme) {
        debug_assert!(self.buffered.is_none(), "parser buffers a single token");
        trace!(token = %lexeme.token, literal = ?lexeme.literal, "buffering token");
        self.buffered = Some(lexeme);
    }

    fn parse_command(&mut self, name: Lexeme, cfg: &CommandConfig, scope: FlagScope<'_>) -> Node {
        trace!(command = %name.literal, nvalue = %cfg.nvalue, "parsing command");

        let pos = name.pos;
        let mut command = Command::new(name.literal);
        let mut ident_index = 0usize;

        loop {
            let lexeme = self.scan();

            match lexeme.token {
                Token::Eol => break,
                Token::ArgDelimiter => command.nodes.push(Node::ArgDelimiter),
                Token::Ident | Token::StdinFlag => {
                    let sub_cfg = match lexeme.token {
                        Token::Ident => cfg.command_config(&lexeme.literal),
                        _ => None,
                    };

                    if let Some(sub_cfg) = sub_cfg {
                        let sub_scope = scope.child(&sub_cfg.flags);
                        let sub_command = self.parse_command(lexeme, sub_cfg, sub_scope);
                        command.nodes.push(sub_command);
                        break;
                    }

                    if cfg.nvalue.contains(ident_index as isize) {
                        let key = value_name(&cfg.value_names, cfg.nvalue, ident_index);
                        trace!(
                            command = %command.name,
                            %key,
                            value = %lexeme.literal,
                            "positional value"
                        );
                        command.values.push(KeyValue::new(key, lexeme.literal.clone()));
                    }

                    command.nodes.push(leaf(lexeme));
                    ident_index += 1;
                }
                token if token.is_flag() => {
                    let flag = self.parse_flag(lexeme, scope);
                    command.nodes.push(flag);
                }
                Token::Assign => self.errors.add(lexeme.pos, "invalid bare assignment"),
                Token::StopFlag => {
                    command.nodes.push(Node::StopFlag);

                    let next = self.scan();
                    let started = next.token == Token::ArgDelimiter;
                    if started {
                        command.nodes.push(Node::ArgDelimiter);
                    } else {
                        self.unscan(next);
                    }

                    if let Some(passthrough) = self.parse_passthrough(started) {
                        command.nodes.push(passthrough);
                    }
                    break;
                }
                _ => {
                    trace!(token = %lexeme.token, "command grammar stops");
                    self.unscan(lexeme);
                    break;
                }
            }
        }

        if let Some(on) = &cfg.on {
            if let Err(err) = on(&command) {
                self.errors.add(pos, err.to_string());
            }
        }

        Node::Command(command)
    }

    fn parse_flag(&mut self, lexeme: Lexeme, scope: FlagScope<'_>) -> Node {
        let skip = match lexeme.token {
            Token::ShortFlag => 1,
            Token::LongFlag => 2,
            _ => return self.parse_compound_short_flag(lexeme, scope),
        };

        let name: String = lexeme.literal.chars().skip(skip).collect();

        match scope.get(&name) {
            Some(flag_cfg) => {
                self.parse_configured_flag(name, flag_cfg, flag_cfg.nvalue, lexeme.pos)
            }
            None => {
                self.errors.add(lexeme.pos, format!("unknown flag {name:?}"));
                Node::Flag(Flag::new(name))
            }
        }
    }

    fn parse_compound_short_flag(&mut self, lexeme: Lexeme, scope: FlagScope<'_>) -> Node {
        let names: Vec<String> = lexeme.literal.chars().skip(1).map(String::from).collect();

        let mut resolved = Vec::with_capacity(names.len());
        for name in &names {
            match scope.get(name) {
                Some(flag_cfg) => resolved.push(flag_cfg),
                None => {
                    self.errors.add(lexeme.pos, format!("unknown flag {name:?}"));
                    return Node::CompoundShortFlag(
                        names.into_iter().map(|n| Node::Flag(Flag::new(n))).collect(),
                    );
                }
            }
        }

        let last = names.len().saturating_sub(1);
        let mut flags = Vec::with_capacity(names.len());

        for (i, (name, flag_cfg)) in names.into_iter().zip(resolved).enumerate() {
            let nvalue = if i < last {
                if flag_cfg.nvalue.required() {
                    self.errors.add(
                        lexeme.pos,
                        "short flag before end of compound group expects value",
                    );
                }
                NValue::ZERO
            } else {
                flag_cfg.nvalue
            };

            flags.push(self.parse_configured_flag(name, flag_cfg, nvalue, lexeme.pos));
        }

        Node::CompoundShortFlag(flags)
    }

    fn parse_configured_flag(
        &mut self,
        name: String,
        cfg: &FlagConfig,
        nvalue: NValue,
        pos: Position,
    ) -> Node {
        trace!(flag = %name, nvalue = %nvalue, "parsing flag values");

        let mut flag = Flag::new(name);
        let mut ident_index = 0usize;
        let mut pending_key: Option<String> = None;

        loop {
            let lexeme = self.scan();
            if lexeme.token == Token::Eol {
                break;
            }

            if !nvalue.contains(ident_index as isize) {
                self.unscan(lexeme);
                break;
            }

            match lexeme.token {
                Token::ArgDelimiter => {
                    pending_key = None;
                    flag.nodes.push(Node::ArgDelimiter);
                }
                Token::Assign => {
                    if let Some(Node::Ident(key)) = flag.nodes.last() {
                        pending_key = Some(key.clone());
                    }
                    flag.nodes.push(Node::Assign);
                }
                Token::Ident | Token::StdinFlag => {
                    if let Some(key) = pending_key.take() {
                        trace!(flag = %flag.name, %key, value = %lexeme.literal, "key/value pair");
                        flag.values.push(KeyValue::new(key, lexeme.literal.clone()));
                        flag.nodes.push(leaf(lexeme));
                        ident_index += 1;
                        continue;
                    }

                    let key = value_name(&cfg.value_names, nvalue, ident_index);
                    trace!(flag = %flag.name, key = %key, value = %lexeme.literal, "flag value");
                    flag.values.push(KeyValue::new(key, lexeme.literal.clone()));

                    match flag.nodes.last_mut() {
                        Some(Node::MultiIdent(group)) => group.push(leaf(lexeme)),
                        _ => flag.nodes.push(leaf(lexeme)),
                    }
                    ident_index += 1;
                }
                Token::MultiValueDelimiter => {
                    pending_key = None;
                    start_group(&mut flag.nodes);
                }
                _ => {
                    self.unscan(lexeme);
                    break;
                }
            }
        }

        if let Some(on) = &cfg.on {
            if let Err(err) = on(&flag) {
                self.errors.add(pos, err.to_string());
            }
        }

        Node::Flag(flag)
    }

    fn parse_passthrough(&mut self, started: bool) -> Option<Node> {
        let mut args = Vec::new();
        let mut current = started.then(String::new);

        loop {
            let lexeme = self.scan();

            match lexeme.token {
                Token::Eol => break,
                Token::ArgDelimiter => {
                    if let Some(arg) = current.replace(String::new()) {
                        args.push(Node::Ident(arg));
                    }
                }
                _ => current
                    .get_or_insert_with(String::new)
                    .push_str(&lexeme.literal),
            }
        }

        if let Some(arg) = current {
            args.push(Node::Ident(arg));
        }

        trace!(args = args.len(), "passthrough");

        (!args.is_empty()).then_some(Node::PassthroughArgs(args))
    }
}

fn leaf(lexeme: Lexeme) -> Node {
    match lexeme.token {
        Token::StdinFlag => Node::StdinFlag,
        _ => Node::Ident(lexeme.literal),
    }
}

/// Opens a multi-value group at the end of `nodes`, wrapping a preceding
/// value leaf when there is one.
fn start_group(nodes: &mut Vec<Node>) {
    match nodes.last_mut() {
        Some(Node::MultiIdent(_)) => {}
        Some(last @ (Node::Ident(_) | Node::StdinFlag)) => {
            let first = std::mem::replace(last, Node::MultiIdent(Vec::new()));
            if let Node::MultiIdent(group) = last {
                group.push(first);
            }
        }
        _ => nodes.push(Node::MultiIdent(Vec::new())),
    }
}
