//! Builds grammar configuration from [`clap`] command declarations.
//!
//! Lets an application that already declares its interface with clap parse
//! the same interface into a tree without repeating the declaration.

use clap::{Arg, ArgAction};
use tracing::trace;

use crate::{CommandConfig, FlagConfig, NValue};

/// Maps a clap command tree to a [`CommandConfig`].
///
/// Every named argument becomes a flag under its long name and its short
/// name. Value-less actions map to [`NValue::ZERO`], `Append` and unbounded
/// `num_args` to [`NValue::ONE_OR_MORE`], anything else to the maximum of its
/// `num_args`. `global` arguments are persistent. Positional arguments add up
/// to the command's own arity. Help and version arguments are skipped.
///
/// # Examples
///
/// ```
/// use argtree_core::{NValue, adapter::command_config_from_clap};
/// use clap::{Arg, ArgAction, Command};
///
/// let cmd = Command::new("app")
///     .arg(Arg::new("quiet").short('q').long("quiet").action(ArgAction::SetTrue))
///     .arg(Arg::new("input"));
///
/// let config = command_config_from_clap(&cmd);
/// assert_eq!(config.flag_config("q").map(|f| f.nvalue), Some(NValue::ZERO));
/// assert_eq!(config.nvalue, NValue::from(1));
/// ```
pub fn command_config_from_clap(cmd: &clap::Command) -> CommandConfig {
    let mut built = cmd.clone().disable_help_subcommand(true);
    built.build();

    convert(&built)
}

fn convert(cmd: &clap::Command) -> CommandConfig {
    trace!(command = cmd.get_name(), "converting clap command");

    let mut config = CommandConfig::new();
    let mut positionals = Vec::new();

    for arg in cmd.get_arguments() {
        if is_builtin(arg) {
            continue;
        }

        if arg.is_positional() {
            positionals.push(arg);
            continue;
        }

        let flag = FlagConfig {
            nvalue: flag_nvalue(arg),
            persist: arg.is_global_set(),
            value_names: value_names(arg),
            on: None,
        };

        if let Some(long) = arg.get_long() {
            config.set_flag_config(long, flag.clone());
        }
        if let Some(short) = arg.get_short() {
            config.set_flag_config(short.to_string(), flag);
        }
    }

    config.nvalue = positional_nvalue(&positionals);
    config.value_names = positionals
        .iter()
        .flat_map(|arg| {
            let names = value_names(arg);
            if names.is_empty() {
                vec![arg.get_id().as_str().to_string()]
            } else {
                names
            }
        })
        .collect();

    for sub in cmd.get_subcommands() {
        config.set_command_config(sub.get_name(), convert(sub));
    }

    config
}

fn is_builtin(arg: &Arg) -> bool {
    matches!(
        arg.get_action(),
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    )
}

fn flag_nvalue(arg: &Arg) -> NValue {
    let action = arg.get_action();

    if matches!(action, ArgAction::Append) {
        return NValue::ONE_OR_MORE;
    }

    if !action.takes_values() {
        return NValue::ZERO;
    }

    match arg.get_num_args().map(|range| range.max_values()) {
        Some(usize::MAX) => NValue::ONE_OR_MORE,
        Some(max) => NValue(max as i64),
        None => NValue(1),
    }
}

fn positional_nvalue(positionals: &[&Arg]) -> NValue {
    let mut total = 0i64;

    for arg in positionals {
        let max = arg.get_num_args().map_or(1, |range| range.max_values());

        if max == usize::MAX || matches!(arg.get_action(), ArgAction::Append) {
            return if positionals.iter().any(|a| a.is_required_set()) {
                NValue::ONE_OR_MORE
            } else {
                NValue::ZERO_OR_MORE
            };
        }

        total += max as i64;
    }

    NValue(total)
}

fn value_names(arg: &Arg) -> Vec<String> {
    arg.get_value_names()
        .map(|names| names.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}
