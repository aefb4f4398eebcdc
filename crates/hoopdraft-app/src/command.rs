// Commands typed at the draft prompt.

use std::str::FromStr;

use hoopdraft_core::draft::SortKey;
use thiserror::Error;

/// Default number of available players listed by `list`.
pub const DEFAULT_LIST_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Draft the n-th (1-based) listed available player.
    Pick(usize),
    /// Show the top n available players.
    List(usize),
    /// Reorder the pool; `None` restores the default order.
    Sort(Option<SortKey>),
    /// Switch to another dataset, replaying the draft so far.
    Dataset(String),
    /// List the configured datasets.
    Datasets,
    /// Show a roster: the human's, or the given 1-based team.
    Team(Option<usize>),
    /// Show the most recent n picks.
    Log(usize),
    /// Draft the best fitting player for the human.
    Auto,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("{command}: {message}")]
    BadArgument { command: String, message: String },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();
        let head = head.to_lowercase();

        if let Ok(n) = head.parse::<usize>() {
            return if n == 0 {
                Err(bad(&head, "list numbers start at 1"))
            } else {
                Ok(Command::Pick(n))
            };
        }

        match head.as_str() {
            "list" | "ls" => Ok(Command::List(number_or(&head, arg, DEFAULT_LIST_LEN)?)),
            "sort" => match arg.map(str::to_lowercase).as_deref() {
                None | Some("default") => Ok(Command::Sort(None)),
                Some(key) => SortKey::from_str_key(key)
                    .map(|k| Command::Sort(Some(k)))
                    .ok_or_else(|| bad(&head, "expected expert_rank, rank, adp or default")),
            },
            "dataset" => match arg {
                Some(name) => Ok(Command::Dataset(name.to_string())),
                None => Ok(Command::Datasets),
            },
            "datasets" => Ok(Command::Datasets),
            "team" => match arg {
                None => Ok(Command::Team(None)),
                Some(_) => Ok(Command::Team(Some(number_or(&head, arg, 1)?))),
            },
            "log" => Ok(Command::Log(number_or(&head, arg, 10)?)),
            "auto" => Ok(Command::Auto),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(head)),
        }
    }
}

fn bad(command: &str, message: &str) -> CommandError {
    CommandError::BadArgument {
        command: command.to_string(),
        message: message.to_string(),
    }
}

fn number_or(command: &str, arg: Option<&str>, default: usize) -> Result<usize, CommandError> {
    match arg {
        None => Ok(default),
        Some(s) => match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(bad(command, "expected a positive number")),
        },
    }
}

pub const HELP: &[&str] = &[
    "<n>                 draft the n-th listed player",
    "list [n]            show the top n available players",
    "sort <key>          expert_rank | rank | adp | default",
    "dataset [name]      switch dataset (no name: list them)",
    "team [n]            show your roster, or team n's",
    "log [n]             show the last n picks",
    "auto                draft the best fitting player for you",
    "quit                leave the draft",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Command, CommandError> {
        s.parse()
    }

    #[test]
    fn numbers_are_picks() {
        assert_eq!(parse("3"), Ok(Command::Pick(3)));
        assert_eq!(parse("  12  "), Ok(Command::Pick(12)));
        assert!(matches!(parse("0"), Err(CommandError::BadArgument { .. })));
    }

    #[test]
    fn sort_keys() {
        assert_eq!(parse("sort adp"), Ok(Command::Sort(Some(SortKey::Adp))));
        assert_eq!(parse("SORT Rank"), Ok(Command::Sort(Some(SortKey::Rank))));
        assert_eq!(parse("sort default"), Ok(Command::Sort(None)));
        assert_eq!(parse("sort"), Ok(Command::Sort(None)));
        assert!(matches!(parse("sort pts"), Err(CommandError::BadArgument { .. })));
    }

    #[test]
    fn dataset_with_and_without_name() {
        assert_eq!(parse("dataset avg_24_25"), Ok(Command::Dataset("avg_24_25".into())));
        assert_eq!(parse("dataset"), Ok(Command::Datasets));
    }

    #[test]
    fn optional_counts() {
        assert_eq!(parse("list"), Ok(Command::List(DEFAULT_LIST_LEN)));
        assert_eq!(parse("list 30"), Ok(Command::List(30)));
        assert_eq!(parse("log"), Ok(Command::Log(10)));
        assert_eq!(parse("team"), Ok(Command::Team(None)));
        assert_eq!(parse("team 4"), Ok(Command::Team(Some(4))));
        assert!(matches!(parse("log x"), Err(CommandError::BadArgument { .. })));
    }

    #[test]
    fn misc_commands() {
        assert_eq!(parse("auto"), Ok(Command::Auto));
        assert_eq!(parse("q"), Ok(Command::Quit));
        assert_eq!(parse("?"), Ok(Command::Help));
        assert_eq!(parse(""), Err(CommandError::Empty));
        assert_eq!(parse("draft"), Err(CommandError::Unknown("draft".into())));
    }
}
