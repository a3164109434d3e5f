//! Command parsing and execution against a [`Registry`].
//!
//! Commands are whitespace-separated tokens with a case-insensitive verb.
//! Each one maps onto a single registry call and yields a [`Reply`].

use rankset_core::{Limit, Registry, ScoreRange, ScoredMember, SortedSetError};
use serde::Serialize;
use std::fmt;
use std::ops::Bound;
use thiserror::Error;

/// Why a command line could not be run.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("wrong number of arguments for '{0}'")]
    Arity(&'static str),
    #[error("value is not a valid float: '{0}'")]
    NotFloat(String),
    #[error("value is not an integer: '{0}'")]
    NotInteger(String),
    #[error("syntax error near '{0}'")]
    Syntax(String),
    #[error(transparent)]
    Core(#[from] SortedSetError),
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        key: String,
        entries: Vec<(String, f64)>,
    },
    IncrBy {
        key: String,
        delta: f64,
        member: String,
    },
    Remove {
        key: String,
        members: Vec<String>,
    },
    Score {
        key: String,
        member: String,
    },
    Card {
        key: String,
    },
    Rank {
        key: String,
        member: String,
        reverse: bool,
    },
    Range {
        key: String,
        start: i64,
        stop: i64,
        with_scores: bool,
        reverse: bool,
    },
    RangeByScore {
        key: String,
        range: ScoreRange,
        with_scores: bool,
        limit: Option<Limit>,
        reverse: bool,
    },
    Count {
        key: String,
        range: ScoreRange,
    },
    Exists {
        key: String,
    },
    Del {
        key: String,
    },
    Keys,
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Nil,
    Integer(i64),
    Float(f64),
    Array(Vec<String>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(n) => write!(f, "(integer) {n}"),
            Reply::Float(x) => write!(f, "\"{x}\""),
            Reply::Array(items) if items.is_empty() => write!(f, "(empty array)"),
            Reply::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) \"{}\"", i + 1, item)?;
                }
                Ok(())
            }
        }
    }
}

fn parse_float(token: &str) -> Result<f64, CommandError> {
    token
        .parse::<f64>()
        .map_err(|_| CommandError::NotFloat(token.to_string()))
}

fn parse_int(token: &str) -> Result<i64, CommandError> {
    token
        .parse::<i64>()
        .map_err(|_| CommandError::NotInteger(token.to_string()))
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    Min,
    Max,
}

/// `(x` is exclusive, anything else inclusive. An infinity on its own side
/// of the range is an open end; on the opposite side it is a real bound, so
/// `+inf -inf` matches nothing.
fn parse_bound(token: &str, side: Side) -> Result<Bound<f64>, CommandError> {
    let (value, exclusive) = match token.strip_prefix('(') {
        Some(rest) => (parse_float(rest)?, true),
        None => (parse_float(token)?, false),
    };
    let open = match side {
        Side::Min => value == f64::NEG_INFINITY,
        Side::Max => value == f64::INFINITY,
    };
    Ok(if open {
        Bound::Unbounded
    } else if exclusive {
        Bound::Excluded(value)
    } else {
        Bound::Included(value)
    })
}

fn parse_range(min: &str, max: &str) -> Result<ScoreRange, CommandError> {
    Ok(ScoreRange::new(
        parse_bound(min, Side::Min)?,
        parse_bound(max, Side::Max)?,
    ))
}

fn with_scores_flag(rest: &[&str]) -> Result<bool, CommandError> {
    match rest {
        [] => Ok(false),
        [flag] if flag.eq_ignore_ascii_case("withscores") => Ok(true),
        [other, ..] => Err(CommandError::Syntax(other.to_string())),
    }
}

/// `[WITHSCORES] [LIMIT offset count]` in any order. A negative count means
/// every remaining match.
fn score_range_options(rest: &[&str]) -> Result<(bool, Option<Limit>), CommandError> {
    let mut with_scores = false;
    let mut limit = None;
    let mut i = 0;
    while i < rest.len() {
        let token = rest[i];
        if token.eq_ignore_ascii_case("withscores") {
            with_scores = true;
            i += 1;
        } else if token.eq_ignore_ascii_case("limit") && i + 2 < rest.len() {
            let offset = usize::try_from(parse_int(rest[i + 1])?)
                .map_err(|_| CommandError::NotInteger(rest[i + 1].to_string()))?;
            let count = usize::try_from(parse_int(rest[i + 2])?).unwrap_or(usize::MAX);
            limit = Some(Limit::new(offset, count));
            i += 3;
        } else {
            return Err(CommandError::Syntax(token.to_string()));
        }
    }
    Ok((with_scores, limit))
}

fn flatten(entries: Vec<ScoredMember>, with_scores: bool) -> Reply {
    let mut out = Vec::with_capacity(entries.len() * if with_scores { 2 } else { 1 });
    for e in entries {
        out.push(e.member);
        if with_scores {
            out.push(e.score.to_string());
        }
    }
    Reply::Array(out)
}

fn count(n: u64) -> Reply {
    Reply::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

fn opt_count(n: Option<u64>) -> Reply {
    n.map_or(Reply::Nil, count)
}

impl Command {
    /// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let verb = tokens[0].to_ascii_uppercase();
        let args = &tokens[1..];
        let key = |name: &'static str, min: usize| -> Result<String, CommandError> {
            if args.len() < min {
                return Err(CommandError::Arity(name));
            }
            Ok(args[0].to_string())
        };

        let cmd = match verb.as_str() {
            "ZADD" => {
                let key = key("zadd", 3)?;
                let pairs = &args[1..];
                if pairs.len() % 2 != 0 {
                    return Err(CommandError::Arity("zadd"));
                }
                let entries = pairs
                    .chunks(2)
                    .map(|p| Ok((p[1].to_string(), parse_float(p[0])?)))
                    .collect::<Result<Vec<_>, CommandError>>()?;
                Command::Add { key, entries }
            }
            "ZINCRBY" => {
                if args.len() != 3 {
                    return Err(CommandError::Arity("zincrby"));
                }
                Command::IncrBy {
                    key: args[0].to_string(),
                    delta: parse_float(args[1])?,
                    member: args[2].to_string(),
                }
            }
            "ZREM" => Command::Remove {
                key: key("zrem", 2)?,
                members: args[1..].iter().map(|m| m.to_string()).collect(),
            },
            "ZSCORE" | "ZRANK" | "ZREVRANK" => {
                if args.len() != 2 {
                    return Err(CommandError::Arity(match verb.as_str() {
                        "ZSCORE" => "zscore",
                        "ZRANK" => "zrank",
                        _ => "zrevrank",
                    }));
                }
                let (key, member) = (args[0].to_string(), args[1].to_string());
                match verb.as_str() {
                    "ZSCORE" => Command::Score { key, member },
                    "ZRANK" => Command::Rank {
                        key,
                        member,
                        reverse: false,
                    },
                    _ => Command::Rank {
                        key,
                        member,
                        reverse: true,
                    },
                }
            }
            "ZCARD" | "EXISTS" | "DEL" => {
                if args.len() != 1 {
                    return Err(CommandError::Arity(match verb.as_str() {
                        "ZCARD" => "zcard",
                        "EXISTS" => "exists",
                        _ => "del",
                    }));
                }
                let key = args[0].to_string();
                match verb.as_str() {
                    "ZCARD" => Command::Card { key },
                    "EXISTS" => Command::Exists { key },
                    _ => Command::Del { key },
                }
            }
            "ZRANGE" | "ZREVRANGE" => {
                let name = if verb == "ZRANGE" { "zrange" } else { "zrevrange" };
                if !(3..=4).contains(&args.len()) {
                    return Err(CommandError::Arity(name));
                }
                Command::Range {
                    key: args[0].to_string(),
                    start: parse_int(args[1])?,
                    stop: parse_int(args[2])?,
                    with_scores: with_scores_flag(&args[3..])?,
                    reverse: verb == "ZREVRANGE",
                }
            }
            "ZRANGEBYSCORE" | "ZREVRANGEBYSCORE" => {
                let reverse = verb == "ZREVRANGEBYSCORE";
                if args.len() < 3 {
                    return Err(CommandError::Arity(if reverse {
                        "zrevrangebyscore"
                    } else {
                        "zrangebyscore"
                    }));
                }
                // The reverse form takes `max min`.
                let range = if reverse {
                    parse_range(args[2], args[1])?
                } else {
                    parse_range(args[1], args[2])?
                };
                let (with_scores, limit) = score_range_options(&args[3..])?;
                Command::RangeByScore {
                    key: args[0].to_string(),
                    range,
                    with_scores,
                    limit,
                    reverse,
                }
            }
            "ZCOUNT" => {
                if args.len() != 3 {
                    return Err(CommandError::Arity("zcount"));
                }
                Command::Count {
                    key: args[0].to_string(),
                    range: parse_range(args[1], args[2])?,
                }
            }
            "KEYS" => {
                if !args.is_empty() {
                    return Err(CommandError::Arity("keys"));
                }
                Command::Keys
            }
            _ => return Err(CommandError::Unknown(tokens[0].to_string())),
        };
        Ok(Some(cmd))
    }

    /// Runs the command against `registry`.
    pub fn execute(&self, registry: &Registry) -> Result<Reply, CommandError> {
        let reply = match self {
            Command::Add { key, entries } => {
                let pairs: Vec<(&str, f64)> =
                    entries.iter().map(|(m, s)| (m.as_str(), *s)).collect();
                count(registry.add_many(key, &pairs)?)
            }
            Command::IncrBy { key, delta, member } => {
                Reply::Float(registry.incr_by(key, member, *delta)?)
            }
            Command::Remove { key, members } => count(
                members
                    .iter()
                    .filter(|m| registry.remove(key, m))
                    .count() as u64,
            ),
            Command::Score { key, member } => {
                registry.score(key, member).map_or(Reply::Nil, Reply::Float)
            }
            Command::Card { key } => count(registry.cardinality(key)),
            Command::Rank {
                key,
                member,
                reverse: false,
            } => opt_count(registry.rank(key, member)),
            Command::Rank {
                key,
                member,
                reverse: true,
            } => opt_count(registry.rev_rank(key, member)),
            Command::Range {
                key,
                start,
                stop,
                with_scores,
                reverse,
            } => {
                let entries = if *reverse {
                    registry.rev_range_by_rank(key, *start, *stop)
                } else {
                    registry.range_by_rank(key, *start, *stop)
                };
                flatten(entries, *with_scores)
            }
            Command::RangeByScore {
                key,
                range,
                with_scores,
                limit,
                reverse,
            } => {
                let entries = if *reverse {
                    registry.rev_range_by_score(key, range, *limit)?
                } else {
                    registry.range_by_score(key, range, *limit)?
                };
                flatten(entries, *with_scores)
            }
            Command::Count { key, range } => count(registry.count_by_score(key, range)?),
            Command::Exists { key } => Reply::Integer(i64::from(registry.exists(key))),
            Command::Del { key } => Reply::Integer(i64::from(registry.delete_set(key))),
            Command::Keys => Reply::Array(registry.list_sets()),
        };
        Ok(reply)
    }
}
