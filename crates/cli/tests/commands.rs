use std::io::Cursor;

use rankset_cli::{run, OutputFormat, SessionStats};
use rankset_core::Registry;

fn session(script: &str, format: OutputFormat) -> (String, SessionStats, Registry) {
    let registry = Registry::new();
    let mut out = Vec::new();
    let stats = run(&registry, Cursor::new(script), &mut out, format).unwrap();
    (String::from_utf8(out).unwrap(), stats, registry)
}

#[test]
fn test_leaderboard_script_text() {
    let script = "\
# build a board
ZADD leaderboard 10 alice 20 bob 10 carol

ZRANK leaderboard carol
ZADD leaderboard 25 alice
ZREVRANGE leaderboard 0 -1 WITHSCORES
ZCOUNT leaderboard (10 +inf
ZSCORE leaderboard nobody
";
    let (out, stats, registry) = session(script, OutputFormat::Text);
    let expected = "\
(integer) 3
(integer) 1
(integer) 0
1) \"alice\"
2) \"25\"
3) \"bob\"
4) \"20\"
5) \"carol\"
6) \"10\"
(integer) 2
(nil)
";
    assert_eq!(out, expected);
    assert_eq!(stats, SessionStats { commands: 6, errors: 0 });
    assert_eq!(registry.cardinality("leaderboard"), 3);
}

#[test]
fn test_errors_do_not_stop_session() {
    let script = "\
ZADD s 1 a
BOGUS s
ZADD s nan b
ZINCRBY s 2.5 a
ZCARD s
";
    let (out, stats, _) = session(script, OutputFormat::Text);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "(integer) 1");
    assert!(lines[1].starts_with("(error) unknown command"));
    assert!(lines[2].starts_with("(error) "));
    assert_eq!(lines[3], "\"3.5\"");
    assert_eq!(lines[4], "(integer) 1");
    assert_eq!(stats, SessionStats { commands: 5, errors: 2 });
}

#[test]
fn test_json_output() {
    let script = "\
ZADD s 1 a 2 b
ZRANGE s 0 -1
ZRANK s zzz
ZRANGE s x 1
";
    let (out, _, _) = session(script, OutputFormat::Json);
    let values: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(values[0], serde_json::json!(2));
    assert_eq!(values[1], serde_json::json!(["a", "b"]));
    assert_eq!(values[2], serde_json::Value::Null);
    assert!(values[3]["error"].as_str().unwrap().contains("not an integer"));
}

#[test]
fn test_set_lifecycle_commands() {
    let script = "\
ZADD b 1 x
ZADD a 1 y
KEYS
ZREM a y
EXISTS a
DEL a
EXISTS a
KEYS
";
    let (out, _, registry) = session(script, OutputFormat::Text);
    let expected = "\
(integer) 1
(integer) 1
1) \"a\"
2) \"b\"
(integer) 1
(integer) 1
(integer) 1
(integer) 0
1) \"b\"
";
    assert_eq!(out, expected);
    assert_eq!(registry.list_sets(), vec!["b".to_string()]);
}

#[test]
fn test_range_by_score_bounds() {
    let script = "\
ZADD s 1 a 2 b 3 c 4 d
ZRANGEBYSCORE s (1 3
ZRANGEBYSCORE s -inf (2 WITHSCORES
ZRANGEBYSCORE s 5 +inf
";
    let (out, _, _) = session(script, OutputFormat::Text);
    let expected = "\
(integer) 4
1) \"b\"
2) \"c\"
1) \"a\"
2) \"1\"
(empty array)
";
    assert_eq!(out, expected);
}

#[test]
fn test_inverted_infinite_bounds_match_nothing() {
    let script = "\
ZADD s 1 a 2 b 3 c
ZCOUNT s +inf -inf
ZRANGEBYSCORE s +inf -inf
ZCOUNT s 2 -inf
ZCOUNT s -inf +inf
ZREVRANGEBYSCORE s -inf +inf
";
    let (out, stats, _) = session(script, OutputFormat::Text);
    let expected = "\
(integer) 3
(integer) 0
(empty array)
(integer) 0
(integer) 3
(empty array)
";
    assert_eq!(out, expected);
    assert_eq!(stats.errors, 0);
}

#[test]
fn test_reverse_score_range_with_limit() {
    let script = "\
ZADD s 1 a 2 b 3 c 4 d 5 e
ZREVRANGEBYSCORE s +inf -inf
ZREVRANGEBYSCORE s 4 (1 LIMIT 1 2
ZRANGEBYSCORE s -inf +inf WITHSCORES LIMIT 3 -1
ZRANGEBYSCORE s -inf +inf LIMIT 0 0
";
    let (out, _, _) = session(script, OutputFormat::Text);
    let expected = "\
(integer) 5
1) \"e\"
2) \"d\"
3) \"c\"
4) \"b\"
5) \"a\"
1) \"c\"
2) \"b\"
1) \"d\"
2) \"4\"
3) \"e\"
4) \"5\"
(empty array)
";
    assert_eq!(out, expected);
}
