// ABOUTME: emits a json schema for the exported history array to stdout.
// ABOUTME: intended for tools that consume terminal-history-*.json exports.

fn main() {
    let schema = schemars::schema_for!(Vec<nlterm_common::HistoryEntry>);
    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    println!("{json}");
}
