// ABOUTME: masks credentials that users type into commands before they are shown or persisted.
// ABOUTME: only the value is replaced; the surrounding command text stays readable.

use std::sync::LazyLock;

use regex::Regex;

static SECRETS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)password[=:]\s*\S+").expect("Invalid password regex"), "password=***"),
        (Regex::new(r"(?i)token[=:]\s*\S+").expect("Invalid token regex"), "token=***"),
        (Regex::new(r"(?i)api[_-]?key[=:]\s*\S+").expect("Invalid api key regex"), "api_key=***"),
        (Regex::new(r"(?i)secret[=:]\s*\S+").expect("Invalid secret regex"), "secret=***"),
    ]
});

pub fn sanitize_for_display(command: &str) -> String {
    let mut out = command.to_string();
    for (pattern, replacement) in SECRETS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out
}
