//! Wildcard pattern translation
//!
//! `*` matches any run of characters; `\*` is a literal asterisk and `\\`
//! a literal backslash. Patterns map to the cheapest store lookup:
//!
//! | pattern   | lookup                          |
//! |-----------|---------------------------------|
//! | `abc`     | exact                           |
//! | `*abc`    | endswith                        |
//! | `abc*`    | startswith                      |
//! | `*abc*`   | contains                        |
//! | otherwise | regex (`*` becomes `.*?`)       |
//!
//! Case-insensitive variants are used for `ilike` and search.

use uuid::Uuid;

use crate::constants::RQL_ANY_SYMBOL;

use super::predicate::StoreLookup;

const ANY_REGEX: &str = ".*?";

/// Store lookup and operand for a wildcard pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub lookup: StoreLookup,
    pub value: String,
}

/// Translates `raw` into a store lookup. Returns `None` for the ambiguous
/// pattern `**`.
pub fn translate(raw: &str, case_insensitive: bool) -> Option<Pattern> {
    // Escaped wildcards are swapped for a token that cannot collide with
    // user input, then restored once the real wildcards are resolved.
    let nonce = Uuid::new_v4().simple().to_string();
    let protected = raw.replace("\\*", &nonce);
    let value = unescape_backslashes(&protected);

    if value == "**" {
        return None;
    }

    let count = value.matches(RQL_ANY_SYMBOL).count();
    let starts = value.starts_with(RQL_ANY_SYMBOL);
    let ends = value.ends_with(RQL_ANY_SYMBOL);
    let restore = |s: &str| s.replace(&nonce, "*");

    let (lookup, operand) = if count == 0 {
        (StoreLookup::Exact, restore(&value))
    } else if value.len() == 1 {
        (StoreLookup::Contains, String::new())
    } else if count == 1 && starts {
        (StoreLookup::EndsWith, restore(&value[1..]))
    } else if count == 1 && ends {
        (StoreLookup::StartsWith, restore(&value[..value.len() - 1]))
    } else if count == 2 && starts && ends {
        (StoreLookup::Contains, restore(&value[1..value.len() - 1]))
    } else {
        (StoreLookup::Regex, to_regex(&value, &nonce, starts, ends))
    };

    let lookup = if case_insensitive {
        insensitive(lookup)
    } else {
        lookup
    };
    Some(Pattern {
        lookup,
        value: operand,
    })
}

/// `\\` becomes `\`, any other lone backslash is dropped.
fn unescape_backslashes(value: &str) -> String {
    value
        .split("\\\\")
        .map(|part| part.replace('\\', ""))
        .collect::<Vec<_>>()
        .join("\\")
}

fn to_regex(value: &str, nonce: &str, starts: bool, ends: bool) -> String {
    let body = value
        .split(RQL_ANY_SYMBOL)
        .map(|segment| regex::escape(segment).replace(nonce, "\\*"))
        .collect::<Vec<_>>()
        .join(ANY_REGEX);

    let mut pattern = String::with_capacity(body.len() + 2);
    if !starts {
        pattern.push('^');
    }
    pattern.push_str(&body);
    if !ends {
        pattern.push('$');
    }
    pattern
}

fn insensitive(lookup: StoreLookup) -> StoreLookup {
    match lookup {
        StoreLookup::Exact => StoreLookup::IExact,
        StoreLookup::Contains => StoreLookup::IContains,
        StoreLookup::StartsWith => StoreLookup::IStartsWith,
        StoreLookup::EndsWith => StoreLookup::IEndsWith,
        StoreLookup::Regex => StoreLookup::IRegex,
        other => other,
    }
}
