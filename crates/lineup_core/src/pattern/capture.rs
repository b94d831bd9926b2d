//! Structural scanning of regex text
//!
//! A three-state scanner (escaped / inside `[...]` / normal). It covers the
//! pattern subset Lineup generates and accepts; it is not a regex parser.

/// Count capturing groups in `pattern`
///
/// Every unescaped `(` outside a character class counts unless the next
/// character is `?`, which marks a non-capturing or special group.
pub fn count_capturing_groups(pattern: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if chars.peek() != Some(&'?') {
                    count += 1;
                }
            }
            _ => {}
        }
    }

    count
}

/// Whether `pattern` contains any unescaped quantifier outside a class
pub fn has_quantifier(pattern: &str) -> bool {
    let mut escaped = false;
    let mut in_class = false;
    let mut prev: Option<char> = None;

    for c in pattern.chars() {
        if escaped {
            escaped = false;
            prev = Some(c);
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '*' | '+' | '{' if !in_class => return true,
            '?' if !in_class && prev != Some('(') => return true,
            _ => {}
        }
        prev = Some(c);
    }

    false
}
