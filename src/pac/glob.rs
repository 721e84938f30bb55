//! Shell expression matching for `shExpMatch`.
//!
//! `*` matches any run of characters, `?` exactly one, `[...]` one character
//! from a set (`a-z` ranges, `!` or `^` to negate) and `\` escapes the next
//! character. The whole input must match. Matching is case-sensitive.

use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyRun,
    Class { negated: bool, items: Vec<(char, char)> },
}

impl Token {
    fn push_regex(&self, re: &mut String) {
        match self {
            Token::Literal(c) => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            Token::AnyOne => re.push('.'),
            Token::AnyRun => re.push_str(".*"),
            Token::Class { negated, items } => {
                re.push_str(if *negated { "[^" } else { "[" });
                for (lo, hi) in items {
                    re.push_str(&regex::escape(lo.encode_utf8(&mut [0; 4])));
                    if lo != hi {
                        re.push('-');
                        re.push_str(&regex::escape(hi.encode_utf8(&mut [0; 4])));
                    }
                }
                re.push(']');
            }
        }
    }
}

/// A compiled shell expression.
///
/// The expression is translated to an anchored [`Regex`], so matching runs in
/// linear time whatever the number of stars.
#[derive(Debug, Clone)]
pub struct ShellPattern {
    regex: Option<Regex>,
}

impl ShellPattern {
    pub fn new(pattern: &str) -> Self {
        let regex = Regex::new(&to_regex(&tokenize(pattern)))
            .map_err(|e| debug!("shell expression {:?} matches nothing: {}", pattern, e))
            .ok();
        Self { regex }
    }

    pub fn matches(&self, input: &str) -> bool {
        self.regex.as_ref().map_or(false, |re| re.is_match(input))
    }
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                // consecutive stars are one star
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyOne);
                i += 1;
            }
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Literal(chars[i + 1]));
                i += 2;
            }
            '[' => match parse_class(&chars, i) {
                Some((token, next)) => {
                    tokens.push(token);
                    i = next;
                }
                None => {
                    tokens.push(Token::Literal('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    tokens
}

fn to_regex(tokens: &[Token]) -> String {
    let mut re = String::from("(?s)^");
    for token in tokens {
        token.push_regex(&mut re);
    }
    re.push('$');
    re
}

fn parse_class(chars: &[char], open: usize) -> Option<(Token, usize)> {
    let mut i = open + 1;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut items = Vec::new();
    let mut first = true;
    loop {
        let c = *chars.get(i)?;
        // a leading `]` is a member, not the terminator
        if c == ']' && !first {
            return Some((Token::Class { negated, items }, i + 1));
        }
        first = false;
        match (chars.get(i + 1), chars.get(i + 2)) {
            (Some('-'), Some(&hi)) if hi != ']' => {
                items.push((c.min(hi), c.max(hi)));
                i += 3;
            }
            _ => {
                items.push((c, c));
                i += 1;
            }
        }
    }
}

/// `shExpMatch(str, shexp)`.
pub fn sh_exp_match(input: &str, pattern: &str) -> bool {
    ShellPattern::new(pattern).matches(input)
}
