//! Matching of canonical LIKE patterns (`*`, `?`, `\`).

use filter_engine::pattern::{ESCAPE, SINGLE_CHAR, WILDCARD};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Any,
    One,
    Char(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            ESCAPE => Token::Char(chars.next().unwrap_or(ESCAPE)),
            WILDCARD => Token::Any,
            SINGLE_CHAR => Token::One,
            other => Token::Char(other),
        });
    }
    tokens
}

pub fn matches(pattern: &str, text: &str, match_case: bool) -> bool {
    let (pattern, text) = if match_case {
        (pattern.to_string(), text.to_string())
    } else {
        (pattern.to_lowercase(), text.to_lowercase())
    };
    let tokens = tokenize(&pattern);
    let text: Vec<char> = text.chars().collect();

    // Greedy match with backtracking to the most recent wildcard.
    let (mut t, mut p) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Char(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            Some(Token::One) => {
                t += 1;
                p += 1;
            }
            Some(Token::Any) => {
                star = Some((p, t));
                p += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|token| *token == Token::Any)
}
