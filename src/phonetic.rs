//! Classic four-symbol Soundex phonetic encoding.

/// Encode a single token (typically a surname) into a four-symbol
/// Soundex code: the first letter uppercased, followed by three digits.
///
/// Non-letter characters are stripped before encoding. Vowels and `H`/
/// `W` are dropped; consecutive duplicate digits collapse, with the
/// classical rule that a duplicate separated only by `H`/`W` still
/// collapses (so "Ashcraft" and "Ashcroft" encode the same way), while a
/// duplicate separated by a vowel does not. Letters with no digit
/// mapping (`H`, `W`, vowels, and `Y`) are ignored positionally except
/// for the adjacency rule above. An empty or letter-free input yields
/// the empty string.
pub fn soundex(input: &str) -> String {
    let letters: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if letters.is_empty() {
        return String::new();
    }

    let first = letters[0];
    let mut code = String::with_capacity(4);
    code.push(first);

    // H/W never reset `last_digit`, so a repeated consonant on either
    // side of one still collapses into a single code digit. A vowel (or
    // Y) does reset it, so a repeated consonant across a vowel is coded
    // again — this is the classical Soundex adjacency rule.
    let mut last_digit = digit_for(first);

    for &ch in &letters[1..] {
        if code.len() == 4 {
            break;
        }
        if ch == 'H' || ch == 'W' {
            continue;
        }
        match digit_for(ch) {
            Some(d) => {
                if Some(d) != last_digit {
                    code.push(char::from(b'0' + d));
                }
                last_digit = Some(d);
            }
            None => last_digit = None,
        }
    }

    while code.len() < 4 {
        code.push('0');
    }

    code
}

fn digit_for(c: char) -> Option<u8> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some(1),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some(2),
        'D' | 'T' => Some(3),
        'L' => Some(4),
        'M' | 'N' => Some(5),
        'R' => Some(6),
        _ => None,
    }
}

/// Similarity between two Soundex codes (not raw tokens).
///
/// `0.0` if either is empty; `0.9` if the codes are identical; otherwise
/// `0.5 + 0.1 * (matching digit positions among 2-4)` when the first
/// symbols agree (giving 0.6-0.8); `0.0` if even the first symbols
/// differ.
pub fn phonetic_similarity(a: &str, b: &str) -> f64 {
    let a = soundex(a);
    let b = soundex(b);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 0.9;
    }

    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    let first_a = a_chars.next();
    let first_b = b_chars.next();

    if first_a != first_b {
        return 0.0;
    }

    let matching = a_chars.zip(b_chars).filter(|(x, y)| x == y).count();
    0.5 + 0.1 * matching as f64
}
