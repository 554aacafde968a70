//! Alphanumeric collation for level labels.
//!
//! Digit runs compare by numeric value and letters compare case-insensitively,
//! so `"item2" < "item10"` and `"apple" < "Banana"`. Strings that tie on that
//! primary order fall back to lowercase-before-uppercase and finally to plain
//! byte order, which keeps the comparator a total order.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings alphanumerically.
#[must_use]
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    primary(a, b).then_with(|| tertiary(a, b)).then_with(|| a.cmp(b))
}

fn primary(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l = digit_run(&mut left);
                let r = digit_run(&mut right);
                let ord = compare_digit_runs(&l, &r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn tertiary(a: &str, b: &str) -> Ordering {
    for (l, r) in a.chars().zip(b.chars()) {
        if l == r {
            continue;
        }
        if l.is_lowercase() && r.is_uppercase() {
            return Ordering::Less;
        }
        if l.is_uppercase() && r.is_lowercase() {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

fn digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(values: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = values.iter().map(|s| (*s).to_string()).collect();
        v.sort_by(|a, b| compare_alphanumeric(a, b));
        v
    }

    #[test]
    fn test_numeric_runs() {
        assert_eq!(compare_alphanumeric("item2", "item10"), Ordering::Less);
        assert_eq!(compare_alphanumeric("item10", "item2"), Ordering::Greater);
    }

    #[test]
    fn test_sort_labels() {
        assert_eq!(sorted(&["b", "a", "a10", "a2"]), vec!["a", "a2", "a10", "b"]);
    }

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(sorted(&["Banana", "apple", "cherry"]), vec!["apple", "Banana", "cherry"]);
    }

    #[test]
    fn test_lowercase_first_on_tie() {
        assert_eq!(compare_alphanumeric("a", "A"), Ordering::Less);
        assert_eq!(compare_alphanumeric("A", "a"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(compare_alphanumeric("x007", "x8"), Ordering::Less);
        assert_ne!(compare_alphanumeric("01", "1"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_is_smaller() {
        assert_eq!(compare_alphanumeric("a", "a2"), Ordering::Less);
        assert_eq!(compare_alphanumeric("", "a"), Ordering::Less);
    }

    #[test]
    fn test_equal() {
        assert_eq!(compare_alphanumeric("audi", "audi"), Ordering::Equal);
    }
}
