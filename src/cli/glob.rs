//! Minimal glob matching for `view --search`: `*` matches any run of
//! characters, `?` matches exactly one.

fn match_glob(pat: &[u8], mut s: &[u8]) -> bool {
    let mut pat = pat;
    while let Some(&p) = pat.first() {
        match p {
            b'*' => {
                pat = &pat[1..];
                if pat.is_empty() {
                    return true;
                }
                while !s.is_empty() {
                    if match_glob(pat, s) {
                        return true;
                    }
                    s = &s[1..];
                }
                return false;
            }
            b'?' => {
                if s.is_empty() {
                    return false;
                }
                pat = &pat[1..];
                s = &s[1..];
            }
            _ => {
                if s.first() != Some(&p) {
                    return false;
                }
                pat = &pat[1..];
                s = &s[1..];
            }
        }
    }
    s.is_empty()
}

/// Match `value` against `pattern`; an empty pattern matches everything.
pub fn matches(pattern: &str, value: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    match_glob(pattern.as_bytes(), value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match() {
        assert!(matches("root/a.txt", "root/a.txt"));
        assert!(!matches("root/a.txt", "root/b.txt"));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(matches("*", "anything/at/all"));
        assert!(matches("root/*", "root/sub/c.txt"));
        assert!(matches("*.txt", "root/a.txt"));
        assert!(matches("root/*.txt", "root/a.txt"));
        assert!(!matches("*.bin", "root/a.txt"));
    }

    #[test]
    fn question_mark_matches_one() {
        assert!(matches("?.txt", "a.txt"));
        assert!(!matches("?.txt", "ab.txt"));
        assert!(!matches("?.txt", ".txt"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        assert!(matches("", "whatever"));
        assert!(matches("", ""));
    }

    #[test]
    fn trailing_star_and_backtracking() {
        assert!(matches("a*b*c", "a-x-b-y-c"));
        assert!(!matches("a*b*c", "a-x-c-y-b"));
    }
}
