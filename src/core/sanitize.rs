// src/core/sanitize.rs

/// Collapse whitespace runs (incl. NBSP) to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Lower-case for matching. Non-ASCII letters go through full Unicode lowering
/// so localized phrases ("Auf Lager", "EN STOCK") compare equal.
pub fn to_lower(s: &str) -> String {
    s.to_lowercase()
}

/// Case-insensitive containment of any needle; first hit wins.
pub fn find_any_ci<'a>(haystack: &str, needles: &'a [String]) -> Option<&'a str> {
    let hay = to_lower(haystack);
    needles
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .find(|n| hay.contains(&to_lower(n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_collapses_nbsp_and_newlines() {
        assert_eq!(normalize_ws("  #1,234\u{a0}in\n\tVideo   Games "), "#1,234 in Video Games");
    }

    #[test]
    fn find_any_is_case_insensitive_and_ordered() {
        let needles = vec![s!(""), s!("Auf Lager"), s!("in stock")];
        assert_eq!(find_any_ci("Derzeit AUF LAGER.", &needles), Some("Auf Lager"));
        assert_eq!(find_any_ci("Currently unavailable", &needles), None);
    }
}
