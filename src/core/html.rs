// src/core/html.rs
//! DOM helpers on top of `scraper`.
//!
//! Selector lists are always tried in priority order; the first one that
//! yields something wins. Text is read with whitespace collapsed.

use scraper::{ElementRef, Html, Node, Selector};

use super::sanitize::{normalize_ws, to_lower};

pub fn parse(raw: &str) -> Html {
    Html::parse_document(raw)
}

pub fn compile(sel: &str) -> Result<Selector, String> {
    Selector::parse(sel).map_err(|e| format!("invalid selector '{sel}': {e:?}"))
}

pub fn compile_all(list: &[String]) -> Result<Vec<Selector>, String> {
    list.iter().map(|s| compile(s)).collect()
}

/// Visible text of an element, whitespace-normalized.
pub fn element_text(el: ElementRef<'_>) -> String {
    let parts: Vec<&str> = el.text().collect();
    normalize_ws(&parts.join(" "))
}

/// First selector with a non-empty match list, as (selector index, nodes).
pub fn select_first_nonempty<'a>(
    scope: ElementRef<'a>,
    selectors: &[Selector],
) -> Option<(usize, Vec<ElementRef<'a>>)> {
    selectors.iter().enumerate().find_map(|(i, sel)| {
        let nodes: Vec<ElementRef<'a>> = scope.select(sel).collect();
        if nodes.is_empty() { None } else { Some((i, nodes)) }
    })
}

/// Text of the first match (in selector priority order) that has any text.
pub fn first_text(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        scope
            .select(sel)
            .map(element_text)
            .find(|t| !t.is_empty())
    })
}

/// Elements owning a text node that contains `needle` (case-insensitive),
/// in document order. Script and style bodies are ignored.
pub fn elements_with_text<'a>(scope: ElementRef<'a>, needle: &str) -> Vec<ElementRef<'a>> {
    let needle = to_lower(&normalize_ws(needle));
    if needle.is_empty() {
        return Vec::new();
    }
    scope
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(t) if to_lower(&normalize_ws(t)).contains(&needle) => {
                node.parent().and_then(ElementRef::wrap)
            }
            _ => None,
        })
        .filter(|el| !matches!(el.value().name(), "script" | "style" | "noscript"))
        .collect()
}

pub fn element_with_text<'a>(scope: ElementRef<'a>, needle: &str) -> Option<ElementRef<'a>> {
    elements_with_text(scope, needle).into_iter().next()
}

pub fn next_sibling_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// `el` itself or its nearest ancestor whose tag is one of `names`.
pub fn enclosing_element<'a>(el: ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| names.contains(&e.value().name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sels(list: &[&str]) -> Vec<Selector> {
        compile_all(&list.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn priority_list_falls_through_to_first_hit() {
        let doc = parse(r#"<ul><li class="b">one</li><li class="b">two</li></ul>"#);
        let list = sels(&["li.a", "li.b", "li"]);
        let (i, nodes) = select_first_nonempty(doc.root_element(), &list).unwrap();
        assert_eq!(i, 1);
        assert_eq!(nodes.len(), 2);
        assert!(select_first_nonempty(doc.root_element(), &sels(&["table"])).is_none());
    }

    #[test]
    fn first_text_skips_empty_matches() {
        let doc = parse(r#"<span class="p"> </span><span id="q">$5.00</span>"#);
        let t = first_text(doc.root_element(), &sels(&["span.p", "#q"]));
        assert_eq!(t.as_deref(), Some("$5.00"));
    }

    #[test]
    fn text_lookup_returns_owning_element() {
        let doc = parse(r#"<table><tr><th> Best Sellers Rank </th><td>#5 in Games</td></tr></table>"#);
        let th = element_with_text(doc.root_element(), "best sellers rank").unwrap();
        assert_eq!(th.value().name(), "th");
        let td = next_sibling_element(th).unwrap();
        assert_eq!(element_text(td), "#5 in Games");
    }

    #[test]
    fn script_bodies_are_not_text() {
        let doc = parse(r#"<script>var x = "Best Sellers Rank";</script><b>Best Sellers Rank</b>"#);
        let all = elements_with_text(doc.root_element(), "Best Sellers Rank");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value().name(), "b");
    }

    #[test]
    fn text_lookup_sees_through_nbsp() {
        let doc = parse("<span>Best Sellers\u{a0}Rank:</span>");
        let el = element_with_text(doc.root_element(), "Best Sellers Rank").unwrap();
        assert_eq!(el.value().name(), "span");
    }

    #[test]
    fn enclosing_cell_of_wrapped_label() {
        let doc = parse(r#"<table><tr><th><span><b>Label</b></span></th><td>x</td></tr></table>"#);
        let b = element_with_text(doc.root_element(), "label").unwrap();
        let th = enclosing_element(b, &["th", "td"]).unwrap();
        assert_eq!(th.value().name(), "th");
        assert_eq!(element_text(next_sibling_element(th).unwrap()), "x");
        assert!(enclosing_element(b, &["li"]).is_none());
    }

    #[test]
    fn bad_selector_is_reported() {
        assert!(compile("div[").unwrap_err().contains("div["));
    }
}
