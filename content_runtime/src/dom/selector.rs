//! Minimal compound selectors: `tag`, `.class`, `[attr]`, `[attr=value]`.
//!
//! Parts may be combined (`div.option[data-index="2"]`). Combinators,
//! pseudo-classes and selector lists are not supported.

use super::{DomSurface, NodeId};

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    /// Attribute name and, if given, the exact value it must have.
    pub attributes: Vec<(String, Option<String>)>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

impl Selector {
    /// Parse a selector. Returns `None` for empty or unsupported input.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector::default();
        let mut chars = input.chars().peekable();

        let tag = take_ident(&mut chars);
        if !tag.is_empty() {
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let class = take_ident(&mut chars);
                    if class.is_empty() {
                        return None;
                    }
                    selector.classes.push(class);
                }
                '[' => {
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(ch) => body.push(ch),
                            None => return None,
                        }
                    }
                    let (name, value) = match body.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim().trim_matches(|q: char| q == '"' || q == '\'');
                            (name.trim().to_string(), Some(value.to_string()))
                        }
                        None => (body.trim().to_string(), None),
                    };
                    if name.is_empty() || !name.chars().all(is_ident_char) {
                        return None;
                    }
                    selector.attributes.push((name, value));
                }
                _ => return None,
            }
        }

        Some(selector)
    }

    /// Check whether `node` of `dom` matches.
    pub fn matches(&self, dom: &dyn DomSurface, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if dom.tag(node).map(str::to_ascii_lowercase).as_deref() != Some(tag.as_str()) {
                return false;
            }
        }

        if !self.classes.iter().all(|class| dom.has_class(node, class)) {
            return false;
        }

        self.attributes.iter().all(|(name, expected)| {
            match (dom.attribute(node, name), expected) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class() {
        let selector = Selector::parse(".h5p-content").unwrap();
        assert_eq!(selector.tag, None);
        assert_eq!(selector.classes, vec!["h5p-content".to_string()]);
    }

    #[test]
    fn test_parse_compound() {
        let selector = Selector::parse("div.option.selected[data-index=\"2\"][hidden]").unwrap();
        assert_eq!(selector.tag.as_deref(), Some("div"));
        assert_eq!(selector.classes.len(), 2);
        assert_eq!(
            selector.attributes,
            vec![
                ("data-index".to_string(), Some("2".to_string())),
                ("hidden".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_unsupported_selectors() {
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse("div p").is_none());
        assert!(Selector::parse(".a, .b").is_none());
        assert!(Selector::parse("[unterminated").is_none());
        assert!(Selector::parse(".").is_none());
    }
}
