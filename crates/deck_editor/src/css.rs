//! Inline `style` attribute handling.

use crate::geometry::{format_px, parse_px, Point};

/// Ordered inline declarations of one element's `style` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleDeclarations(Vec<(String, String)>);

impl StyleDeclarations {
    pub fn parse(style: &str) -> Self {
        let declarations = split_declarations(style)
            .into_iter()
            .filter_map(|declaration| {
                let (property, value) = declaration.split_once(':')?;
                let property = property.trim().to_ascii_lowercase();
                let value = value.trim();
                if property.is_empty() || value.is_empty() {
                    return None;
                }
                Some((property, value.to_string()))
            })
            .collect();
        Self(declarations)
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        self.0.retain(|(name, _)| *name != property);
        self.0.push((property, value.to_string()));
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        let index = self.0.iter().position(|(name, _)| *name == property)?;
        let (_, value) = self.0.remove(index);
        self.0.retain(|(name, _)| *name != property);
        Some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Splits on the `;` that end declarations. Semicolons inside quotes or
/// parentheses (`url(data:...;base64,...)`) belong to the value.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (index, c) in style.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&style[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&style[start..]);
    parts
}

/// Total pixel translation contributed by the `translate*` functions of a
/// transform list. Other functions (rotate, scale, ...) are ignored.
pub fn translate_offset(transform: &str) -> Point {
    let mut offset = Point::ZERO;
    let mut rest = transform;
    while let Some(open) = rest.find('(') {
        let name = rest[..open]
            .rsplit(|c: char| c.is_whitespace() || c == ')')
            .next()
            .unwrap_or("")
            .trim();
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        let args: Vec<f64> = rest[open + 1..open + close]
            .split(',')
            .filter_map(parse_px)
            .collect();
        match (name, args.as_slice()) {
            ("translate", [x]) | ("translateX", [x]) => offset.x += x,
            ("translate", [x, y]) => {
                offset.x += x;
                offset.y += y;
            }
            ("translateY", [y]) => offset.y += y,
            _ => {}
        }
        rest = &rest[open + close + 1..];
    }
    offset
}

/// Composes a preview translation after an element's own transform.
pub fn compose_translate(base: Option<&str>, delta: Point) -> String {
    let translate = format!("translate({}, {})", format_px(delta.x), format_px(delta.y));
    match base.map(str::trim).filter(|b| !b.is_empty() && *b != "none") {
        Some(base) => format!("{base} {translate}"),
        None => translate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_round_trip_and_replace() {
        let mut style = StyleDeclarations::parse("Left: 10px; top:4px;; color : red");
        assert_eq!(style.get("left"), Some("10px"));
        style.set("left", "24px");
        assert_eq!(style.to_css(), "top: 4px; color: red; left: 24px");
        assert_eq!(style.remove("color").as_deref(), Some("red"));
        assert_eq!(style.remove("color"), None);
    }

    #[test]
    fn semicolons_inside_urls_and_strings_stay_in_the_value() {
        let source = "background-image: url('data:image/png;base64,AAAA'); width: 10px; \
                      font-family: \"a;b\", serif; mask: url(x.svg#m;1)";
        let style = StyleDeclarations::parse(source);
        assert_eq!(
            style.get("background-image"),
            Some("url('data:image/png;base64,AAAA')")
        );
        assert_eq!(style.get("width"), Some("10px"));
        assert_eq!(style.get("font-family"), Some("\"a;b\", serif"));
        assert_eq!(style.get("mask"), Some("url(x.svg#m;1)"));
        assert_eq!(StyleDeclarations::parse(&style.to_css()), style);
    }

    #[test]
    fn translate_components_accumulate() {
        let offset = translate_offset("rotate(5deg) translate(10px, -4px) translateX(2px)");
        assert_eq!(offset, Point::new(12.0, -4.0));
        assert_eq!(translate_offset("none"), Point::ZERO);
    }

    #[test]
    fn preview_composes_after_base_transform() {
        assert_eq!(
            compose_translate(Some("rotate(5deg)"), Point::new(3.0, 4.5)),
            "rotate(5deg) translate(3px, 4.5px)"
        );
        assert_eq!(
            compose_translate(Some("none"), Point::new(1.0, 0.0)),
            "translate(1px, 0px)"
        );
    }
}
