// src/bgg/xml.rs
//
// Small roxmltree helpers shared by the endpoint parsers.

use roxmltree::Node;

/// First element child named `name`.
pub fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Element children named `name`, in document order.
pub fn children<'a, 'i: 'a>(node: Node<'a, 'i>, name: &'a str) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children().filter(move |n| n.has_tag_name(name))
}

/// Walk a `a/b/c` element path from `node`.
pub fn path<'a, 'i>(node: Node<'a, 'i>, p: &str) -> Option<Node<'a, 'i>> {
    p.split('/').try_fold(node, |n, step| child(n, step))
}

/// `value` attribute of the child element `name`.
pub fn value_of<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|c| c.attribute("value"))
}

/// Text of the child element `name`.
pub fn text_of<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|c| c.text())
}

/// Numeric `value` attribute. Missing, empty and unparsable all give `None`.
pub fn num_value<T: std::str::FromStr>(node: Node<'_, '_>, name: &str) -> Option<T> {
    match value_of(node, name).map(str::trim) {
        None | Some("") => None,
        Some(v) => {
            let parsed = v.parse().ok();
            if parsed.is_none() {
                logd!("Ignoring bad {name} value '{v}'");
            }
            parsed
        }
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
