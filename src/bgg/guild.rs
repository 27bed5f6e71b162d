// src/bgg/guild.rs
use roxmltree::Document;

use crate::error::Result;

/// Member names on one `guild?members=1&page=N` page. Empty means past the end.
pub fn parse_members(xml: &str) -> Result<Vec<String>> {
    let doc = Document::parse(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("member"))
        .filter_map(|m| m.attribute("name"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}
