// src/bgg/hot.rs
use roxmltree::Document;

use super::xml::children;
use crate::error::Result;

/// Ids from `hot?type=boardgame`, in rank order.
pub fn parse_ids(xml: &str) -> Result<Vec<u32>> {
    let doc = Document::parse(xml)?;
    Ok(children(doc.root_element(), "item")
        .filter_map(|i| i.attribute("id"))
        .filter_map(|id| id.trim().parse().ok())
        .collect())
}
