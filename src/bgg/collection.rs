// src/bgg/collection.rs
use roxmltree::{Document, Node};

use super::xml::{child, children, path, round2, text_of};
use super::{CollectionEntry, UserRating};
use crate::error::Result;

pub const NOT_RATED: &str = "Not Rated";

/// Collection items for display.
pub fn parse_entries(xml: &str) -> Result<Vec<CollectionEntry>> {
    let doc = Document::parse(xml)?;
    Ok(children(doc.root_element(), "item").map(parse_entry).collect())
}

fn parse_entry(item: Node<'_, '_>) -> CollectionEntry {
    let rating = path(item, "stats/rating");

    let bgg_rating = rating
        .and_then(|r| child(r, "average"))
        .and_then(|a| a.attribute("value"))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(round2);

    CollectionEntry {
        title: text_of(item, "name").unwrap_or("N/A").to_string(),
        year: text_of(item, "yearpublished").unwrap_or("N/A").to_string(),
        bgg_rating,
        your_rating: rating.and_then(own_rating).unwrap_or_else(|| s!(NOT_RATED)),
        plays: text_of(item, "numplays").unwrap_or("0").to_string(),
    }
}

// `<rating value="8">` normally; some responses carry it in a `<value>` child.
fn own_rating(rating: Node<'_, '_>) -> Option<String> {
    let usable = |v: &str| !v.is_empty() && v != "N/A";

    if let Some(v) = rating.attribute("value").filter(|v| usable(v)) {
        return Some(v.to_string());
    }
    let value = child(rating, "value")?;
    value
        .attribute("value")
        .filter(|v| !v.is_empty())
        .or_else(|| value.text())
        .filter(|v| usable(v))
        .map(str::to_string)
}

/// Numeric, positive ratings from a `rated=1&stats=1` collection.
pub fn parse_ratings(xml: &str) -> Result<Vec<UserRating>> {
    let doc = Document::parse(xml)?;
    let mut out = Vec::new();

    for item in children(doc.root_element(), "item") {
        let Some(value) = path(item, "stats/rating").and_then(|r| r.attribute("value")) else {
            continue;
        };
        let Ok(rating) = value.trim().parse::<f64>() else { continue };
        let Some(game_id) = item.attribute("objectid").and_then(|id| id.parse().ok()) else {
            continue;
        };
        if rating > 0.0 {
            out.push(UserRating {
                game_id,
                game_name: text_of(item, "name").unwrap_or("Unknown").to_string(),
                rating,
            });
        }
    }
    Ok(out)
}
