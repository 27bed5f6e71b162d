// src/bgg/thing.rs
use roxmltree::{Document, Node};

use super::GameRecord;
use super::xml::{children, num_value, path, text_of};
use crate::error::Result;

/// Parse a `thing?id=…&stats=1` response. Only an item without a usable id
/// is dropped; bad numbers just stay empty. A malformed document is an error.
pub fn parse_items(xml: &str) -> Result<Vec<GameRecord>> {
    let doc = Document::parse(xml)?;
    let mut out = Vec::new();

    for item in children(doc.root_element(), "item") {
        match parse_item(item) {
            Ok(g) => out.push(g),
            Err(e) => logw!("Skipping item {}: {e}", item.attribute("id").unwrap_or("?")),
        }
    }
    Ok(out)
}

fn parse_item(item: Node<'_, '_>) -> std::result::Result<GameRecord, String> {
    let id = item
        .attribute("id")
        .ok_or("missing id")?
        .parse::<u32>()
        .map_err(|e| format!("bad id: {e}"))?;

    let title = children(item, "name")
        .find(|n| n.attribute("type") == Some("primary"))
        .and_then(|n| n.attribute("value"))
        .map(str::to_string);

    let owned = |name: &str| text_of(item, name).map(str::to_string);

    let mut g = GameRecord {
        id,
        title,
        description: owned("description"),
        thumbnail: owned("thumbnail"),
        image: owned("image"),
        year_published: num_value(item, "yearpublished"),
        min_players: num_value(item, "minplayers"),
        max_players: num_value(item, "maxplayers"),
        min_playtime: num_value(item, "minplaytime"),
        max_playtime: num_value(item, "maxplaytime"),
        playing_time: num_value(item, "playingtime"),
        min_age: num_value(item, "minage"),
        categories: links(item, "boardgamecategory"),
        mechanics: links(item, "boardgamemechanic"),
        designers: links(item, "boardgamedesigner"),
        artists: links(item, "boardgameartist"),
        publishers: links(item, "boardgamepublisher"),
        ..GameRecord::default()
    };

    if let Some(stats) = path(item, "statistics/ratings") {
        g.geek_rating = num_value(stats, "bayesaverage");
        g.avg_rating = num_value(stats, "average");
        g.num_voters = num_value(stats, "usersrated");
        g.complexity = num_value(stats, "averageweight");
    }

    Ok(g)
}

fn links(item: Node<'_, '_>, kind: &str) -> String {
    children(item, "link")
        .filter(|l| l.attribute("type") == Some(kind))
        .filter_map(|l| l.attribute("value"))
        .collect::<Vec<_>>()
        .join(", ")
}
