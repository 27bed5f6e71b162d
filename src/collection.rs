// src/collection.rs
use crate::bgg::{CollectionEntry, collection};
use crate::config::options::CollectionKind;
use crate::core::{BggClient, RetryPolicy};
use crate::error::{Error, Result};

/// One list (owned / rated / wishlist) of `username`'s collection.
pub async fn fetch_collection(
    client: &BggClient,
    username: &str,
    kind: CollectionKind,
) -> Result<Vec<CollectionEntry>> {
    client.require_token()?;
    let username = username.trim();

    let query = [
        ("username", s!(username)),
        ("stats", s!("1")),
        ("subtype", s!("boardgame")),
        (kind.flag(), s!("1")),
    ];
    let xml = client.get_xml("collection", &query, &RetryPolicy::collection()).await?;

    let entries = collection::parse_entries(&xml)?;
    if entries.is_empty() {
        return Err(Error::EmptyCollection { kind: kind.flag(), username: s!(username) });
    }
    logf!("Found {} {} games for {username}", entries.len(), kind.flag());
    Ok(entries)
}
