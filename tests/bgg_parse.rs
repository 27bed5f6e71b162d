// tests/bgg_parse.rs
//
// XML API2 response parsing: thing, hot, guild and collection.

use scout::bgg::{collection, guild, hot, thing};

const THING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
  <item type="boardgame" id="174430">
    <thumbnail>https://cf.geekdo-images.com/thumb.jpg</thumbnail>
    <image>https://cf.geekdo-images.com/full.jpg</image>
    <name type="alternate" sortindex="1" value="Gloomhaven (Alt)" />
    <name type="primary" sortindex="1" value="Gloomhaven" />
    <description>Vanquish monsters &amp; explore.</description>
    <yearpublished value="2017" />
    <minplayers value="1" />
    <maxplayers value="4" />
    <playingtime value="120" />
    <minplaytime value="60" />
    <maxplaytime value="120" />
    <minage value="14" />
    <link type="boardgamecategory" id="1022" value="Adventure" />
    <link type="boardgamecategory" id="1020" value="Exploration" />
    <link type="boardgamemechanic" id="2857" value="Card Play Conflict Resolution" />
    <link type="boardgamedesigner" id="69802" value="Isaac Childres" />
    <link type="boardgameartist" id="77084" value="Alexandr Elichev" />
    <link type="boardgamepublisher" id="27425" value="Cephalofair Games" />
    <statistics page="1">
      <ratings>
        <usersrated value="60123" />
        <average value="8.59" />
        <bayesaverage value="8.34512" />
        <averageweight value="3.9123" />
      </ratings>
    </statistics>
  </item>
  <item type="boardgame" id="13">
    <name type="primary" sortindex="1" value="CATAN" />
    <yearpublished value="" />
    <minplayers value="3" />
  </item>
  <item type="boardgame" id="99">
    <name type="primary" sortindex="1" value="Broken" />
    <minplayers value="three" />
  </item>
</items>"#;

#[test]
fn thing_items_parse_with_stats_and_links() {
    let games = thing::parse_items(THING).unwrap();
    assert_eq!(games.len(), 3, "a garbage number does not drop the item");

    let g = &games[0];
    assert_eq!(g.id, 174430);
    assert_eq!(g.title.as_deref(), Some("Gloomhaven"));
    assert_eq!(g.description.as_deref(), Some("Vanquish monsters & explore."));
    assert_eq!(g.year_published, Some(2017));
    assert_eq!((g.min_players, g.max_players), (Some(1), Some(4)));
    assert_eq!((g.min_playtime, g.max_playtime, g.playing_time), (Some(60), Some(120), Some(120)));
    assert_eq!(g.min_age, Some(14));
    assert_eq!(g.categories, "Adventure, Exploration");
    assert_eq!(g.mechanics, "Card Play Conflict Resolution");
    assert_eq!(g.designers, "Isaac Childres");
    assert_eq!(g.artists, "Alexandr Elichev");
    assert_eq!(g.publishers, "Cephalofair Games");
    assert_eq!(g.num_voters, Some(60123));
    assert!((g.geek_rating.unwrap() - 8.34512).abs() < 1e-9);
    assert!((g.avg_rating.unwrap() - 8.59).abs() < 1e-9);
    assert!((g.complexity.unwrap() - 3.9123).abs() < 1e-9);
}

#[test]
fn thing_missing_values_stay_empty() {
    let games = thing::parse_items(THING).unwrap();
    let catan = &games[1];
    assert_eq!(catan.id, 13);
    assert_eq!(catan.year_published, None);
    assert_eq!(catan.min_players, Some(3));
    assert_eq!(catan.max_players, None);
    assert_eq!(catan.geek_rating, None);
    assert!(catan.categories.is_empty());
    assert!(catan.thumbnail.is_none());
}

#[test]
fn thing_garbage_number_keeps_the_item() {
    let games = thing::parse_items(THING).unwrap();
    let broken = &games[2];
    assert_eq!(broken.id, 99);
    assert_eq!(broken.title.as_deref(), Some("Broken"));
    assert_eq!(broken.min_players, None);
}

#[test]
fn thing_item_without_usable_id_is_dropped() {
    let xml = r#"<items>
        <item type="boardgame" id="x1"><minplayers value="2"/></item>
        <item type="boardgame"><minplayers value="2"/></item>
        <item type="boardgame" id="5"><minplayers value="2"/></item>
    </items>"#;
    let games = thing::parse_items(xml).unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, 5);
}

#[test]
fn malformed_document_is_an_error() {
    assert!(thing::parse_items("<items><item id=").is_err());
    assert!(hot::parse_ids("not xml at all").is_err());
}

#[test]
fn hot_ids_keep_rank_order() {
    let xml = r#"<items termsofuse="x">
        <item id="342942" rank="1"><name value="Ark Nova"/></item>
        <item id="224517" rank="2"><name value="Brass: Birmingham"/></item>
        <item id="bogus" rank="3"/>
        <item id="13" rank="4"/>
    </items>"#;
    assert_eq!(hot::parse_ids(xml).unwrap(), vec![342942, 224517, 13]);
}

#[test]
fn guild_members_page() {
    let xml = r#"<guild id="119" name="Greek Guild">
        <members count="3" page="1">
            <member name="alice" date="2020-01-01" />
            <member name="" date="2020-01-02" />
            <member name="bob" date="2020-01-03" />
        </members>
    </guild>"#;
    assert_eq!(guild::parse_members(xml).unwrap(), vec!["alice", "bob"]);

    let past_end = r#"<guild id="119"><members count="3" page="9"></members></guild>"#;
    assert!(guild::parse_members(past_end).unwrap().is_empty());
}

const COLLECTION: &str = r#"<items totalitems="3">
  <item objecttype="thing" objectid="174430" subtype="boardgame">
    <name sortindex="1">Gloomhaven</name>
    <yearpublished>2017</yearpublished>
    <stats minplayers="1" maxplayers="4">
      <rating value="9">
        <average value="8.5912" />
      </rating>
    </stats>
    <numplays>12</numplays>
  </item>
  <item objecttype="thing" objectid="13" subtype="boardgame">
    <name sortindex="1">CATAN</name>
    <stats>
      <rating value="N/A">
        <value>7.5</value>
        <average value="7.1" />
      </rating>
    </stats>
  </item>
  <item objecttype="thing" objectid="822" subtype="boardgame">
    <name sortindex="1">Carcassonne</name>
    <yearpublished>2000</yearpublished>
    <stats>
      <rating value="N/A">
        <average value="" />
      </rating>
    </stats>
    <numplays>3</numplays>
  </item>
</items>"#;

#[test]
fn collection_entries_for_display() {
    let entries = collection::parse_entries(COLLECTION).unwrap();
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].title, "Gloomhaven");
    assert_eq!(entries[0].year, "2017");
    assert_eq!(entries[0].bgg_rating, Some(8.59));
    assert_eq!(entries[0].your_rating, "9");
    assert_eq!(entries[0].plays, "12");

    // rating carried in a <value> child; no year, no plays
    assert_eq!(entries[1].your_rating, "7.5");
    assert_eq!(entries[1].year, "N/A");
    assert_eq!(entries[1].plays, "0");

    assert_eq!(entries[2].your_rating, collection::NOT_RATED);
    assert_eq!(entries[2].bgg_rating, None);
}

#[test]
fn user_ratings_keep_positive_numbers_only() {
    let xml = r#"<items>
        <item objectid="1"><name>A</name><stats><rating value="8.5"/></stats></item>
        <item objectid="2"><name>B</name><stats><rating value="N/A"/></stats></item>
        <item objectid="3"><name>C</name><stats><rating value="0"/></stats></item>
        <item><name>D</name><stats><rating value="6"/></stats></item>
        <item objectid="5"><stats><rating value="7"/></stats></item>
    </items>"#;
    let ratings = collection::parse_ratings(xml).unwrap();
    assert_eq!(ratings.len(), 2);
    assert_eq!((ratings[0].game_id, ratings[0].game_name.as_str(), ratings[0].rating), (1, "A", 8.5));
    assert_eq!((ratings[1].game_id, ratings[1].game_name.as_str()), (5, "Unknown"));
}
