//! Keyword tables written out the first time the relay starts.

use super::KeywordTable;

/// Product-line keywords (Latin, Cyrillic and hashtag spellings).
pub fn default_product_keywords() -> KeywordTable {
    KeywordTable::new()
        .with_category("damas", ["damas", "дамас", "#damas", "#дамас"])
        .with_category(
            "jentra",
            ["jentra", "жентра", "#jentra", "#жентра", "gentra", "#gentra"],
        )
        .with_category("malibu", ["malibu", "малибу", "#malibu", "#малибу"])
        .with_category("spark", ["spark", "спарк", "#spark", "#спарк"])
        .with_category("nexia", ["nexia", "нексия", "#nexia", "#нексия"])
}

/// Region keywords.
pub fn default_region_keywords() -> KeywordTable {
    KeywordTable::new()
        .with_category(
            "toshkent",
            ["toshkent", "ташкент", "tashkent", "toshkent shahar", "тошкент"],
        )
        .with_category(
            "samarqand",
            ["samarqand", "самарканд", "samarkand", "samarqand shahar"],
        )
        .with_category("buxoro", ["buxoro", "бухара", "bukhara", "buxoro shahar"])
        .with_category("andijon", ["andijon", "андижан", "andijan", "andijon shahar"])
        .with_category("fargona", ["fargona", "фергана", "fergana", "farg'ona"])
}
