//! A small sample catalog around central Amsterdam.
//!
//! Enough variety for demos and tests: several cafes at increasing distance
//! from Dam Square (one in Utrecht, one in Rotterdam), restaurants tagged with
//! cuisines, and a few transport and tourism POIs.
use polars::prelude::*;

use crate::error::Result;

pub fn sample_places() -> Result<DataFrame> {
    Ok(df!(
        "id" => [
            1u64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
        ],
        "name" => [
            "Cafe de Dam",
            "Cafe Het Paleis",
            "Koffiehuis Jordaan",
            "Cafe Oost",
            "Cafe Utrecht Centraal",
            "Cafe Rotterdam Markthal",
            "Pizzeria Napoli",
            "Sushi Kaito",
            "Restaurant De Kas",
            "Pizza Utrecht",
            "Frites Atelier",
            "Shell Wibautstraat",
            "Parking Centrum Oosterdok",
            "Rijksmuseum",
            "Van Gogh Museum",
            "Station Parking Sloterdijk",
        ],
        "type" => [
            "cafe",
            "cafe",
            "cafe",
            "cafe",
            "cafe",
            "cafe",
            "restaurant",
            "restaurant",
            "restaurant",
            "restaurant",
            "fast_food",
            "fuel",
            "parking",
            "museum",
            "museum",
            "parking",
        ],
        "lat" => [
            52.3731, 52.3727, 52.3780, 52.3600, 52.0894, 51.9200, 52.3667, 52.3580, 52.3570,
            52.0910, 52.3665, 52.3540, 52.3760, 52.3600, 52.3584, 52.3889,
        ],
        "lon" => [
            4.8932, 4.8910, 4.8810, 4.9300, 5.1100, 4.4870, 4.8950, 4.8850, 4.9450, 5.1180,
            4.8880, 4.9130, 4.9120, 4.8852, 4.8811, 4.8380,
        ],
        "tags" => [
            "outdoor_seating",
            "",
            "",
            "outdoor_seating",
            "",
            "",
            "cuisine:pizza",
            "cuisine:sushi",
            "cuisine:regional;outdoor_seating",
            "cuisine:pizza",
            "",
            "",
            "",
            "",
            "",
            "",
        ]
    )?)
}

pub fn sample_poi_types() -> Result<DataFrame> {
    Ok(df!(
        "key" => [
            "cafe",
            "restaurant",
            "fast_food",
            "cuisine_pizza",
            "cuisine_sushi",
            "fuel",
            "parking",
            "museum",
        ],
        "name" => [
            "Cafe",
            "Restaurant",
            "Fast food",
            "Pizza",
            "Sushi",
            "Fuel station",
            "Parking",
            "Museum",
        ],
        "category" => [
            "food",
            "food",
            "food",
            "food",
            "food",
            "transport",
            "transport",
            "tourism",
        ],
        "category_name" => [
            "Food",
            "Food",
            "Food",
            "Food",
            "Food",
            "Transport",
            "Transport",
            "Tourism",
        ],
        "additional" => [false, false, false, true, true, false, false, false]
    )?)
}
