// src/domain/schema.rs

use serde::Serialize;

/// Canonical scalar type a column is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Int,
    Float,
}

/// One output column: its name, where it lives inside a home object, and its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub path: &'static [&'static str],
    pub ty: ColumnType,
}

const fn col(name: &'static str, path: &'static [&'static str], ty: ColumnType) -> Column {
    Column { name, path, ty }
}

use self::ColumnType::{Float, Int, Text};

// home (payload.homes[*])
//  ├── propertyId, listingId, mlsStatus, beds, baths, stories, city, state, url
//  ├── mlsId / price / hoa / sqFt / lotSize / location / streetLine / postalCode / yearBuilt
//  │    └── value
//  └── latLong
//       └── value
//            ├── latitude
//            └── longitude
pub static SALE_COLUMNS: &[Column] = &[
    col("property_id", &["propertyId"], Int),
    col("listing_id", &["listingId"], Int),
    col("mls_id", &["mlsId", "value"], Text),
    col("status", &["mlsStatus"], Text),
    col("price", &["price", "value"], Int),
    col("hoa_fee", &["hoa", "value"], Text),
    col("square_feet", &["sqFt", "value"], Float),
    col("lot_size", &["lotSize", "value"], Float),
    col("bedrooms", &["beds"], Float),
    col("bathrooms", &["baths"], Float),
    col("location", &["location", "value"], Text),
    col("stories", &["stories"], Float),
    col("address", &["streetLine", "value"], Text),
    col("city", &["city"], Text),
    col("state", &["state"], Text),
    col("zip_code", &["postalCode", "value"], Text),
    col("year_built", &["yearBuilt", "value"], Float),
    col("url", &["url"], Text),
    col("latitude", &["latLong", "value", "latitude"], Float),
    col("longitude", &["latLong", "value", "longitude"], Float),
    col("description", &["listingRemarks"], Text),
    col("property_type", &["propertyType"], Int),
    col("country_code", &["countryCode"], Text),
];

// home (homes[*])
//  ├── homeData
//  │    ├── propertyId, url, propertyType
//  │    └── addressInfo
//  │         ├── formattedStreetLine, city, state, zip, countryCode
//  │         └── centroid
//  │              └── centroid
//  │                   ├── latitude
//  │                   └── longitude
//  └── rentalExtension
//       ├── status, description, rentalId
//       └── rentPriceRange / sqftRange / bedRange / bathRange
//            └── max
pub static RENTAL_COLUMNS: &[Column] = &[
    col("property_id", &["homeData", "propertyId"], Text),
    col("status", &["rentalExtension", "status"], Int),
    col("price", &["rentalExtension", "rentPriceRange", "max"], Int),
    col("square_feet", &["rentalExtension", "sqftRange", "max"], Float),
    col("bedrooms", &["rentalExtension", "bedRange", "max"], Float),
    col("bathrooms", &["rentalExtension", "bathRange", "max"], Float),
    col("address", &["homeData", "addressInfo", "formattedStreetLine"], Text),
    col("city", &["homeData", "addressInfo", "city"], Text),
    col("state", &["homeData", "addressInfo", "state"], Text),
    col("zip_code", &["homeData", "addressInfo", "zip"], Text),
    col("url", &["homeData", "url"], Text),
    col(
        "latitude",
        &["homeData", "addressInfo", "centroid", "centroid", "latitude"],
        Float,
    ),
    col(
        "longitude",
        &["homeData", "addressInfo", "centroid", "centroid", "longitude"],
        Float,
    ),
    col("description", &["rentalExtension", "description"], Text),
    col("property_type", &["homeData", "propertyType"], Int),
    col("country_code", &["homeData", "addressInfo", "countryCode"], Text),
    col("rental_id", &["rentalExtension", "rentalId"], Text),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn column_names(columns: &[Column]) -> Vec<&'static str> {
        columns.iter().map(|c| c.name).collect()
    }

    #[test]
    fn column_sets_have_expected_width() {
        assert_eq!(SALE_COLUMNS.len(), 23);
        assert_eq!(RENTAL_COLUMNS.len(), 17);
    }

    #[test]
    fn column_names_are_unique() {
        for cols in [SALE_COLUMNS, RENTAL_COLUMNS] {
            let names: HashSet<_> = column_names(cols).into_iter().collect();
            assert_eq!(names.len(), cols.len());
        }
    }

    #[test]
    fn id_types_differ_by_kind() {
        let sale_id = SALE_COLUMNS.iter().find(|c| c.name == "property_id").unwrap();
        let rent_id = RENTAL_COLUMNS.iter().find(|c| c.name == "property_id").unwrap();
        assert_eq!(sale_id.ty, ColumnType::Int);
        assert_eq!(rent_id.ty, ColumnType::Text);
    }
}
