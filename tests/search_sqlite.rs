// Property search run end to end against the SQLite fixtures

mod common;

use common::seeded_store;
use lightbnb::{build_search_query, Database, Property, QueryRunner, SearchCriteria, Value};

fn titles(properties: &[Property]) -> Vec<&str> {
    properties.iter().map(|p| p.title.as_str()).collect()
}

fn search(criteria: SearchCriteria, limit: i64) -> Vec<Property> {
    Database::new(seeded_store())
        .search_properties(&criteria, limit)
        .unwrap()
}

#[test]
fn no_filters_returns_reviewed_listings_by_price() {
    let properties = search(SearchCriteria::default(), 10);
    assert_eq!(
        titles(&properties),
        vec!["Kits cottage", "Harbour loft", "Prairie house", "Island cabin"]
    );
}

#[test]
fn limit_caps_the_rows() {
    let properties = search(SearchCriteria::default(), 1);
    assert_eq!(titles(&properties), vec!["Kits cottage"]);
}

#[test]
fn city_matches_substring_case_insensitively() {
    let properties = search(SearchCriteria::default().city("van"), 10);
    assert_eq!(titles(&properties), vec!["Kits cottage", "Harbour loft"]);
}

#[test]
fn city_and_minimum_price() {
    let criteria = SearchCriteria::default().city("van").minimum_price(50.0);

    let query = build_search_query(&criteria, 10).unwrap();
    assert_eq!(
        query.params,
        vec![Value::from("%van%"), Value::Integer(5000), Value::Integer(10)]
    );

    let properties = search(criteria, 10);
    assert_eq!(titles(&properties), vec!["Harbour loft"]);
    assert_eq!(properties[0].cost_per_night, 9300);
    assert_eq!(properties[0].average_rating, Some(4.5));
}

#[test]
fn owner_without_city_still_filters() {
    let properties = search(SearchCriteria::default().owner(2), 10);
    assert_eq!(titles(&properties), vec!["Prairie house", "Island cabin"]);
}

#[test]
fn price_range_in_dollars() {
    let criteria = SearchCriteria::default()
        .minimum_price(100.0)
        .maximum_price(200.0);
    assert_eq!(titles(&search(criteria, 10)), vec!["Prairie house"]);

    let criteria = SearchCriteria::default().maximum_price(93.0);
    assert_eq!(titles(&search(criteria, 10)), vec!["Kits cottage", "Harbour loft"]);
}

#[test]
fn minimum_rating_filters_on_the_average() {
    let properties = search(SearchCriteria::default().minimum_rating(4.0), 10);
    assert_eq!(titles(&properties), vec!["Harbour loft", "Prairie house"]);
    assert_eq!(properties[1].average_rating, Some(4.0));
}

#[test]
fn every_filter_together() {
    let criteria = SearchCriteria::default()
        .city("a")
        .owner(2)
        .minimum_price(50.0)
        .maximum_price(300.0)
        .minimum_rating(3.0);
    assert_eq!(titles(&search(criteria, 10)), vec!["Prairie house"]);
}

#[test]
fn no_match_is_an_empty_list() {
    let properties = search(SearchCriteria::default().city("Toronto"), 10);
    assert!(properties.is_empty());
}

#[test]
fn every_filter_combination_executes() {
    let store = seeded_store();
    for mask in 0u8..32 {
        let mut criteria = SearchCriteria::default();
        if mask & 1 != 0 {
            criteria = criteria.city("van");
        }
        if mask & 2 != 0 {
            criteria = criteria.owner(1);
        }
        if mask & 4 != 0 {
            criteria = criteria.minimum_price(10.0);
        }
        if mask & 8 != 0 {
            criteria = criteria.maximum_price(500.0);
        }
        if mask & 16 != 0 {
            criteria = criteria.minimum_rating(1.0);
        }

        let query = build_search_query(&criteria, 10).unwrap();
        let rows = store
            .run(&query)
            .unwrap_or_else(|e| panic!("mask {mask:#07b}: {e}\n{}", query.sql));
        assert!(!rows.is_empty(), "mask {mask:#07b} matched nothing");
    }
}
