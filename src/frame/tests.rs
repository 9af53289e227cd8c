//! Tests for frame module

use super::functions::{dayofweek, year};
use super::*;
use crate::error::Error;
use arrow::datatypes::DataType;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn sorted(mut rows: Vec<Value>) -> Vec<Value> {
    rows.sort_by_key(ToString::to_string);
    rows
}

// ============================================================================
// Schema Inference Tests
// ============================================================================

#[test]
fn test_infer_schema_sorted_and_nullable() {
    let records = vec![json!({"title": "A", "duration": 10.5, "year": 2000})];
    let schema = infer_schema(&records);

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["duration", "title", "year"]);
    assert!(schema.fields().iter().all(|f| f.is_nullable()));
    assert_eq!(schema.field(2).data_type(), &DataType::Int64);
}

#[test]
fn test_infer_schema_type_merging() {
    let records = vec![
        json!({"lat": null, "mixed": 1, "conflict": 1}),
        json!({"lat": 35.1, "mixed": 2.5, "conflict": "x"}),
        json!({"only_null": null}),
    ];
    let schema = infer_schema(&records);

    assert_eq!(
        schema.field_with_name("lat").unwrap().data_type(),
        &DataType::Float64
    );
    assert_eq!(
        schema.field_with_name("mixed").unwrap().data_type(),
        &DataType::Float64
    );
    assert_eq!(
        schema.field_with_name("conflict").unwrap().data_type(),
        &DataType::Utf8
    );
    assert_eq!(
        schema.field_with_name("only_null").unwrap().data_type(),
        &DataType::Null
    );
}

#[test]
fn test_infer_schema_empty_object_is_null() {
    let records = vec![
        json!({"empty": {}, "nested": {"inner": {}}}),
        json!({"empty": null, "nested": {"inner": null, "x": 1}}),
    ];
    let schema = infer_schema(&records);

    assert_eq!(
        schema.field_with_name("empty").unwrap().data_type(),
        &DataType::Null
    );
    let DataType::Struct(nested) = schema.field_with_name("nested").unwrap().data_type() else {
        panic!("nested should be a struct");
    };
    let names: Vec<&str> = nested.iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["inner", "x"]);
    assert_eq!(nested[0].data_type(), &DataType::Null);
}

#[test]
fn test_infer_schema_empty_object_merges_with_strings() {
    let records = vec![
        json!({"artist_location": {}}),
        json!({"artist_location": "Chicago"}),
    ];
    let schema = infer_schema(&records);
    assert_eq!(
        schema.field_with_name("artist_location").unwrap().data_type(),
        &DataType::Utf8
    );
}

#[test]
fn test_json_round_trip_nested() {
    let records = vec![
        json!({"id": 1, "tags": ["a", "b"], "user": {"name": "Alice"}}),
        json!({"id": 2, "tags": null, "user": null}),
    ];
    let frame = Frame::from_json(&records).unwrap();
    assert_eq!(frame.to_json().unwrap(), records);
}

#[test]
fn test_from_json_partitions_share_schema() {
    let frame = Frame::from_json_partitions(&[
        vec![json!({"a": 1})],
        vec![json!({"b": "x"}), json!({"a": 2, "b": "y"})],
        vec![],
    ])
    .unwrap();

    assert_eq!(frame.num_partitions(), 3);
    assert_eq!(frame.num_rows(), 3);
    assert_eq!(frame.column_names(), vec!["a", "b"]);
    assert_eq!(
        frame.to_json().unwrap(),
        vec![
            json!({"a": 1, "b": null}),
            json!({"a": null, "b": "x"}),
            json!({"a": 2, "b": "y"}),
        ]
    );
}

// ============================================================================
// Projection Tests
// ============================================================================

#[test]
fn test_select_missing_column_is_null() {
    let frame = Frame::from_json(&[json!({"song_id": "S1"}), json!({"title": "T"})]).unwrap();
    let selected = frame.select(&["song_id", "title", "year"]).unwrap();

    assert_eq!(selected.column_names(), vec!["song_id", "title", "year"]);
    assert_eq!(
        selected.to_json().unwrap(),
        vec![
            json!({"song_id": "S1", "title": null, "year": null}),
            json!({"song_id": null, "title": "T", "year": null}),
        ]
    );
}

#[test]
fn test_select_on_empty_frame_keeps_schema() {
    let frame = Frame::from_json(&[]).unwrap();
    let selected = frame.select(&["a", "b"]).unwrap();
    assert_eq!(selected.column_names(), vec!["a", "b"]);
    assert_eq!(selected.num_rows(), 0);
}

#[test]
fn test_select_exprs_alias_and_function_names() {
    let frame = Frame::from_json(&[json!({"datetime": "2018-11-18 09:00:00"})]).unwrap();
    let selected = frame
        .select_exprs(&[
            col("datetime").alias("start_time"),
            year(col("datetime")),
            dayofweek(col("datetime")).alias("weekday"),
        ])
        .unwrap();

    assert_eq!(
        selected.column_names(),
        vec!["start_time", "year(datetime)", "weekday"]
    );
    assert_eq!(
        selected.to_json().unwrap(),
        vec![json!({"start_time": "2018-11-18 09:00:00", "year(datetime)": 2018, "weekday": 1})]
    );
}

#[test]
fn test_with_column_appends_and_replaces() {
    let frame = Frame::from_json(&[json!({"d": "2018-11-12 00:00:00"})]).unwrap();

    let added = frame.with_column("y", year(col("d"))).unwrap();
    assert_eq!(added.column_names(), vec!["d", "y"]);

    let replaced = added.with_column("d", col("y")).unwrap();
    assert_eq!(replaced.column_names(), vec!["d", "y"]);
    assert_eq!(replaced.to_json().unwrap(), vec![json!({"d": 2018, "y": 2018})]);
}

#[test]
fn test_with_column_renamed() {
    let frame = Frame::from_json(&[json!({"artist_name": "A", "artist_id": "X"})]).unwrap();

    let renamed = frame.with_column_renamed("artist_name", "name").unwrap();
    assert_eq!(renamed.column_names(), vec!["artist_id", "name"]);

    let unchanged = renamed.with_column_renamed("absent", "other").unwrap();
    assert_eq!(unchanged.column_names(), vec!["artist_id", "name"]);
}

// ============================================================================
// Filter Tests
// ============================================================================

#[test]
fn test_filter_eq_excludes_other_and_null() {
    let frame = Frame::from_json_partitions(&[
        vec![
            json!({"page": "NextSong", "n": 1}),
            json!({"page": "Home", "n": 2}),
        ],
        vec![
            json!({"page": null, "n": 3}),
            json!({"n": 4}),
            json!({"page": "nextsong", "n": 5}),
            json!({"page": "NextSong", "n": 6}),
        ],
    ])
    .unwrap();

    let filtered = frame.filter_eq("page", "NextSong").unwrap();
    assert_eq!(filtered.num_partitions(), 2);
    let ns: Vec<i64> = filtered
        .to_json()
        .unwrap()
        .iter()
        .map(|r| r["n"].as_i64().unwrap())
        .collect();
    assert_eq!(ns, vec![1, 6]);
}

#[test]
fn test_filter_eq_on_absent_column_drops_everything() {
    let frame = Frame::from_json(&[json!({"n": 1})]).unwrap();
    assert!(frame.filter_eq("page", "NextSong").unwrap().is_empty());
}

// ============================================================================
// Distinct Tests
// ============================================================================

#[test]
fn test_distinct_removes_exact_duplicates_across_partitions() {
    let frame = Frame::from_json_partitions(&[
        vec![json!({"id": "A", "v": 1}), json!({"id": "A", "v": 1})],
        vec![json!({"id": "A", "v": 1}), json!({"id": "B", "v": null})],
        vec![json!({"id": "B", "v": null})],
    ])
    .unwrap();

    let deduped = frame.distinct().unwrap();
    assert_eq!(deduped.num_partitions(), 1);
    assert_eq!(
        deduped.to_json().unwrap(),
        vec![json!({"id": "A", "v": 1}), json!({"id": "B", "v": null})]
    );
}

#[test]
fn test_distinct_is_full_row_not_key() {
    let frame = Frame::from_json(&[
        json!({"song_id": "S1", "title": "First"}),
        json!({"song_id": "S1", "title": "Second"}),
    ])
    .unwrap();
    assert_eq!(frame.distinct().unwrap().num_rows(), 2);
}

#[test]
fn test_distinct_is_idempotent() {
    let frame = Frame::from_json(&[
        json!({"a": 1, "b": "x"}),
        json!({"a": 1, "b": "x"}),
        json!({"a": 2, "b": null}),
        json!({"a": null, "b": null}),
        json!({"a": null, "b": null}),
    ])
    .unwrap();

    let once = frame.distinct().unwrap();
    let twice = once.distinct().unwrap();
    assert_eq!(once.num_rows(), 3);
    assert_eq!(once.to_json().unwrap(), twice.to_json().unwrap());
}

#[test]
fn test_distinct_empty() {
    let frame = Frame::from_json(&[]).unwrap().select(&["a"]).unwrap();
    let deduped = frame.distinct().unwrap();
    assert_eq!(deduped.num_partitions(), 0);
    assert_eq!(deduped.column_names(), vec!["a"]);
}

#[test]
fn test_distinct_with_empty_object_column() {
    let song = json!({
        "artist_id": "AR1",
        "artist_latitude": null,
        "artist_location": {},
        "artist_longitude": null,
        "artist_name": "Name",
        "duration": 100.0,
        "song_id": "S1",
        "title": "T",
        "year": 2000
    });
    let frame = Frame::from_json(&[song.clone(), song]).unwrap();

    let songs = crate::pipeline::songs_table(&frame).unwrap();
    assert_eq!(songs.num_rows(), 1);

    let artists = crate::pipeline::artists_table(&frame).unwrap();
    assert_eq!(
        artists.to_json().unwrap(),
        vec![json!({
            "artist_id": "AR1",
            "name": "Name",
            "location": null,
            "latitude": null,
            "longitude": null
        })]
    );
}

// ============================================================================
// Join Tests
// ============================================================================

#[test]
fn test_inner_join_exact_match_only() {
    let events = Frame::from_json_partitions(&[
        vec![
            json!({"artist": "Des'ree", "userId": "1"}),
            json!({"artist": "des'ree", "userId": "2"}),
        ],
        vec![
            json!({"artist": "Des'ree ", "userId": "3"}),
            json!({"artist": null, "userId": "4"}),
            json!({"artist": "Mr Oizo", "userId": "5"}),
        ],
    ])
    .unwrap();
    let songs = Frame::from_json(&[
        json!({"artist_name": "Des'ree", "song_id": "S1"}),
        json!({"artist_name": "Mr Oizo", "song_id": "S2"}),
        json!({"artist_name": null, "song_id": "S3"}),
    ])
    .unwrap();

    let joined = events.inner_join(&songs, "artist", "artist_name").unwrap();
    assert_eq!(joined.num_partitions(), 2);
    assert_eq!(
        joined.column_names(),
        vec!["artist", "userId", "artist_name", "song_id"]
    );

    let pairs: Vec<(String, String)> = joined
        .to_json()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["userId"].as_str().unwrap().to_string(),
                r["song_id"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("1".to_string(), "S1".to_string()),
            ("5".to_string(), "S2".to_string())
        ]
    );
}

#[test]
fn test_inner_join_duplicates_multiply() {
    let left = Frame::from_json(&[json!({"k": "a", "l": 1})]).unwrap();
    let right = Frame::from_json(&[json!({"k2": "a", "r": 1}), json!({"k2": "a", "r": 2})]).unwrap();

    let joined = left.inner_join(&right, "k", "k2").unwrap();
    assert_eq!(
        sorted(joined.to_json().unwrap()),
        vec![
            json!({"k": "a", "l": 1, "k2": "a", "r": 1}),
            json!({"k": "a", "l": 1, "k2": "a", "r": 2}),
        ]
    );
}

#[test]
fn test_join_shared_column_is_ambiguous_on_select() {
    let left = Frame::from_json(&[json!({"k": "a", "year": 1})]).unwrap();
    let right = Frame::from_json(&[json!({"k": "a", "year": 2})]).unwrap();

    let joined = left
        .with_column_renamed("k", "lk")
        .unwrap()
        .inner_join(&right, "lk", "k")
        .unwrap();
    assert!(matches!(
        joined.select(&["year"]),
        Err(Error::AmbiguousColumn { .. })
    ));
}

// ============================================================================
// Monotonic Id Tests
// ============================================================================

#[test]
fn test_monotonic_id_is_unique_and_increasing() {
    let frame = Frame::from_json_partitions(&[
        vec![json!({"x": 1}), json!({"x": 2})],
        vec![],
        vec![json!({"x": 3})],
    ])
    .unwrap();

    let with_ids = frame.with_monotonic_id("songplay_id").unwrap();
    let ids: Vec<i64> = with_ids
        .to_json()
        .unwrap()
        .iter()
        .map(|r| r["songplay_id"].as_i64().unwrap())
        .collect();

    assert_eq!(ids, vec![0, 1, 2 << 33]);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_try_new_rejects_mismatched_partition() {
    let a = Frame::from_json(&[json!({"a": 1})]).unwrap();
    let b = Frame::from_json(&[json!({"b": 1})]).unwrap();

    let result = Frame::try_new(a.schema(), vec![b.partitions()[0].clone()]);
    assert!(matches!(result, Err(Error::Frame { .. })));

    let ok = Frame::try_new(a.schema(), a.partitions().to_vec()).unwrap();
    assert_eq!(ok.num_rows(), 1);
}
