//! Tests for pipeline module

use super::tables::{ALL_TABLES, SONGS, TIME};
use super::*;
use crate::frame::Frame;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn song(song_id: &str, title: &str, artist_id: &str, artist_name: &str) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": 152.92036,
        "year": 0
    })
}

fn event(page: &str, user_id: &str, artist: Option<&str>, ts: i64) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Walter",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Frye",
        "length": null,
        "level": "free",
        "location": "San Francisco-Oakland-Hayward, CA",
        "method": "GET",
        "page": page,
        "registration": 1540919166796.0,
        "sessionId": 38,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

// ============================================================================
// Table Layout Tests
// ============================================================================

#[test]
fn test_table_paths() {
    let paths: Vec<String> = ALL_TABLES.iter().map(Table::path).collect();
    assert_eq!(
        paths,
        vec![
            "songs/songs.parquet",
            "artists/artists.parquet",
            "users/users.parquet",
            "time/time.parquet",
            "songplays/songplays.parquet"
        ]
    );
    assert_eq!(SONGS.partition_by, &["year", "artist_id"]);
    assert_eq!(TIME.partition_by, &["year", "month"]);
}

// ============================================================================
// Song Stage Tests
// ============================================================================

#[test]
fn test_songs_table_keeps_rows_that_differ_beyond_the_key() {
    let df = Frame::from_json_partitions(&[
        vec![song("S1", "First", "A1", "Artist A")],
        vec![
            song("S1", "Second", "A1", "Artist A"),
            song("S1", "First", "A1", "Artist A"),
        ],
    ])
    .unwrap();

    let songs = songs_table(&df).unwrap();
    assert_eq!(
        songs.column_names(),
        vec!["song_id", "title", "artist_id", "year", "duration"]
    );
    assert_eq!(songs.num_rows(), 2);
}

#[test]
fn test_songs_table_missing_columns_are_null() {
    let df = Frame::from_json(&[json!({"song_id": "S1", "title": "Only"})]).unwrap();
    let songs = songs_table(&df).unwrap();
    assert_eq!(
        songs.to_json().unwrap(),
        vec![json!({
            "song_id": "S1",
            "title": "Only",
            "artist_id": null,
            "year": null,
            "duration": null
        })]
    );
}

#[test]
fn test_artists_table_renames_and_dedups() {
    let df = Frame::from_json(&[
        song("S1", "One", "A1", "Artist A"),
        song("S2", "Two", "A1", "Artist A"),
        song("S3", "Three", "A2", "Artist B"),
    ])
    .unwrap();

    let artists = artists_table(&df).unwrap();
    assert_eq!(
        artists.column_names(),
        vec!["artist_id", "name", "location", "latitude", "longitude"]
    );
    assert_eq!(
        artists.to_json().unwrap(),
        vec![
            json!({"artist_id": "A1", "name": "Artist A", "location": "", "latitude": null, "longitude": null}),
            json!({"artist_id": "A2", "name": "Artist B", "location": "", "latitude": null, "longitude": null}),
        ]
    );
}

// ============================================================================
// Log Stage Tests
// ============================================================================

#[test]
fn test_song_play_events_filter() {
    let df = Frame::from_json(&[
        event("NextSong", "1", Some("Artist A"), 1_541_990_217_796),
        event("Home", "2", None, 1_541_990_217_796),
        json!({"userId": "3", "ts": 1_541_990_217_796_i64}),
    ])
    .unwrap();

    let events = song_play_events(&df).unwrap();
    assert_eq!(events.num_rows(), 1);
    assert_eq!(events.to_json().unwrap()[0]["userId"], json!("1"));
}

#[test]
fn test_users_table_aliases_and_dedups() {
    let df = Frame::from_json(&[
        event("NextSong", "10", Some("A"), 1),
        event("NextSong", "10", Some("B"), 2),
    ])
    .unwrap();

    let users = users_table(&df).unwrap();
    assert_eq!(
        users.to_json().unwrap(),
        vec![json!({
            "user_id": "10",
            "first_name": "Walter",
            "last_name": "Frye",
            "gender": "M",
            "level": "free"
        })]
    );
}

#[test]
fn test_with_event_times() {
    let df = Frame::from_json(&[
        event("NextSong", "1", Some("A"), 1_541_990_217_796),
        json!({"page": "NextSong", "userId": "2"}),
    ])
    .unwrap();

    let events = with_event_times(&df).unwrap();
    let rows = events.to_json().unwrap();
    assert_eq!(rows[0]["datetime"], json!("2018-11-12 02:36:57"));
    assert!((rows[0]["timestamp"].as_f64().unwrap() - 1_541_990_217.796).abs() < 1e-6);
    assert_eq!(rows[1]["timestamp"], Value::Null);
    assert_eq!(rows[1]["datetime"], Value::Null);
}

#[test]
fn test_time_table_fields_and_dedup() {
    let df = Frame::from_json(&[
        event("NextSong", "1", Some("A"), 1_541_990_217_796),
        event("NextSong", "2", Some("B"), 1_541_990_217_001),
        event("NextSong", "3", Some("C"), 1_542_499_200_000),
    ])
    .unwrap();

    let time = time_table(&with_event_times(&df).unwrap()).unwrap();
    assert_eq!(
        time.column_names(),
        vec!["start_time", "hour", "day", "week", "month", "year", "weekday"]
    );
    assert_eq!(
        time.to_json().unwrap(),
        vec![
            json!({"start_time": "2018-11-12 02:36:57", "hour": 2, "day": 12, "week": 46, "month": 11, "year": 2018, "weekday": 2}),
            json!({"start_time": "2018-11-18 00:00:00", "hour": 0, "day": 18, "week": 46, "month": 11, "year": 2018, "weekday": 1}),
        ]
    );
}

#[test]
fn test_time_table_null_timestamp_propagates() {
    let df = Frame::from_json(&[json!({"page": "NextSong", "ts": null})]).unwrap();
    let time = time_table(&with_event_times(&df).unwrap()).unwrap();
    assert_eq!(
        time.to_json().unwrap(),
        vec![json!({
            "start_time": null, "hour": null, "day": null, "week": null,
            "month": null, "year": null, "weekday": null
        })]
    );
}

#[test]
fn test_songplays_exact_artist_match() {
    let events = Frame::from_json_partitions(&[
        vec![
            event("NextSong", "1", Some("Artist A"), 1_541_990_217_796),
            event("NextSong", "2", Some("artist a"), 1_541_990_217_796),
        ],
        vec![
            event("NextSong", "3", Some("Artist B "), 1_541_990_217_796),
            event("NextSong", "4", Some("Artist B"), 1_542_499_200_000),
        ],
    ])
    .unwrap();
    let events = with_event_times(&events).unwrap();
    let songs = Frame::from_json(&[
        song("S1", "One", "A1", "Artist A"),
        song("S2", "Two", "A2", "Artist B"),
    ])
    .unwrap();

    let songplays = songplays_table(&events, &songs).unwrap();
    assert_eq!(
        songplays.column_names(),
        vec![
            "start_time",
            "user_id",
            "level",
            "song_id",
            "artist_id",
            "session_id",
            "location",
            "user_agent",
            "year",
            "month",
            "songplay_id"
        ]
    );

    let rows = songplays.to_json().unwrap();
    let users: Vec<&str> = rows.iter().map(|r| r["user_id"].as_str().unwrap()).collect();
    assert_eq!(users, vec!["1", "4"]);
    assert_eq!(rows[0]["song_id"], json!("S1"));
    assert_eq!(rows[1]["start_time"], json!("2018-11-18 00:00:00"));
    assert_eq!(rows[1]["session_id"], json!(38));
    assert_eq!(rows[1]["year"], json!(2018));
    assert_eq!(rows[1]["month"], json!(11));
    assert_ne!(rows[0]["songplay_id"], rows[1]["songplay_id"]);
}
