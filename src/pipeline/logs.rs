//! Event log dataset: `users`, `time` and `songplays`

use super::tables::{
    LOG_DATA_PATTERN, NEXT_SONG_PAGE, SONGPLAYS, SONG_DATA_PATTERN, TIME, USERS, USER_COLUMNS,
};
use crate::error::Result;
use crate::frame::functions::{
    dayofmonth, dayofweek, epoch_millis_to_seconds, format_epoch_seconds, hour, month,
    weekofyear, year,
};
use crate::frame::{col, Expr, Frame, ScalarFunction};
use crate::session::Session;
use crate::storage::Location;
use crate::types::TableReport;

/// `ts` in epoch milliseconds to fractional epoch seconds
pub const GET_TIMESTAMP: ScalarFunction =
    ScalarFunction::new("get_timestamp", epoch_millis_to_seconds);

/// Epoch seconds to `YYYY-MM-DD HH:MM:SS`
pub const GET_DATETIME: ScalarFunction = ScalarFunction::new("get_datetime", format_epoch_seconds);

/// Keep song play events only
pub fn song_play_events(events: &Frame) -> Result<Frame> {
    events.filter_eq("page", NEXT_SONG_PAGE)
}

/// Distinct users seen in the events
pub fn users_table(events: &Frame) -> Result<Frame> {
    let exprs: Vec<Expr> = USER_COLUMNS
        .iter()
        .map(|(from, to)| col(*from).alias(*to))
        .collect();
    events.select_exprs(&exprs)?.distinct()
}

/// Add `timestamp` (seconds) and `datetime` (formatted string) columns
pub fn with_event_times(events: &Frame) -> Result<Frame> {
    events
        .with_column("timestamp", GET_TIMESTAMP.call(col("ts")))?
        .with_column("datetime", GET_DATETIME.call(col("timestamp")))
}

/// Distinct start times broken into calendar fields
///
/// Expects the `datetime` column from [`with_event_times`].
pub fn time_table(events: &Frame) -> Result<Frame> {
    events
        .select_exprs(&[
            col("datetime").alias("start_time"),
            hour(col("datetime")).alias("hour"),
            dayofmonth(col("datetime")).alias("day"),
            weekofyear(col("datetime")).alias("week"),
            month(col("datetime")).alias("month"),
            year(col("datetime")).alias("year"),
            dayofweek(col("datetime")).alias("weekday"),
        ])?
        .distinct()
}

/// Song plays: events joined to songs on the artist name
///
/// Only exact `artist == artist_name` matches survive. Each row gets a
/// `songplay_id` that is unique within the run but not stable across runs.
pub fn songplays_table(events: &Frame, songs: &Frame) -> Result<Frame> {
    events
        .inner_join(songs, "artist", "artist_name")?
        .select_exprs(&[
            col("datetime").alias("start_time"),
            col("userId").alias("user_id"),
            col("level"),
            col("song_id"),
            col("artist_id"),
            col("sessionId").alias("session_id"),
            col("location"),
            col("userAgent").alias("user_agent"),
            year(col("datetime")).alias("year"),
            month(col("datetime")).alias("month"),
        ])?
        .with_monotonic_id("songplay_id")
}

/// Read the event logs below `input` and write `users`, `time` and `songplays`
///
/// The song files are read again for the join.
pub async fn process_log_data(
    session: &Session,
    input: &Location,
    output: &Location,
) -> Result<Vec<TableReport>> {
    tracing::info!(input = %input, "Processing log data");
    let df = session.read_json(input, LOG_DATA_PATTERN).await?;

    let events = song_play_events(&df)?;
    tracing::info!(
        events = df.num_rows(),
        song_plays = events.num_rows(),
        "Filtered song play events"
    );

    let users = users_table(&events)?;
    let users_report = USERS
        .writer(session, output)
        .overwrite(USERS.name, &users)
        .await?;

    let events = with_event_times(&events)?;

    let time = time_table(&events)?;
    let time_report = TIME
        .writer(session, output)
        .overwrite(TIME.name, &time)
        .await?;

    let songs = session.read_json(input, SONG_DATA_PATTERN).await?;
    let songplays = songplays_table(&events, &songs)?;
    let unmatched = events.num_rows().saturating_sub(songplays.num_rows());
    if unmatched > 0 {
        tracing::debug!(unmatched, "Events without an exact artist match");
    }
    let songplays_report = SONGPLAYS
        .writer(session, output)
        .overwrite(SONGPLAYS.name, &songplays)
        .await?;

    Ok(vec![users_report, time_report, songplays_report])
}
