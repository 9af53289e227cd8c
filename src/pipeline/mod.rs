//! Pipeline module
//!
//! The two stages of the job. The song stage writes `songs` and `artists`;
//! the log stage writes `users`, `time` and `songplays`, reading the song
//! files a second time for the join.
//!
//! Table derivations are plain functions over [`Frame`](crate::frame::Frame)
//! so they can be checked without any storage behind them.

mod logs;
mod songs;
pub mod tables;

pub use logs::{
    process_log_data, song_play_events, songplays_table, time_table, users_table,
    with_event_times, GET_DATETIME, GET_TIMESTAMP,
};
pub use songs::{artists_table, process_song_data, songs_table};
pub use tables::Table;

use crate::error::Result;
use crate::session::Session;
use crate::storage::Location;
use crate::types::TableReport;

/// Run the song stage and then the log stage
///
/// Stages run one after the other. A failure stops the run; tables already
/// written stay overwritten.
pub async fn run(session: &Session, input: &Location, output: &Location) -> Result<Vec<TableReport>> {
    let mut reports = process_song_data(session, input, output).await?;
    reports.extend(process_log_data(session, input, output).await?);
    Ok(reports)
}

#[cfg(test)]
mod tests;
