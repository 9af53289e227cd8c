//! Song dataset: `songs` and `artists`

use super::tables::{ARTISTS, ARTIST_COLUMNS, SONGS, SONG_COLUMNS, SONG_DATA_PATTERN};
use crate::error::Result;
use crate::frame::Frame;
use crate::session::Session;
use crate::storage::Location;
use crate::types::TableReport;

/// Distinct `song_id, title, artist_id, year, duration` rows
pub fn songs_table(songs: &Frame) -> Result<Frame> {
    songs.select(SONG_COLUMNS)?.distinct()
}

/// Distinct artist rows with the `artist_` prefix dropped from the attributes
pub fn artists_table(songs: &Frame) -> Result<Frame> {
    let sources: Vec<&str> = ARTIST_COLUMNS.iter().map(|(from, _)| *from).collect();
    let mut artists = songs.select(&sources)?;
    for (from, to) in ARTIST_COLUMNS {
        if from != to {
            artists = artists.with_column_renamed(from, to)?;
        }
    }
    artists.distinct()
}

/// Read the song files below `input` and write `songs` and `artists` below `output`
pub async fn process_song_data(
    session: &Session,
    input: &Location,
    output: &Location,
) -> Result<Vec<TableReport>> {
    tracing::info!(input = %input, "Processing song data");
    let df = session.read_json(input, SONG_DATA_PATTERN).await?;

    let songs = songs_table(&df)?;
    let songs_report = SONGS
        .writer(session, output)
        .overwrite(SONGS.name, &songs)
        .await?;

    let artists = artists_table(&df)?;
    let artists_report = ARTISTS
        .writer(session, output)
        .overwrite(ARTISTS.name, &artists)
        .await?;

    Ok(vec![songs_report, artists_report])
}
