//! Input patterns and output table layouts

use crate::output::TableWriter;
use crate::session::Session;
use crate::storage::Location;

/// Song files, relative to the input root
pub const SONG_DATA_PATTERN: &str = "song_data/*/*/*";

/// Event log files, relative to the input root
pub const LOG_DATA_PATTERN: &str = "log_data/*/*";

/// `page` value of events that are song plays
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// An output table and how it is laid out below the output root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub partition_by: &'static [&'static str],
}

impl Table {
    /// `<name>/<name>.parquet`
    pub fn path(&self) -> String {
        format!("{0}/{0}.parquet", self.name)
    }

    /// Overwrite writer for this table below `output`
    pub fn writer(&self, session: &Session, output: &Location) -> TableWriter {
        session
            .table_writer(output, &self.path())
            .partition_by(self.partition_by)
    }
}

pub const SONGS: Table = Table {
    name: "songs",
    partition_by: &["year", "artist_id"],
};

pub const ARTISTS: Table = Table {
    name: "artists",
    partition_by: &[],
};

pub const USERS: Table = Table {
    name: "users",
    partition_by: &[],
};

pub const TIME: Table = Table {
    name: "time",
    partition_by: &["year", "month"],
};

pub const SONGPLAYS: Table = Table {
    name: "songplays",
    partition_by: &["year", "month"],
};

/// Every table the job writes, in write order
pub const ALL_TABLES: [Table; 5] = [SONGS, ARTISTS, USERS, TIME, SONGPLAYS];

/// Columns of the songs table
pub const SONG_COLUMNS: &[&str] = &["song_id", "title", "artist_id", "year", "duration"];

/// Song record columns feeding the artists table, with their output names
pub const ARTIST_COLUMNS: &[(&str, &str)] = &[
    ("artist_id", "artist_id"),
    ("artist_name", "name"),
    ("artist_location", "location"),
    ("artist_latitude", "latitude"),
    ("artist_longitude", "longitude"),
];

/// Event columns feeding the users table, with their output names
pub const USER_COLUMNS: &[(&str, &str)] = &[
    ("userId", "user_id"),
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("gender", "gender"),
    ("level", "level"),
];
