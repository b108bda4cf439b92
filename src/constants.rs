/// Column names shared by the cleaning pipeline and the analytics view.
/// The cleaned file is the only contract between the two, so every name the view
/// reads lives here.

pub const TRACK: &str = "Track";
pub const ARTIST: &str = "Artist";
pub const ALBUM_NAME: &str = "Album Name";
pub const ALL_TIME_RANK: &str = "All Time Rank";
pub const TRACK_SCORE: &str = "Track Score";
pub const RELEASE_DATE: &str = "Release Date";
pub const EXPLICIT_TRACK: &str = "Explicit Track";

pub const SPOTIFY_STREAMS: &str = "Spotify Streams";
pub const SPOTIFY_PLAYLIST_COUNT: &str = "Spotify Playlist Count";
pub const YOUTUBE_VIEWS: &str = "YouTube Views";
pub const TIKTOK_VIEWS: &str = "TikTok Views";

// Derived by the analytics view
pub const RELEASE_YEAR: &str = "Release Year";
pub const TRACK_TYPE: &str = "Track Type";

/// Engagement counters coerced to numbers during cleaning
pub const COUNTER_COLUMNS: [&str; 21] = [
    "Spotify Streams",
    "Spotify Playlist Count",
    "Spotify Playlist Reach",
    "Spotify Popularity",
    "YouTube Views",
    "YouTube Likes",
    "TikTok Posts",
    "TikTok Likes",
    "TikTok Views",
    "YouTube Playlist Reach",
    "Apple Music Playlist Count",
    "AirPlay Spins",
    "SiriusXM Spins",
    "Deezer Playlist Count",
    "Deezer Playlist Reach",
    "Amazon Playlist Count",
    "Pandora Streams",
    "Pandora Track Stations",
    "Soundcloud Streams",
    "Shazam Counts",
    "TIDAL Popularity",
];

/// Columns the analytics view coerces after loading the cleaned file
pub const VIEW_NUMERIC_COLUMNS: [&str; 19] = [
    "All Time Rank",
    "Spotify Streams",
    "Spotify Playlist Count",
    "Spotify Playlist Reach",
    "Spotify Popularity",
    "YouTube Views",
    "YouTube Likes",
    "TikTok Posts",
    "TikTok Likes",
    "TikTok Views",
    "YouTube Playlist Reach",
    "Apple Music Playlist Count",
    "AirPlay Spins",
    "Deezer Playlist Count",
    "Deezer Playlist Reach",
    "Amazon Playlist Count",
    "Pandora Streams",
    "Shazam Counts",
    "Track Score",
];

/// Engagement columns checked for IQR outliers
pub const OUTLIER_COLUMNS: [&str; 3] = [SPOTIFY_STREAMS, YOUTUBE_VIEWS, TIKTOK_VIEWS];

/// Identifier and sparsely populated platform columns removed before persisting
pub const DROPPED_COLUMNS: [&str; 5] = [
    "ISRC",
    "TIDAL Popularity",
    "Soundcloud Streams",
    "SiriusXM Spins",
    "Pandora Track Stations",
];

/// Tokens read as the missing marker when loading any table
pub const NULL_TOKENS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "-NaN", "<NA>",
];

pub const DEFAULT_INPUT_FILE: &str = "Most Streamed Spotify Songs 2024.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "Most Streamed Spotify Songs 2024_cleaned.csv";
pub const DEFAULT_CONFIG_FILE: &str = "streamboard.toml";

pub const DATA_SOURCE_URL: &str =
    "https://www.kaggle.com/datasets/nelgiriyewithana/most-streamed-spotify-songs-2024";

/// Sentinel shown for any metric that cannot be computed
pub const NOT_AVAILABLE: &str = "N/A";
