pub mod playlist_items;

pub use playlist_items::{YOUTUBE_API_BASE_URL, get_playlist_items_page};
