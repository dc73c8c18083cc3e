pub mod document_store;
pub mod playlist_source;
