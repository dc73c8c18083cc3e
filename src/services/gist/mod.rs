pub mod client;

pub use client::GistHttpAdapter;
