pub mod gist;
pub mod http;
pub mod sync;
pub mod youtube;
