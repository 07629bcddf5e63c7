// cbm-net/src/lib.rs
pub mod http;
pub mod index;
pub mod validation;

pub use http::{build_http_client, write_stream, Fetcher};
pub use index::{parse_listing, DirEntry, DirectoryIndex, HttpDirectoryIndex};
pub use validation::{as_directory_url, validate_url};
