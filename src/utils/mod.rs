pub mod constants;
pub mod count_utils;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use count_utils::parse_compact_count;
pub use string_utils::{collapse_whitespace, extract_channel_handle};
pub use url_utils::{is_valid_url, resolve_url};
