mod header;
mod utils;

pub use header::draw_header;
pub use utils::{centered_rect, relevance_color, truncate};
