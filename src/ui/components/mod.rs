mod footer;
mod input;

pub use footer::draw_footer;
pub use input::{InputResult, TextInput};
