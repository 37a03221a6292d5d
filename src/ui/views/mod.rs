mod bookmarks;
mod job_detail;
mod job_list;
mod search_bar;

pub use bookmarks::draw_bookmarks;
pub use job_detail::draw_job_detail;
pub use job_list::draw_job_list;
pub use search_bar::draw_search_bar;
