pub mod recommendations;
pub mod title_search;
