pub mod check;
pub mod fields;
pub mod filters;
pub mod loop_items;
pub mod render;
