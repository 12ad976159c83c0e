pub mod config;
pub mod file_tree;
pub mod menu;
pub mod mode;
pub mod template;
