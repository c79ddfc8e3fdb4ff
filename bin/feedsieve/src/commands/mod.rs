pub mod config_cmd;
pub mod context;
pub mod feed;
pub mod groups;
pub mod status;
