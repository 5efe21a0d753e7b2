pub mod backup;
pub mod board;
pub mod projects;
pub mod utils;
