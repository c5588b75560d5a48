pub mod deploy;
pub mod info;
pub mod list;
pub mod remove;
