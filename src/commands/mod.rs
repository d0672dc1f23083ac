pub mod apply;
pub mod status;
pub mod wipe;
