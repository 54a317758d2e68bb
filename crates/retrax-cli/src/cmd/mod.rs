pub mod harvest;
pub mod stats;
pub mod status;
