pub mod icons;
pub mod policy;
pub mod scheduler;
