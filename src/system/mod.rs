pub mod cpu;
pub mod process_viewer;
pub mod usage;
