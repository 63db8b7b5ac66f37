// models — Where models come from, where they run, and how loaded ones are shared.

pub mod cache;
pub mod device;
pub mod entry;
pub mod registry;
