/// FAQ registry module - Gateway

mod registry;

pub use registry::{FaqEntry, FaqRegistry};
