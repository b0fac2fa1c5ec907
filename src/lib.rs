pub mod logging;

pub mod input;
pub mod model;
pub mod panels;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod workflow;
