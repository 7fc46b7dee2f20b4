pub mod config;
pub mod dates;
pub mod error;
pub mod model;
pub mod planner_api;
pub mod storage;
pub mod template;
pub mod timeline;
pub mod workload;
