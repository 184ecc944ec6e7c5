//! Interactive terminal front-end.

pub mod task_viewer;

pub use task_viewer::run;
