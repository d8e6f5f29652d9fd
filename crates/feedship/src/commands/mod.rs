pub mod plan;
pub mod render;
pub mod run;
pub mod tag;
