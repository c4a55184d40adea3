pub mod app;
pub mod event;
pub mod sampler;
pub mod session;
pub mod step;
pub mod world;
