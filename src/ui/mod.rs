pub mod canvas;
pub mod gamepad;
pub mod input;
pub mod paint;
pub mod renderer;
pub mod sound;
