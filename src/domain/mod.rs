pub mod chat;
pub mod entity;
pub mod motion;
pub mod profile;
pub mod wander;
