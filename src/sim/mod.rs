pub mod collide;
pub mod director;
pub mod event;
pub mod step;
pub mod task;
pub mod world;
