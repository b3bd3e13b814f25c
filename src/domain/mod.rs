pub mod character;
pub mod easing;
pub mod reorder;
pub mod scroll;
pub mod sprite;
