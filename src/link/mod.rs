pub mod controller;
pub mod detect;
pub mod index;
pub mod preview;
