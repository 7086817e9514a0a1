pub mod controller;
pub mod index;
pub mod model;
pub mod oauth;
pub mod service;
