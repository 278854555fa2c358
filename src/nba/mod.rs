pub mod endpoints;
pub mod error;
pub mod first_basket;
pub mod game_log;
pub mod params;
pub mod pipeline;
pub mod summary;
pub mod teams;
pub mod writer;
