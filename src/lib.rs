// Library exports for the tail-chasing snake bot
// The binaries, the replay tool and the integration tests all go through these

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod distance;
pub mod game;
pub mod grid;
pub mod regions;
pub mod replay;
pub mod search;
pub mod simple_profiler;
pub mod snake;
pub mod types;
pub mod union_find;
