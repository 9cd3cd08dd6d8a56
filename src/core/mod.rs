pub mod calendar;
pub mod config;
pub mod duration;
pub mod error;
pub mod event;
pub mod event_scheduler;
pub mod line;
pub mod pallet;
pub mod pause;
pub mod simulation_engine;
