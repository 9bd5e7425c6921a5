//! Parallax — a tiny space simulation with tear-free background saves.
//!
//! The interesting part lives in [`snapshot`]: per-field cells that let one
//! simulation thread keep writing while a single background reader produces
//! a complete, self-consistent, point-in-time dump of the whole world. The
//! rest of the crate is the simulation that exercises it — sectors linked by
//! jumpgates, stations, and a population of ships that travel, fight, die
//! and respawn — plus the tagged-attribute serializer that walks the world
//! through a save window.

pub mod clock;
pub mod combat_subsystem;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod gunnery;
pub mod models;
pub mod movement_subsystem;
pub mod namegen;
pub mod respawn_subsystem;
pub mod rng;
pub mod serializer;
pub mod snapshot;
pub mod subsystem;
pub mod targeting_subsystem;
pub mod types;
pub mod vec2;
pub mod world;
pub mod worldgen;
