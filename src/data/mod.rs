//! Upstream data access.

pub mod aoe4world;

pub use aoe4world::{
    Aoe4WorldClient, GamesPage, GamesQuery, MatchRecord, MatchSource, Participant, PlayerDirectory, TeamSlot,
};
