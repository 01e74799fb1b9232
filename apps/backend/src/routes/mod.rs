pub mod cards;
pub mod notebooks;
pub mod quiz;
