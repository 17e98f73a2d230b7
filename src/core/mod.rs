pub mod phases;
pub mod presenter;
pub mod producer;
pub mod quiz;
pub mod sequence;
pub mod surface;
pub mod wallet;
