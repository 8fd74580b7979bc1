pub mod behavior;
