pub mod backup;
pub mod cli;
pub mod fetch;
pub mod geography;
pub mod key;
pub mod states;
pub mod table;
