pub mod character;
pub mod game;
pub mod run;
pub mod util;
