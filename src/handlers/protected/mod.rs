// handlers/protected/mod.rs - studio surface, admin sessions only

pub mod studio;

pub use studio::studio;
