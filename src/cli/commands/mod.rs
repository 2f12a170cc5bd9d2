pub mod fetch;
pub mod migrate;
pub mod revalidate;
pub mod token;
