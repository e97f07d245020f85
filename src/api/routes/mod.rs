pub mod examples;
pub mod system;
