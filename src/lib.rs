#[allow(non_snake_case)]
pub mod Chemistry;
#[allow(non_snake_case)]
pub mod Network;
#[allow(non_snake_case)]
pub mod Pairing;
pub mod cli;
pub mod errors;
pub mod settings;
