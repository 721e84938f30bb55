#![cfg(test)]
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod environment;
pub mod scripts;

pub use environment::TestEnvironment;
pub use scripts::{pac1_script, pac3_script, returning};
