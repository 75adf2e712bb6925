#![allow(dead_code)]

pub mod architecture;
pub mod fakes;
pub mod stub;
