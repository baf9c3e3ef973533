#![no_std]

extern crate alloc;

pub mod codec;
pub mod commitment;
pub mod error;
pub mod key;
pub mod mint;
pub mod proof;
