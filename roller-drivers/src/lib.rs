//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in roller-core:
//!
//! - Motor actuators (dual relay, power + direction relay)
//! - State repository over any key/value storage

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
pub mod storage;
