//! A collection of parsers for Switch homebrew file formats.

pub mod aset;
pub mod nacp;
pub mod nro;

pub use binrw;
