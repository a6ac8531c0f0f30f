// Basic types (machine words, reserved addresses, character classes) that are used everywhere:
pub mod types;

// The sparse, growable word memory:
pub mod memory;

// Assembly module to create an initial memory image from source code:
pub mod assembly;

// The host environment seam (byte streams, clock, sleep):
pub mod host;

// The machine itself:
pub mod oisc;
