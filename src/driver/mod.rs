// src/driver/mod.rs

// Register-level TMP006 driver
pub mod device;

// Re-export the public driver struct
pub use device::Tmp006;
