pub mod router;
pub mod spread;
