pub mod addressing;
pub mod subgrid;
