pub mod amplicon;
pub mod clusense;
pub mod hbar;
