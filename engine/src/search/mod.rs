pub mod ordering;
pub mod params;
pub mod search;
