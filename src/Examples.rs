/// direct DME synthesis from syngas in a cooled packed bed
pub mod dme_synthesis;
