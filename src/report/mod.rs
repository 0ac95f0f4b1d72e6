pub mod format;
pub mod stats_txt;
