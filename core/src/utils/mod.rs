pub mod bytes;
pub mod encoding;
pub mod logging;
pub mod nom_helper;
pub mod sd_toml;
