use crate::utils::config::{DEFAULT_POPPLER_BIN, DEFAULT_SERVER_URL, REPORT_SCHEMA_VERSION};

/// Display version information
pub fn display_version() {
    println!("PDF Snapshot v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Page-by-page visual regression checks for PDF documents.");
    println!("Local rasterizer: {} (override with POPPLER_BIN)", DEFAULT_POPPLER_BIN);
    println!("Default match service: {}", DEFAULT_SERVER_URL);
}
