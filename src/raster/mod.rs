//! Page rasters and the sources that produce them.

pub mod page;
pub mod source;

pub use page::{decode_base64, encode_base64, png_data_url, RasterPage};
pub use source::{PopplerRasterizer, RasterSource, RenderOptions};
