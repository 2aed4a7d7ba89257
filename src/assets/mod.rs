pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod fonts;
pub(crate) mod resolve;
pub(crate) mod svg_raster;
