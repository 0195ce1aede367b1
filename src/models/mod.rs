mod ogp;

pub use ogp::OgpData;
