pub(crate) mod bitmap;
pub(crate) mod face;
pub(crate) mod fit;
pub(crate) mod outline;
pub(crate) mod registry;
pub(crate) mod symbols;
