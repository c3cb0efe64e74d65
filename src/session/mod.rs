pub(crate) mod params;
pub(crate) mod state;
pub(crate) mod store;
