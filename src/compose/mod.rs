pub(crate) mod layouts;
pub(crate) mod planner;
pub(crate) mod visual;
