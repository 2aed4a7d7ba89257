pub(crate) mod cpu;
pub(crate) mod encode;
pub(crate) mod pipeline;
pub(crate) mod shadow;
