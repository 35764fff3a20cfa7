mod common;
mod routing;
mod tracking;
