mod common;
mod grid;
mod routing;
