pub mod extras;
