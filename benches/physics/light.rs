pub mod light_source;
pub mod ray_handler;
