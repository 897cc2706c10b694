/// JPEG decoding and sample probing.
pub mod decode;
