pub mod ucs;
