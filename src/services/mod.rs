// Services module - external provider clients

pub mod pexels;
pub mod storage;
