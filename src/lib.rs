// 模組定義
pub mod analysis;
pub mod config;
pub mod data_provider;
pub mod domain_types;
pub mod service;
pub mod storage;
pub mod utils;
