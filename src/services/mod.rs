pub mod embedding_service;
pub mod geocoding_service;
pub mod hobby_text_service;
pub mod match_service;
