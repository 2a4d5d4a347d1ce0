pub mod gateway;
pub mod keluhan_repository;
#[cfg(test)]
pub mod memory_gateway;
pub mod photo_storage;
pub mod profile_repository;
pub mod supabase_gateway;
