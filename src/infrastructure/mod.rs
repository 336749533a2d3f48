// Infrastructure layer module
// Contains the database and in-memory adapters for the repository ports

pub mod repositories;
