pub mod uid_generator;
