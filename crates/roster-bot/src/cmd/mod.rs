pub mod check_config;
pub mod register;
pub mod run;
